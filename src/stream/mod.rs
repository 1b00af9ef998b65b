//! Lazy item streams
//!
//! Streams hand out one element per `next()` call and report
//! end-of-stream as `Ok(None)`. Once every element has been handed out a
//! stream keeps returning `Ok(None)`.

mod item;
mod node_key_stream;

use std::collections::VecDeque;

use crate::collection::DocumentResult;

pub use item::Item;
pub use node_key_stream::NodeKeyStream;

/// A forward-only, non-restartable sequence.
pub trait Stream {
    type Item;

    fn next(&mut self) -> DocumentResult<Option<Self::Item>>;

    /// Releases what the stream owns. Streams over borrowed state own
    /// nothing, so the default does nothing.
    fn close(&mut self) {}
}

/// Stream over already materialized elements.
#[derive(Debug)]
pub struct VecStream<T> {
    items: VecDeque<T>,
}

impl<T> VecStream<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Elements not yet handed out.
    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

impl<T> Stream for VecStream<T> {
    type Item = T;

    fn next(&mut self) -> DocumentResult<Option<T>> {
        Ok(self.items.pop_front())
    }

    /// Drops the elements not yet handed out.
    fn close(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_stream_ends_stably() {
        let mut stream = VecStream::new(vec![1, 2]);
        assert_eq!(stream.next().unwrap(), Some(1));
        assert_eq!(stream.remaining(), 1);
        assert_eq!(stream.next().unwrap(), Some(2));
        assert_eq!(stream.next().unwrap(), None);
        assert_eq!(stream.next().unwrap(), None);
    }

    #[test]
    fn test_vec_stream_close_drops_rest() {
        let mut stream = VecStream::new(vec!["a", "b"]);
        stream.close();
        assert_eq!(stream.next().unwrap(), None);
    }
}
