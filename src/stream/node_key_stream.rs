//! NodeKeyStream - flattens index lookup groups into items
//!
//! One item is materialized per call by moving the borrowed cursor onto the
//! next node key. Only the current group's iterator is held.
//!
//! A call that adopts an empty group reports end-of-stream for that call
//! only; the next call moves on to the following group.

use std::iter::Peekable;

use crate::collection::{CollectionId, DocumentResult};
use crate::observability::{log_event, Event};
use crate::storage::{NodeCursor, NodeKey};

use super::{Item, Stream};

pub struct NodeKeyStream<'c, I, C>
where
    I: Iterator,
    I::Item: IntoIterator<Item = NodeKey>,
    C: NodeCursor + ?Sized,
{
    groups: I,
    current: Option<Peekable<<I::Item as IntoIterator>::IntoIter>>,
    cursor: &'c mut C,
    collection: CollectionId,
    yielded: usize,
    exhausted: bool,
}

impl<'c, I, C> NodeKeyStream<'c, I, C>
where
    I: Iterator,
    I::Item: IntoIterator<Item = NodeKey>,
    C: NodeCursor + ?Sized,
{
    pub fn new<G>(groups: G, cursor: &'c mut C, collection: CollectionId) -> Self
    where
        G: IntoIterator<IntoIter = I>,
    {
        Self {
            groups: groups.into_iter(),
            current: None,
            cursor,
            collection,
            yielded: 0,
            exhausted: false,
        }
    }

    /// Items produced so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    pub fn collection(&self) -> CollectionId {
        self.collection
    }

    /// Whether every group has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn current_is_drained(&mut self) -> bool {
        match self.current.as_mut() {
            Some(keys) => keys.peek().is_none(),
            None => true,
        }
    }

    fn produce(&mut self) -> DocumentResult<Option<Item>> {
        let Some(key) = self.current.as_mut().and_then(Iterator::next) else {
            return Ok(None);
        };

        self.cursor.move_to(key)?;
        let item = Item::from_cursor(&*self.cursor, self.collection)?;
        self.yielded += 1;
        Ok(Some(item))
    }
}

impl<I, C> Stream for NodeKeyStream<'_, I, C>
where
    I: Iterator,
    I::Item: IntoIterator<Item = NodeKey>,
    C: NodeCursor + ?Sized,
{
    type Item = Item;

    fn next(&mut self) -> DocumentResult<Option<Item>> {
        if self.exhausted {
            return Ok(None);
        }
        if self.current_is_drained() {
            match self.groups.next() {
                Some(group) => self.current = Some(group.into_iter().peekable()),
                None => {
                    self.current = None;
                    if !self.exhausted {
                        self.exhausted = true;
                        let collection = self.collection.to_string();
                        let yielded = self.yielded.to_string();
                        log_event(
                            Event::ItemStreamExhausted,
                            &[("collection", &collection), ("items", &yielded)],
                        );
                    }
                    return Ok(None);
                }
            }
        }
        self.produce()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::IdSequence;
    use crate::index::NodeReferences;
    use crate::revision::RevisionNumber;
    use crate::storage::memory::MemoryDatabase;
    use crate::storage::{
        lock_trx, Database, NodeKind, NodeWriteTrx, ResourceConfig, ResourceManager,
        StorageErrorCode,
    };

    /// Read trx over a tree whose nodes 1..=count are text children of the root.
    fn read_trx(count: u64) -> crate::storage::memory::MemoryReadTrx {
        let db = MemoryDatabase::new("db");
        db.create_resource(&ResourceConfig::new("doc")).unwrap();
        let resource = db.open_resource("doc").unwrap();
        let wtx = resource.begin_write_trx().unwrap();
        {
            let mut wtx = lock_trx(&wtx);
            for n in 1..=count {
                wtx.move_to_document_root().unwrap();
                wtx.insert_child(NodeKind::Text { value: n.to_string() }).unwrap();
            }
            wtx.commit().unwrap();
        }
        resource.begin_read_trx(RevisionNumber::new(2).unwrap()).unwrap()
    }

    /// Outer iterator that yields `[1]`, then `None`, then `[2]`.
    struct Resuming {
        calls: usize,
    }

    impl Iterator for Resuming {
        type Item = Vec<u64>;

        fn next(&mut self) -> Option<Vec<u64>> {
            self.calls += 1;
            match self.calls {
                1 => Some(vec![1]),
                2 => None,
                3 => Some(vec![2]),
                _ => None,
            }
        }
    }

    fn drain<S: Stream<Item = Item>>(stream: &mut S) -> Vec<u64> {
        let mut keys = Vec::new();
        while let Some(item) = stream.next().unwrap() {
            keys.push(item.node_key());
        }
        keys
    }

    #[test]
    fn test_groups_flatten_in_order() {
        let mut rtx = read_trx(10);
        let collection = IdSequence::new().next_id();
        let groups = vec![NodeReferences::from([5, 7]), NodeReferences::from([9])];
        let mut stream = NodeKeyStream::new(groups, &mut rtx, collection);

        assert_eq!(stream.next().unwrap().map(|i| i.node_key()), Some(5));
        assert_eq!(stream.next().unwrap().map(|i| i.node_key()), Some(7));
        assert_eq!(stream.next().unwrap().map(|i| i.node_key()), Some(9));
        assert!(stream.next().unwrap().is_none());
        assert!(stream.next().unwrap().is_none());
        assert_eq!(stream.yielded(), 3);
    }

    #[test]
    fn test_items_carry_node_and_collection() {
        let mut rtx = read_trx(3);
        let collection = IdSequence::starting_after(6).next_id();
        let mut stream = NodeKeyStream::new(vec![NodeReferences::from([2])], &mut rtx, collection);

        let item = stream.next().unwrap().unwrap();
        assert_eq!(item.collection(), collection);
        assert_eq!(item.revision(), RevisionNumber::new(2).unwrap());
        assert_eq!(item.kind(), &NodeKind::Text { value: "2".into() });
    }

    #[test]
    fn test_empty_group_ends_one_call_only() {
        let mut rtx = read_trx(3);
        let collection = IdSequence::new().next_id();
        let groups = vec![NodeReferences::from([1]), NodeReferences::new(), NodeReferences::from([3])];
        let mut stream = NodeKeyStream::new(groups, &mut rtx, collection);

        assert_eq!(stream.next().unwrap().map(|i| i.node_key()), Some(1));
        assert!(stream.next().unwrap().is_none());
        assert_eq!(stream.next().unwrap().map(|i| i.node_key()), Some(3));
        assert!(stream.next().unwrap().is_none());
    }

    #[test]
    fn test_total_equals_sum_of_group_sizes() {
        let mut rtx = read_trx(20);
        let collection = IdSequence::new().next_id();
        let groups: Vec<Vec<u64>> = vec![vec![1, 2, 3], vec![10], vec![4, 20, 11, 12]];
        let mut stream = NodeKeyStream::new(groups, &mut rtx, collection);

        assert_eq!(drain(&mut stream), vec![1, 2, 3, 10, 4, 20, 11, 12]);
        assert!(stream.next().unwrap().is_none());
    }

    #[test]
    fn test_missing_node_is_an_error_and_stream_continues() {
        let mut rtx = read_trx(2);
        let collection = IdSequence::new().next_id();
        let mut stream = NodeKeyStream::new(vec![vec![1, 99, 2]], &mut rtx, collection);

        assert!(stream.next().unwrap().is_some());
        let err = stream.next().unwrap_err();
        assert_eq!(
            err.storage_error().map(|e| e.code()),
            Some(StorageErrorCode::NodeNotFound)
        );
        assert_eq!(stream.next().unwrap().map(|i| i.node_key()), Some(2));
    }

    #[test]
    fn test_close_leaves_cursor_usable() {
        let mut rtx = read_trx(2);
        let collection = IdSequence::new().next_id();
        {
            let mut stream = NodeKeyStream::new(vec![vec![1]], &mut rtx, collection);
            stream.next().unwrap();
            stream.close();
        }
        assert_eq!(crate::storage::NodeCursor::node_key(&rtx), 1);
        assert!(!crate::storage::NodeReadTrx::is_closed(&rtx));
    }

    /// End-of-stream sticks even when the group source would resume.
    #[test]
    fn test_end_of_stream_is_final_over_resuming_source() {
        let mut rtx = read_trx(2);
        let collection = IdSequence::new().next_id();
        let mut stream = NodeKeyStream::new(Resuming { calls: 0 }, &mut rtx, collection);

        assert_eq!(stream.next().unwrap().map(|i| i.node_key()), Some(1));
        assert!(stream.next().unwrap().is_none());
        assert!(stream.is_exhausted());
        assert!(stream.next().unwrap().is_none());
        assert!(stream.next().unwrap().is_none());
        assert_eq!(stream.yielded(), 1);
    }
}
