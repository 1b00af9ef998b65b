//! Index lookup results
//!
//! Indexes live outside this crate. A lookup yields one `NodeReferences`
//! group per matching key; the stream layer flattens those groups into
//! items.

mod references;

pub use references::NodeReferences;
