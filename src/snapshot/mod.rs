//! Point-in-time snapshots
//!
//! A snapshot is a transaction bound to one revision of one resource.
//!
//! - `lease` obtains the transaction. Updatable snapshots share the
//!   resource's single write transaction.
//! - `RevisionResolver` positions it on the requested revision, never
//!   later than a requested point in time.
//! - `SnapshotDocument` hands the result to the caller together with the
//!   owning collection.

mod document;
mod lease;
mod resolver;
mod trx;

pub use document::SnapshotDocument;
pub use lease::{lease, lease_read, lease_write, ReadPin};
pub use resolver::RevisionResolver;
pub use trx::{Access, Trx, TrxCursor};
