//! Collaborator contract of the versioned store
//!
//! The snapshot and stream layers only ever talk to storage through these
//! traits. A store guarantees:
//! - At most one live write transaction per resource
//! - Read-only transactions never observe partial writes
//! - Every resource has at least one sealed revision

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::revision::RevisionNumber;

use super::{Node, NodeKey, NodeKind, ResourceConfig, StorageResult, DOCUMENT_ROOT_KEY};

/// Handle to the single write transaction of a resource.
///
/// The resource manager keeps one clone and is the only party that closes
/// the transaction. Lease callers get further clones.
pub type SharedWriteTrx<W> = Arc<Mutex<W>>;

/// Locks a shared write transaction.
///
/// A panic while holding the lock leaves the transaction's own state
/// consistent, so poisoning is ignored.
pub fn lock_trx<W>(trx: &SharedWriteTrx<W>) -> MutexGuard<'_, W> {
    trx.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A cursor positioned on one node of one revision.
pub trait NodeCursor {
    /// Revision the cursor reads.
    fn revision_number(&self) -> RevisionNumber;

    /// Timestamp of the revision the cursor reads.
    fn revision_timestamp(&self) -> DateTime<Utc>;

    /// Key of the node under the cursor.
    fn node_key(&self) -> NodeKey;

    /// The node under the cursor.
    fn node(&self) -> StorageResult<Node>;

    /// Moves the cursor to `key`.
    ///
    /// On error the cursor stays where it was.
    fn move_to(&mut self, key: NodeKey) -> StorageResult<()>;

    fn move_to_document_root(&mut self) -> StorageResult<()> {
        self.move_to(DOCUMENT_ROOT_KEY)
    }
}

/// A cursor permanently bound to one sealed revision.
pub trait NodeReadTrx: NodeCursor {
    /// Releases the transaction. Idempotent.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

/// The mutable transaction based on the latest (or a reverted-to) revision.
pub trait NodeWriteTrx: NodeCursor {
    /// Appends `kind` as last child of the current node and moves onto it.
    fn insert_child(&mut self, kind: NodeKind) -> StorageResult<NodeKey>;

    /// Moves the cursor to the parent of the current node.
    fn move_to_parent(&mut self) -> StorageResult<()>;

    /// Seals the working tree as a new revision.
    fn commit(&mut self) -> StorageResult<RevisionNumber>;

    /// Discards uncommitted changes and re-bases on `revision`.
    ///
    /// `revision` must be strictly before the most recent revision.
    fn revert_to(&mut self, revision: RevisionNumber) -> StorageResult<()>;
}

/// One named, independently versioned resource.
pub trait ResourceManager {
    type ReadTrx: NodeReadTrx;
    type WriteTrx: NodeWriteTrx;

    fn name(&self) -> &str;

    /// Number of the latest sealed revision.
    fn most_recent_revision_number(&self) -> RevisionNumber;

    /// Revision the store associates with `point_in_time`.
    ///
    /// Stores may answer with a revision sealed shortly after
    /// `point_in_time`; callers correct for that.
    fn revision_number_at(&self, point_in_time: DateTime<Utc>) -> RevisionNumber;

    /// Whether the resource reports a live write transaction.
    fn has_running_write_trx(&self) -> bool;

    /// The live write transaction, if any.
    fn write_trx(&self) -> Option<SharedWriteTrx<Self::WriteTrx>>;

    /// Opens the write transaction. Fails if one is already live.
    fn begin_write_trx(&self) -> StorageResult<SharedWriteTrx<Self::WriteTrx>>;

    /// Opens a read-only transaction on `revision`.
    fn begin_read_trx(&self, revision: RevisionNumber) -> StorageResult<Self::ReadTrx>;

    /// Opens a read-only transaction on `revision_number_at(point_in_time)`.
    fn begin_read_trx_at(&self, point_in_time: DateTime<Utc>) -> StorageResult<Self::ReadTrx>;
}

/// A set of resources managed together.
pub trait Database {
    type Resource: ResourceManager;

    fn name(&self) -> &str;

    /// Resource names in creation order.
    fn list_resources(&self) -> Vec<String>;

    fn open_resource(&self, name: &str) -> StorageResult<Self::Resource>;

    /// Creates a resource with a sealed, empty first revision.
    fn create_resource(&self, config: &ResourceConfig) -> StorageResult<()>;

    /// Removes a resource. Returns false if it did not exist.
    fn remove_resource(&self, name: &str) -> StorageResult<bool>;

    /// Name of the resource created with `id`, if it still exists.
    fn resource_name(&self, id: u64) -> Option<String>;

    /// Deletes the whole database.
    fn remove(&self) -> StorageResult<()>;

    fn close(&self) -> StorageResult<()>;
}

/// Turns external input into stored nodes through a write transaction.
pub trait SubtreeShredder<W: NodeWriteTrx + ?Sized> {
    fn shred(&mut self, wtx: &mut W) -> StorageResult<()>;
}

impl<W, F> SubtreeShredder<W> for F
where
    W: NodeWriteTrx + ?Sized,
    F: FnMut(&mut W) -> StorageResult<()>,
{
    fn shred(&mut self, wtx: &mut W) -> StorageResult<()> {
        self(wtx)
    }
}
