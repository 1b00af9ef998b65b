//! Transactions a snapshot can be bound to

use std::fmt;
use std::sync::MutexGuard;

use chrono::{DateTime, Utc};

use crate::revision::RevisionNumber;
use crate::storage::{
    lock_trx, Node, NodeCursor, NodeKey, NodeReadTrx, ResourceManager, SharedWriteTrx,
    StorageResult,
};

/// Requested kind of access to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    ReadOnly,
    Updatable,
}

impl Access {
    pub fn from_updatable(updatable: bool) -> Self {
        if updatable {
            Access::Updatable
        } else {
            Access::ReadOnly
        }
    }

    pub fn is_updatable(&self) -> bool {
        matches!(self, Access::Updatable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Access::ReadOnly => "read_only",
            Access::Updatable => "updatable",
        }
    }
}

/// A read-only transaction owned by the caller, or a clone of the
/// resource's single write transaction.
pub enum Trx<R: ResourceManager> {
    ReadOnly(R::ReadTrx),
    Write(SharedWriteTrx<R::WriteTrx>),
}

impl<R: ResourceManager> Trx<R> {
    pub fn access(&self) -> Access {
        match self {
            Trx::ReadOnly(_) => Access::ReadOnly,
            Trx::Write(_) => Access::Updatable,
        }
    }

    pub fn is_updatable(&self) -> bool {
        self.access().is_updatable()
    }

    pub fn revision_number(&self) -> RevisionNumber {
        match self {
            Trx::ReadOnly(rtx) => rtx.revision_number(),
            Trx::Write(wtx) => lock_trx(wtx).revision_number(),
        }
    }

    pub fn revision_timestamp(&self) -> DateTime<Utc> {
        match self {
            Trx::ReadOnly(rtx) => rtx.revision_timestamp(),
            Trx::Write(wtx) => lock_trx(wtx).revision_timestamp(),
        }
    }

    /// The shared write transaction, if this is one.
    pub fn write_trx(&self) -> Option<&SharedWriteTrx<R::WriteTrx>> {
        match self {
            Trx::ReadOnly(_) => None,
            Trx::Write(wtx) => Some(wtx),
        }
    }

    /// Borrows the transaction as a cursor.
    ///
    /// For a write transaction the lock is held until the cursor is dropped.
    pub fn cursor(&mut self) -> TrxCursor<'_, R> {
        match self {
            Trx::ReadOnly(rtx) => TrxCursor::Read(rtx),
            Trx::Write(wtx) => TrxCursor::Write(lock_trx(wtx)),
        }
    }

    /// Releases the transaction.
    ///
    /// A read-only transaction is closed. A write transaction only loses
    /// this handle; the resource stays responsible for closing it.
    pub fn close(self) {
        match self {
            Trx::ReadOnly(mut rtx) => rtx.close(),
            Trx::Write(wtx) => drop(wtx),
        }
    }
}

impl<R: ResourceManager> fmt::Debug for Trx<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trx")
            .field("access", &self.access())
            .field("revision", &self.revision_number())
            .finish()
    }
}

/// Cursor view of a `Trx`.
pub enum TrxCursor<'a, R: ResourceManager> {
    Read(&'a mut R::ReadTrx),
    Write(MutexGuard<'a, R::WriteTrx>),
}

impl<R: ResourceManager> NodeCursor for TrxCursor<'_, R> {
    fn revision_number(&self) -> RevisionNumber {
        match self {
            TrxCursor::Read(rtx) => rtx.revision_number(),
            TrxCursor::Write(wtx) => wtx.revision_number(),
        }
    }

    fn revision_timestamp(&self) -> DateTime<Utc> {
        match self {
            TrxCursor::Read(rtx) => rtx.revision_timestamp(),
            TrxCursor::Write(wtx) => wtx.revision_timestamp(),
        }
    }

    fn node_key(&self) -> NodeKey {
        match self {
            TrxCursor::Read(rtx) => rtx.node_key(),
            TrxCursor::Write(wtx) => wtx.node_key(),
        }
    }

    fn node(&self) -> StorageResult<Node> {
        match self {
            TrxCursor::Read(rtx) => rtx.node(),
            TrxCursor::Write(wtx) => wtx.node(),
        }
    }

    fn move_to(&mut self, key: NodeKey) -> StorageResult<()> {
        match self {
            TrxCursor::Read(rtx) => rtx.move_to(key),
            TrxCursor::Write(wtx) => wtx.move_to(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::{MemoryDatabase, MemoryResource};
    use crate::storage::{Database, NodeKind, NodeWriteTrx, ResourceConfig, DOCUMENT_ROOT_KEY};

    fn resource() -> MemoryResource {
        let db = MemoryDatabase::new("db");
        db.create_resource(&ResourceConfig::new("doc")).unwrap();
        db.open_resource("doc").unwrap()
    }

    #[test]
    fn test_access_from_flag() {
        assert_eq!(Access::from_updatable(true), Access::Updatable);
        assert_eq!(Access::from_updatable(false), Access::ReadOnly);
        assert_eq!(Access::default(), Access::ReadOnly);
    }

    #[test]
    fn test_read_trx_close_releases_it() {
        let resource = resource();
        let trx: Trx<MemoryResource> =
            Trx::ReadOnly(resource.begin_read_trx(RevisionNumber::FIRST).unwrap());
        assert!(!trx.is_updatable());
        assert_eq!(resource.stats().live_read_trx(), 1);

        trx.close();
        assert_eq!(resource.stats().live_read_trx(), 0);
    }

    #[test]
    fn test_write_trx_close_keeps_resource_handle() {
        let resource = resource();
        let trx: Trx<MemoryResource> = Trx::Write(resource.begin_write_trx().unwrap());
        assert!(trx.is_updatable());

        trx.close();
        assert!(resource.has_running_write_trx());
        assert_eq!(resource.stats().write_closed(), 0);
    }

    #[test]
    fn test_cursor_over_write_trx() {
        let resource = resource();
        let mut trx: Trx<MemoryResource> = Trx::Write(resource.begin_write_trx().unwrap());
        let key = {
            let wtx = trx.write_trx().unwrap();
            let mut wtx = lock_trx(wtx);
            let key = wtx.insert_child(NodeKind::Element { name: "a".into() }).unwrap();
            wtx.move_to_document_root().unwrap();
            key
        };

        let mut cursor = trx.cursor();
        assert_eq!(cursor.node_key(), DOCUMENT_ROOT_KEY);
        cursor.move_to(key).unwrap();
        assert_eq!(cursor.node().unwrap().kind(), &NodeKind::Element { name: "a".into() });
    }
}
