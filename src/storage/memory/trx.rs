//! In-memory transactions

use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, Utc};

use crate::revision::{RevisionInfo, RevisionNumber};
use crate::storage::{
    Node, NodeCursor, NodeKey, NodeKind, NodeReadTrx, NodeTree, NodeWriteTrx, StorageError,
    StorageResult, DOCUMENT_ROOT_KEY,
};

use super::resource::{ResourceState, TrxStats};
use super::{lock, Clock};

/// Read-only transaction over one sealed revision.
///
/// Closing happens at the latest on drop.
#[derive(Debug)]
pub struct MemoryReadTrx {
    resource: String,
    revision: RevisionInfo,
    tree: Arc<NodeTree>,
    cursor: NodeKey,
    closed: bool,
    stats: Arc<TrxStats>,
}

impl MemoryReadTrx {
    pub(super) fn new(
        resource: String,
        revision: RevisionInfo,
        tree: Arc<NodeTree>,
        stats: Arc<TrxStats>,
    ) -> Self {
        Self {
            resource,
            revision,
            tree,
            cursor: DOCUMENT_ROOT_KEY,
            closed: false,
            stats,
        }
    }

    /// Name of the resource this transaction reads.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed {
            Err(StorageError::trx_closed())
        } else {
            Ok(())
        }
    }
}

impl NodeCursor for MemoryReadTrx {
    fn revision_number(&self) -> RevisionNumber {
        self.revision.number
    }

    fn revision_timestamp(&self) -> DateTime<Utc> {
        self.revision.timestamp
    }

    fn node_key(&self) -> NodeKey {
        self.cursor
    }

    fn node(&self) -> StorageResult<Node> {
        self.ensure_open()?;
        self.tree
            .get(self.cursor)
            .cloned()
            .ok_or_else(|| StorageError::node_not_found(self.cursor, self.revision.number))
    }

    fn move_to(&mut self, key: NodeKey) -> StorageResult<()> {
        self.ensure_open()?;
        if !self.tree.contains(key) {
            return Err(StorageError::node_not_found(key, self.revision.number));
        }
        self.cursor = key;
        Ok(())
    }
}

impl NodeReadTrx for MemoryReadTrx {
    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.stats.record_read_closed();
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for MemoryReadTrx {
    fn drop(&mut self) {
        self.close();
    }
}

/// The write transaction of a `MemoryResource`.
///
/// Edits go to a private working tree and only become visible to readers
/// on `commit`.
#[derive(Debug)]
pub struct MemoryWriteTrx {
    resource: String,
    state: Weak<Mutex<ResourceState>>,
    base: RevisionInfo,
    working: NodeTree,
    cursor: NodeKey,
    closed: bool,
    clock: Clock,
    stats: Arc<TrxStats>,
}

impl MemoryWriteTrx {
    pub(super) fn new(
        resource: String,
        state: Weak<Mutex<ResourceState>>,
        base: RevisionInfo,
        working: NodeTree,
        clock: Clock,
        stats: Arc<TrxStats>,
    ) -> Self {
        Self {
            resource,
            state,
            base,
            working,
            cursor: DOCUMENT_ROOT_KEY,
            closed: false,
            clock,
            stats,
        }
    }

    pub(super) fn mark_closed(&mut self) {
        self.closed = true;
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn resource_state(&self) -> StorageResult<Arc<Mutex<ResourceState>>> {
        if self.closed {
            return Err(StorageError::trx_closed());
        }
        self.state.upgrade().ok_or_else(StorageError::trx_closed)
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed {
            Err(StorageError::trx_closed())
        } else {
            Ok(())
        }
    }
}

impl NodeCursor for MemoryWriteTrx {
    fn revision_number(&self) -> RevisionNumber {
        self.base.number
    }

    fn revision_timestamp(&self) -> DateTime<Utc> {
        self.base.timestamp
    }

    fn node_key(&self) -> NodeKey {
        self.cursor
    }

    fn node(&self) -> StorageResult<Node> {
        self.ensure_open()?;
        self.working
            .get(self.cursor)
            .cloned()
            .ok_or_else(|| StorageError::node_not_found(self.cursor, self.base.number))
    }

    fn move_to(&mut self, key: NodeKey) -> StorageResult<()> {
        self.ensure_open()?;
        if !self.working.contains(key) {
            return Err(StorageError::node_not_found(key, self.base.number));
        }
        self.cursor = key;
        Ok(())
    }
}

impl NodeWriteTrx for MemoryWriteTrx {
    fn insert_child(&mut self, kind: NodeKind) -> StorageResult<NodeKey> {
        self.ensure_open()?;
        let key = self
            .working
            .append_child(self.cursor, kind)
            .ok_or_else(|| StorageError::node_not_found(self.cursor, self.base.number))?;
        self.cursor = key;
        Ok(key)
    }

    fn move_to_parent(&mut self) -> StorageResult<()> {
        let parent = self
            .node()?
            .parent()
            .ok_or_else(|| StorageError::node_not_found(self.cursor, self.base.number))?;
        self.cursor = parent;
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<RevisionNumber> {
        let state = self.resource_state()?;
        let sealed = lock(&state).seal(self.working.clone(), self.clock.now());

        self.base = sealed;
        self.stats.record_commit();
        Ok(sealed.number)
    }

    fn revert_to(&mut self, revision: RevisionNumber) -> StorageResult<()> {
        let state = self.resource_state()?;
        let state = lock(&state);

        let most_recent = state.latest().number;
        if revision >= most_recent {
            return Err(StorageError::revert_rejected(revision, most_recent));
        }
        let (info, tree) = state
            .revision(revision)
            .ok_or_else(|| StorageError::revision_out_of_range(revision, most_recent))?;
        drop(state);

        self.working = (*tree).clone();
        self.base = info;
        self.cursor = DOCUMENT_ROOT_KEY;
        self.stats.record_revert();
        Ok(())
    }
}
