//! In-memory resource

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::revision::{RevisionInfo, RevisionNumber, Timeline};
use crate::storage::{
    NodeTree, ResourceManager, SharedWriteTrx, StorageError, StorageResult,
};

use super::trx::{MemoryReadTrx, MemoryWriteTrx};
use super::{lock, Clock};

/// How a timestamp is mapped to a revision number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevisionLookup {
    /// Latest revision sealed at or before the timestamp
    Floor,
    /// Revision sealed closest to the timestamp, which may be after it
    #[default]
    Nearest,
}

/// Transaction counters of one resource.
#[derive(Debug, Default)]
pub struct TrxStats {
    read_opened: AtomicUsize,
    read_closed: AtomicUsize,
    write_opened: AtomicUsize,
    write_closed: AtomicUsize,
    reverts: AtomicUsize,
    commits: AtomicUsize,
}

impl TrxStats {
    pub(super) fn record_read_opened(&self) {
        self.read_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_read_closed(&self) {
        self.read_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_revert(&self) {
        self.reverts.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_commit(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read_opened(&self) -> usize {
        self.read_opened.load(Ordering::Relaxed)
    }

    pub fn read_closed(&self) -> usize {
        self.read_closed.load(Ordering::Relaxed)
    }

    /// Read transactions opened and not yet closed.
    pub fn live_read_trx(&self) -> usize {
        self.read_opened().saturating_sub(self.read_closed())
    }

    pub fn write_opened(&self) -> usize {
        self.write_opened.load(Ordering::Relaxed)
    }

    pub fn write_closed(&self) -> usize {
        self.write_closed.load(Ordering::Relaxed)
    }

    pub fn reverts(&self) -> usize {
        self.reverts.load(Ordering::Relaxed)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::Relaxed)
    }
}

/// Sealed history plus the write transaction slot.
#[derive(Debug)]
pub(super) struct ResourceState {
    timeline: Timeline,
    /// Tree of revision `n` at index `n - 1`
    trees: Vec<Arc<NodeTree>>,
    latest: RevisionInfo,
    write_trx: Option<SharedWriteTrx<MemoryWriteTrx>>,
}

impl ResourceState {
    /// Seals an empty first revision at `created_at`.
    fn new(created_at: DateTime<Utc>) -> Self {
        let mut timeline = Timeline::new();
        timeline.push(created_at);
        Self {
            timeline,
            trees: vec![Arc::new(NodeTree::new())],
            latest: RevisionInfo {
                number: RevisionNumber::FIRST,
                timestamp: created_at,
            },
            write_trx: None,
        }
    }

    pub(super) fn latest(&self) -> RevisionInfo {
        self.latest
    }

    pub(super) fn revision(&self, number: RevisionNumber) -> Option<(RevisionInfo, Arc<NodeTree>)> {
        let info = self.timeline.get(number)?;
        let tree = self.trees.get(number.value() as usize - 1)?;
        Some((info, Arc::clone(tree)))
    }

    /// Seals `tree` as the next revision.
    ///
    /// The timestamp is clamped so it never precedes the latest revision.
    pub(super) fn seal(&mut self, tree: NodeTree, at: DateTime<Utc>) -> RevisionInfo {
        let timestamp = at.max(self.latest.timestamp);
        let number = self.latest.number.next();
        let pushed = self.timeline.push(timestamp);
        debug_assert_eq!(pushed, Some(number));

        self.trees.push(Arc::new(tree));
        self.latest = RevisionInfo { number, timestamp };
        self.latest
    }
}

/// A resource of a `MemoryDatabase`. Clones share state.
#[derive(Debug, Clone)]
pub struct MemoryResource {
    name: String,
    state: Arc<Mutex<ResourceState>>,
    stats: Arc<TrxStats>,
    lookup: RevisionLookup,
    clock: Clock,
}

impl MemoryResource {
    pub(super) fn create(
        name: impl Into<String>,
        lookup: RevisionLookup,
        clock: Clock,
    ) -> Self {
        let created_at = clock.now();
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(ResourceState::new(created_at))),
            stats: Arc::new(TrxStats::default()),
            lookup,
            clock,
        }
    }

    /// Transaction counters.
    pub fn stats(&self) -> &TrxStats {
        &self.stats
    }

    /// Copy of the sealed revision history.
    pub fn timeline(&self) -> Timeline {
        lock(&self.state).timeline.clone()
    }

    pub fn lookup(&self) -> RevisionLookup {
        self.lookup
    }

    /// Closes the live write transaction, if any.
    ///
    /// Outstanding clones of the handle stay allocated but reject every
    /// further operation. Returns false if no write transaction was live.
    pub fn close_write_trx(&self) -> bool {
        let taken = lock(&self.state).write_trx.take();
        match taken {
            Some(wtx) => {
                lock(&wtx).mark_closed();
                self.stats.write_closed.fetch_add(1, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }
}

impl ResourceManager for MemoryResource {
    type ReadTrx = MemoryReadTrx;
    type WriteTrx = MemoryWriteTrx;

    fn name(&self) -> &str {
        &self.name
    }

    fn most_recent_revision_number(&self) -> RevisionNumber {
        lock(&self.state).latest().number
    }

    fn revision_number_at(&self, point_in_time: DateTime<Utc>) -> RevisionNumber {
        let state = lock(&self.state);
        let found = match self.lookup {
            RevisionLookup::Floor => state.timeline.floor(point_in_time),
            RevisionLookup::Nearest => state.timeline.nearest(point_in_time),
        };
        found.map_or(RevisionNumber::FIRST, |info| info.number)
    }

    fn has_running_write_trx(&self) -> bool {
        lock(&self.state).write_trx.is_some()
    }

    fn write_trx(&self) -> Option<SharedWriteTrx<MemoryWriteTrx>> {
        lock(&self.state).write_trx.clone()
    }

    fn begin_write_trx(&self) -> StorageResult<SharedWriteTrx<MemoryWriteTrx>> {
        let mut state = lock(&self.state);
        if state.write_trx.is_some() {
            return Err(StorageError::write_trx_running(&self.name));
        }

        let latest = state.latest();
        let (_, tree) = state
            .revision(latest.number)
            .ok_or_else(|| StorageError::revision_out_of_range(latest.number, latest.number))?;

        let wtx = Arc::new(Mutex::new(MemoryWriteTrx::new(
            self.name.clone(),
            Arc::downgrade(&self.state),
            latest,
            (*tree).clone(),
            self.clock.clone(),
            Arc::clone(&self.stats),
        )));
        state.write_trx = Some(Arc::clone(&wtx));
        self.stats.write_opened.fetch_add(1, Ordering::Relaxed);

        Ok(wtx)
    }

    fn begin_read_trx(&self, revision: RevisionNumber) -> StorageResult<MemoryReadTrx> {
        let state = lock(&self.state);
        let latest = state.latest().number;
        let (info, tree) = state
            .revision(revision)
            .ok_or_else(|| StorageError::revision_out_of_range(revision, latest))?;
        drop(state);

        self.stats.record_read_opened();
        Ok(MemoryReadTrx::new(
            self.name.clone(),
            info,
            tree,
            Arc::clone(&self.stats),
        ))
    }

    fn begin_read_trx_at(&self, point_in_time: DateTime<Utc>) -> StorageResult<MemoryReadTrx> {
        let revision = self.revision_number_at(point_in_time);
        self.begin_read_trx(revision)
    }
}
