//! In-memory reference store
//!
//! Implements the storage contract entirely in memory so the snapshot and
//! stream layers can run end to end. Nothing is persisted.
//!
//! - Sealed revisions are shared as `Arc<NodeTree>`, so read transactions
//!   keep an immutable view no matter what the write transaction does.
//! - The resource keeps the only long-lived clone of its write transaction
//!   and is the only party that closes it.
//! - Timestamp lookups follow a configurable `RevisionLookup` policy.

mod clock;
mod database;
mod resource;
mod trx;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use clock::{Clock, ManualClock};
pub use database::MemoryDatabase;
pub use resource::{MemoryResource, RevisionLookup, TrxStats};
pub use trx::{MemoryReadTrx, MemoryWriteTrx};

/// State guarded here is always left consistent between statements, so a
/// poisoned lock is still safe to use.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
