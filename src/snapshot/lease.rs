//! Transaction lease
//!
//! A resource has at most one write transaction. Updatable snapshots share
//! it: a running write transaction is handed out again rather than a second
//! one being opened. Read-only snapshots always get a fresh transaction.

use chrono::{DateTime, Utc};

use crate::observability::{log_event, Event, MetricsRegistry};
use crate::revision::RevisionNumber;
use crate::storage::{NodeCursor, ResourceManager, SharedWriteTrx, StorageResult};

use super::{Access, Trx};

/// What a read-only transaction is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPin {
    Revision(RevisionNumber),
    /// Whatever revision the store associates with the instant
    PointInTime(DateTime<Utc>),
}

/// Returns the resource's write transaction, opening it if none is running.
///
/// If the resource reports a running transaction but yields no handle, a
/// new one is opened instead.
pub fn lease_write<R: ResourceManager>(
    resource: &R,
    metrics: &MetricsRegistry,
) -> StorageResult<SharedWriteTrx<R::WriteTrx>> {
    if resource.has_running_write_trx() {
        match resource.write_trx() {
            Some(wtx) => {
                metrics.increment_write_trx_reused();
                log_event(Event::WriteTrxReused, &[("resource", resource.name())]);
                return Ok(wtx);
            }
            None => log_event(Event::WriteTrxHandleMissing, &[("resource", resource.name())]),
        }
    }

    let wtx = resource.begin_write_trx()?;
    metrics.increment_write_trx_opened();
    log_event(Event::WriteTrxOpened, &[("resource", resource.name())]);
    Ok(wtx)
}

/// Opens a fresh read-only transaction.
pub fn lease_read<R: ResourceManager>(
    resource: &R,
    pin: ReadPin,
    metrics: &MetricsRegistry,
) -> StorageResult<R::ReadTrx> {
    let rtx = match pin {
        ReadPin::Revision(revision) => resource.begin_read_trx(revision)?,
        ReadPin::PointInTime(point_in_time) => resource.begin_read_trx_at(point_in_time)?,
    };
    metrics.increment_read_trx_opened();

    let revision = rtx.revision_number().to_string();
    log_event(
        Event::ReadTrxOpened,
        &[("resource", resource.name()), ("revision", &revision)],
    );
    Ok(rtx)
}

/// Leases a transaction for `access`. `pin` only applies to read-only access.
pub fn lease<R: ResourceManager>(
    resource: &R,
    access: Access,
    pin: ReadPin,
    metrics: &MetricsRegistry,
) -> StorageResult<Trx<R>> {
    match access {
        Access::Updatable => lease_write(resource, metrics).map(Trx::Write),
        Access::ReadOnly => lease_read(resource, pin, metrics).map(Trx::ReadOnly),
    }
}
