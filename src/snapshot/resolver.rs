//! Revision resolution
//!
//! Maps a point in time, or a revision reference, to a transaction bound to
//! that revision.
//!
//! ## Floor rule
//!
//! The snapshot for time `T` is the revision with the largest commit
//! timestamp `<= T`. If no revision was committed at or before `T` there is
//! no snapshot.
//!
//! The store's own lookup may answer with the revision sealed just after
//! `T`. One step back is always enough to correct that, so the resolver
//! checks the bound revision's timestamp and steps back at most once.
//!
//! ## Write transactions
//!
//! Updatable snapshots are positioned by reverting the shared write
//! transaction. A revert can only target a revision strictly before the
//! most recent one, so a write transaction can never be moved forward.
//! Once the shared write transaction has been reverted, a later updatable
//! request for a newer instant stays on the older revision until the
//! transaction is committed or closed.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::observability::{log_event, Event, MetricsRegistry, ObservationScope};
use crate::revision::{RevisionNumber, RevisionRef};
use crate::storage::{
    lock_trx, NodeCursor, NodeReadTrx, NodeWriteTrx, ResourceManager, StorageResult,
};

use super::lease::{lease_read, lease_write, ReadPin};
use super::{Access, Trx};

/// Resolves snapshots and records what it did.
#[derive(Debug, Clone, Default)]
pub struct RevisionResolver {
    metrics: Arc<MetricsRegistry>,
}

impl RevisionResolver {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Resolves the snapshot of `resource` at `point_in_time`.
    ///
    /// Returns `Ok(None)` when no revision was committed at or before
    /// `point_in_time`. An updatable lookup that comes back empty leaves the
    /// write transaction open; it still belongs to the resource.
    pub fn resolve_at<R: ResourceManager>(
        &self,
        resource: &R,
        point_in_time: DateTime<Utc>,
        access: Access,
    ) -> StorageResult<Option<Trx<R>>> {
        let time = point_in_time.to_rfc3339_opts(SecondsFormat::Millis, true);
        let scope = ObservationScope::with_fields(
            "RESOLVE",
            &[
                ("resource", resource.name()),
                ("point_in_time", &time),
                ("access", access.as_str()),
            ],
        );

        let resolved = match access {
            Access::Updatable => self.resolve_write_at(resource, point_in_time),
            Access::ReadOnly => self.resolve_read_at(resource, point_in_time),
        };
        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(err) => {
                scope.fail(err.message());
                return Err(err);
            }
        };

        match &resolved {
            Some(trx) => {
                self.metrics.increment_snapshots_resolved();
                let revision = trx.revision_number().to_string();
                scope.complete_with_fields(&[("revision", &revision)]);
                log_event(
                    Event::SnapshotResolved,
                    &[
                        ("resource", resource.name()),
                        ("point_in_time", &time),
                        ("revision", &revision),
                        ("access", access.as_str()),
                    ],
                );
            }
            None => {
                self.metrics.increment_snapshots_absent();
                scope.complete();
                log_event(
                    Event::SnapshotAbsent,
                    &[
                        ("resource", resource.name()),
                        ("point_in_time", &time),
                        ("access", access.as_str()),
                    ],
                );
            }
        }
        Ok(resolved)
    }

    /// Resolves `revision` of `resource`. `Latest` binds the most recent
    /// revision.
    ///
    /// A read-only request past the most recent revision fails with the
    /// store's error. An updatable one stays on its current revision.
    pub fn resolve_revision<R: ResourceManager>(
        &self,
        resource: &R,
        revision: RevisionRef,
        access: Access,
    ) -> StorageResult<Trx<R>> {
        let requested = revision.to_string();
        let scope = ObservationScope::with_fields(
            "RESOLVE",
            &[
                ("resource", resource.name()),
                ("requested", &requested),
                ("access", access.as_str()),
            ],
        );

        let trx = match self.bind_revision(resource, revision, access) {
            Ok(trx) => trx,
            Err(err) => {
                scope.fail(err.message());
                return Err(err);
            }
        };

        self.metrics.increment_snapshots_resolved();
        let bound = trx.revision_number().to_string();
        scope.complete_with_fields(&[("revision", &bound)]);
        log_event(
            Event::SnapshotResolved,
            &[
                ("resource", resource.name()),
                ("requested", &requested),
                ("revision", &bound),
                ("access", access.as_str()),
            ],
        );
        Ok(trx)
    }

    fn bind_revision<R: ResourceManager>(
        &self,
        resource: &R,
        revision: RevisionRef,
        access: Access,
    ) -> StorageResult<Trx<R>> {
        let most_recent = resource.most_recent_revision_number();
        let target = revision.resolve(most_recent);

        match access {
            Access::Updatable => {
                let wtx = lease_write(resource, &self.metrics)?;
                {
                    let mut guard = lock_trx(&wtx);
                    self.position(resource.name(), &mut *guard, target, most_recent)?;
                }
                Ok(Trx::Write(wtx))
            }
            Access::ReadOnly => Ok(Trx::ReadOnly(lease_read(
                resource,
                ReadPin::Revision(target),
                &self.metrics,
            )?)),
        }
    }

    fn resolve_write_at<R: ResourceManager>(
        &self,
        resource: &R,
        point_in_time: DateTime<Utc>,
    ) -> StorageResult<Option<Trx<R>>> {
        let wtx = lease_write(resource, &self.metrics)?;
        let found = resource.revision_number_at(point_in_time);
        let most_recent = resource.most_recent_revision_number();

        {
            let mut guard = lock_trx(&wtx);
            self.position(resource.name(), &mut *guard, found, most_recent)?;

            if guard.revision_timestamp() > point_in_time {
                let Some(previous) = guard.revision_number().previous() else {
                    return Ok(None);
                };
                self.revert(resource.name(), &mut *guard, previous)?;
                log_stepped_back(resource.name(), found, previous);
            }
        }

        Ok(Some(Trx::Write(wtx)))
    }

    fn resolve_read_at<R: ResourceManager>(
        &self,
        resource: &R,
        point_in_time: DateTime<Utc>,
    ) -> StorageResult<Option<Trx<R>>> {
        let rtx = lease_read(resource, ReadPin::PointInTime(point_in_time), &self.metrics)?;
        if rtx.revision_timestamp() <= point_in_time {
            return Ok(Some(Trx::ReadOnly(rtx)));
        }

        let found = rtx.revision_number();
        let mut rtx = rtx;
        rtx.close();

        match found.previous() {
            Some(previous) => {
                let rtx = lease_read(resource, ReadPin::Revision(previous), &self.metrics)?;
                log_stepped_back(resource.name(), found, previous);
                Ok(Some(Trx::ReadOnly(rtx)))
            }
            None => Ok(None),
        }
    }

    /// Moves a write transaction onto `target` where a revert allows it.
    fn position<W: NodeWriteTrx + ?Sized>(
        &self,
        resource: &str,
        wtx: &mut W,
        target: RevisionNumber,
        most_recent: RevisionNumber,
    ) -> StorageResult<()> {
        let current = wtx.revision_number();
        if target == current {
            return Ok(());
        }

        if target < most_recent {
            self.revert(resource, wtx, target)
        } else {
            let target = target.to_string();
            let current = current.to_string();
            log_event(
                Event::RevertSkipped,
                &[
                    ("resource", resource),
                    ("target", &target),
                    ("current", &current),
                ],
            );
            Ok(())
        }
    }

    fn revert<W: NodeWriteTrx + ?Sized>(
        &self,
        resource: &str,
        wtx: &mut W,
        target: RevisionNumber,
    ) -> StorageResult<()> {
        wtx.revert_to(target)?;
        self.metrics.increment_reverts();

        let target = target.to_string();
        log_event(
            Event::WriteTrxReverted,
            &[("resource", resource), ("revision", &target)],
        );
        Ok(())
    }
}

fn log_stepped_back(resource: &str, found: RevisionNumber, previous: RevisionNumber) {
    let found = found.to_string();
    let previous = previous.to_string();
    log_event(
        Event::SnapshotSteppedBack,
        &[
            ("resource", resource),
            ("found", &found),
            ("revision", &previous),
        ],
    );
}
