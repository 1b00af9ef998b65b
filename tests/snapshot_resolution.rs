//! Snapshot Resolution Tests
//!
//! Resolution by point in time and by revision through the collection
//! adapter:
//! - A snapshot never shows a revision committed after the requested instant
//! - Instants before the first revision resolve to no document
//! - `-1` resolves to the latest revision

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use chronodoc::collection::{parse_revision, CollectionRegistry, DbCollection};
use chronodoc::revision::{RevisionNumber, RevisionRef};
use chronodoc::snapshot::Access;
use chronodoc::storage::memory::{Clock, ManualClock, MemoryDatabase, RevisionLookup};
use chronodoc::storage::{
    lock_trx, Database, NodeKind, NodeWriteTrx, ResourceConfig, ResourceManager,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn rev(n: u32) -> RevisionNumber {
    RevisionNumber::new(n).unwrap()
}

/// Collection `books` with resource `books` holding revisions 1, 2, 3
/// committed at t=10, 20, 30.
fn books(lookup: RevisionLookup) -> DbCollection<MemoryDatabase> {
    let clock = ManualClock::new(at(10));
    let db = MemoryDatabase::with_clock("books", Clock::Manual(clock.clone())).with_lookup(lookup);
    db.create_resource(&ResourceConfig::new("books")).unwrap();

    let resource = db.open_resource("books").unwrap();
    let wtx = resource.begin_write_trx().unwrap();
    for t in [20, 30] {
        clock.set(at(t));
        let mut wtx = lock_trx(&wtx);
        wtx.insert_child(NodeKind::Element {
            name: format!("chapter{}", t),
        })
        .unwrap();
        wtx.commit().unwrap();
    }
    resource.close_write_trx();

    CollectionRegistry::default().open("books", Arc::new(db))
}

fn revision_at(
    collection: &DbCollection<MemoryDatabase>,
    point_in_time: DateTime<Utc>,
    access: Access,
) -> Option<u32> {
    collection
        .document_at(point_in_time, access)
        .unwrap()
        .map(|document| document.revision_number().value())
}

const LOOKUPS: [RevisionLookup; 2] = [RevisionLookup::Floor, RevisionLookup::Nearest];

// =============================================================================
// Scenario
// =============================================================================

/// t=25 binds 2, t=5 binds nothing, t=30 binds 3, -1 binds 3.
#[test]
fn test_scenario_read_only() {
    for lookup in LOOKUPS {
        let collection = books(lookup);
        assert_eq!(revision_at(&collection, at(25), Access::ReadOnly), Some(2));
        assert_eq!(revision_at(&collection, at(5), Access::ReadOnly), None);
        assert_eq!(revision_at(&collection, at(30), Access::ReadOnly), Some(3));

        let latest = collection
            .document_at_revision(parse_revision(-1).unwrap(), Access::ReadOnly)
            .unwrap();
        assert_eq!(latest.revision_number(), rev(3));
    }
}

/// Same scenario on one shared write transaction.
#[test]
fn test_scenario_updatable() {
    for lookup in LOOKUPS {
        let collection = books(lookup);
        assert_eq!(revision_at(&collection, at(30), Access::Updatable), Some(3));
        assert_eq!(revision_at(&collection, at(25), Access::Updatable), Some(2));
        assert_eq!(revision_at(&collection, at(5), Access::Updatable), None);
    }
}

// =============================================================================
// Floor Rule
// =============================================================================

/// The bound revision is the greatest one committed at or before t.
#[test]
fn test_floor_rule_over_time_grid() {
    for lookup in LOOKUPS {
        let collection = books(lookup);
        for secs in 0..40 {
            let expected = match secs {
                0..=9 => None,
                10..=19 => Some(1),
                20..=29 => Some(2),
                _ => Some(3),
            };
            assert_eq!(
                revision_at(&collection, at(secs), Access::ReadOnly),
                expected,
                "t={} lookup={:?}",
                secs,
                lookup
            );
        }
    }
}

/// Ties between two revisions must not leak the later one.
#[test]
fn test_bound_timestamp_never_after_request() {
    let collection = books(RevisionLookup::Nearest);
    for secs in [10, 14, 15, 16, 24, 25, 26, 35] {
        let document = collection
            .document_at(at(secs), Access::ReadOnly)
            .unwrap()
            .unwrap();
        assert!(document.revision_timestamp() <= at(secs), "t={}", secs);
    }
}

#[test]
fn test_floor_rule_with_millis() {
    let collection = books(RevisionLookup::Nearest);
    let just_before = at(20) - Duration::milliseconds(1);

    assert_eq!(revision_at(&collection, just_before, Access::ReadOnly), Some(1));
    assert_eq!(revision_at(&collection, at(20), Access::ReadOnly), Some(2));
}

/// Every stepped-back read trx is closed again.
#[test]
fn test_read_resolution_leaks_no_transactions() {
    let collection = books(RevisionLookup::Nearest);
    for secs in [5, 16, 26] {
        drop(collection.document_at(at(secs), Access::ReadOnly).unwrap());
    }

    let resource = collection.database().open_resource("books").unwrap();
    assert_eq!(resource.stats().live_read_trx(), 0);
}

// =============================================================================
// Resolution by Revision
// =============================================================================

#[test]
fn test_exact_revisions() {
    let collection = books(RevisionLookup::Floor);
    for n in 1..=3 {
        let document = collection
            .named_document_at_revision("books", RevisionRef::Exact(rev(n)), Access::ReadOnly)
            .unwrap();
        assert_eq!(document.revision_number(), rev(n));
        assert_eq!(document.resource_name(), "books");
    }
}

#[test]
fn test_updatable_revision_reverts_write_trx() {
    let collection = books(RevisionLookup::Floor);
    let document = collection
        .document_at_revision(RevisionRef::Exact(rev(1)), Access::Updatable)
        .unwrap();

    assert!(document.is_updatable());
    assert_eq!(document.revision_number(), rev(1));
    assert_eq!(collection.metrics().snapshot().reverts, 1);
}

#[test]
fn test_revision_past_latest_read_only_fails() {
    let collection = books(RevisionLookup::Floor);
    let err = collection
        .document_at_revision(RevisionRef::Exact(rev(4)), Access::ReadOnly)
        .unwrap_err();
    assert_eq!(err.code(), "CHRONO_REVISION_OUT_OF_RANGE");
}

#[test]
fn test_invalid_raw_revisions() {
    assert_eq!(parse_revision(0).unwrap_err().code(), "CHRONO_INVALID_REVISION");
    assert!(parse_revision(-7).is_err());
    assert_eq!(parse_revision(2).unwrap(), RevisionRef::Exact(rev(2)));
}

// =============================================================================
// Edits After Resolution
// =============================================================================

/// Committing on a reverted write trx seals a new latest revision.
#[test]
fn test_commit_after_revert_creates_new_revision() {
    let collection = books(RevisionLookup::Floor);
    let document = collection
        .document_at(at(15), Access::Updatable)
        .unwrap()
        .unwrap();
    assert_eq!(document.revision_number(), rev(1));

    let committed = {
        let wtx = document.trx().write_trx().unwrap();
        let mut wtx = lock_trx(wtx);
        wtx.insert_child(NodeKind::Text {
            value: "errata".into(),
        })
        .unwrap();
        wtx.commit().unwrap()
    };
    assert_eq!(committed, rev(4));
    document.close();

    let latest = collection.document().unwrap();
    assert_eq!(latest.revision_number(), rev(4));
}

/// A reverted write trx is never moved forward again; closing it lets the
/// next updatable lookup start from the latest revision.
#[test]
fn test_reverted_write_trx_is_not_moved_forward() {
    let collection = books(RevisionLookup::Nearest);
    assert_eq!(revision_at(&collection, at(15), Access::Updatable), Some(1));
    assert_eq!(revision_at(&collection, at(35), Access::Updatable), Some(1));

    let resource = collection.database().open_resource("books").unwrap();
    assert!(resource.close_write_trx());
    assert_eq!(revision_at(&collection, at(35), Access::Updatable), Some(3));
}
