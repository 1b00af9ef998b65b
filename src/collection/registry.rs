//! Collection identity
//!
//! Every opened collection gets a process-unique id from an `IdSequence`.
//! Items and snapshots carry the id of the collection they came from.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::config::CollectionSettings;
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::storage::Database;

use super::DbCollection;

/// Identity of an opened collection.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct CollectionId(u32);

impl CollectionId {
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic id source. Ids start at 1.
#[derive(Debug, Default)]
pub struct IdSequence {
    last: AtomicU32,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence whose first id is `last + 1`
    pub fn starting_after(last: u32) -> Self {
        Self {
            last: AtomicU32::new(last),
        }
    }

    pub fn next_id(&self) -> CollectionId {
        CollectionId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Opens collections that share one id sequence, one set of settings and
/// one metrics registry.
#[derive(Debug, Clone)]
pub struct CollectionRegistry {
    ids: Arc<IdSequence>,
    settings: CollectionSettings,
    metrics: Arc<MetricsRegistry>,
}

impl CollectionRegistry {
    pub fn new(settings: CollectionSettings) -> Self {
        Self::with_sequence(Arc::new(IdSequence::new()), settings)
    }

    pub fn with_sequence(ids: Arc<IdSequence>, settings: CollectionSettings) -> Self {
        Self {
            ids,
            settings,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    pub fn settings(&self) -> &CollectionSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Wraps `database` as a collection named `name`.
    pub fn open<D: Database>(&self, name: impl Into<String>, database: Arc<D>) -> DbCollection<D> {
        let id = self.ids.next_id();
        let collection = DbCollection::new(
            id,
            name.into(),
            database,
            self.settings.clone(),
            Arc::clone(&self.metrics),
        );

        let id = id.to_string();
        log_event(
            Event::CollectionOpened,
            &[("collection", collection.name()), ("id", &id)],
        );
        collection
    }
}

impl Default for CollectionRegistry {
    fn default() -> Self {
        Self::new(CollectionSettings::default())
    }
}
