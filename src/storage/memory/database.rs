//! In-memory database

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::storage::{Database, ResourceConfig, StorageError, StorageResult};

use super::resource::{MemoryResource, RevisionLookup};
use super::{lock, Clock};

#[derive(Debug)]
struct ResourceEntry {
    id: u64,
    config: ResourceConfig,
    resource: MemoryResource,
}

#[derive(Debug, Default)]
struct DatabaseState {
    /// Keyed by resource id, so iteration follows creation order
    resources: BTreeMap<u64, ResourceEntry>,
    next_id: u64,
    closed: bool,
}

impl DatabaseState {
    fn find(&self, name: &str) -> Option<&ResourceEntry> {
        self.resources.values().find(|e| e.config.name() == name)
    }
}

/// A database whose resources live only in memory.
#[derive(Debug)]
pub struct MemoryDatabase {
    name: String,
    state: Mutex<DatabaseState>,
    lookup: RevisionLookup,
    clock: Clock,
}

impl MemoryDatabase {
    /// Database using wall-clock commit times and nearest-revision lookups.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_clock(name, Clock::System)
    }

    pub fn with_clock(name: impl Into<String>, clock: Clock) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(DatabaseState::default()),
            lookup: RevisionLookup::default(),
            clock,
        }
    }

    /// Sets how timestamps map to revisions for resources created later.
    pub fn with_lookup(mut self, lookup: RevisionLookup) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Creation config of resource `name`.
    pub fn resource_config(&self, name: &str) -> Option<ResourceConfig> {
        lock(&self.state).find(name).map(|e| e.config.clone())
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }

    fn ensure_open(&self, state: &DatabaseState) -> StorageResult<()> {
        if state.closed {
            Err(StorageError::database_closed(&self.name))
        } else {
            Ok(())
        }
    }
}

impl Database for MemoryDatabase {
    type Resource = MemoryResource;

    fn name(&self) -> &str {
        &self.name
    }

    fn list_resources(&self) -> Vec<String> {
        lock(&self.state)
            .resources
            .values()
            .map(|e| e.config.name().to_string())
            .collect()
    }

    fn open_resource(&self, name: &str) -> StorageResult<MemoryResource> {
        let state = lock(&self.state);
        self.ensure_open(&state)?;
        state
            .find(name)
            .map(|e| e.resource.clone())
            .ok_or_else(|| StorageError::resource_not_found(name))
    }

    fn create_resource(&self, config: &ResourceConfig) -> StorageResult<()> {
        let mut state = lock(&self.state);
        self.ensure_open(&state)?;
        if state.find(config.name()).is_some() {
            return Err(StorageError::resource_exists(config.name()));
        }

        let id = state.next_id;
        state.next_id += 1;
        let resource = MemoryResource::create(config.name(), self.lookup, self.clock.clone());
        state.resources.insert(
            id,
            ResourceEntry {
                id,
                config: config.clone(),
                resource,
            },
        );
        Ok(())
    }

    fn remove_resource(&self, name: &str) -> StorageResult<bool> {
        let mut state = lock(&self.state);
        self.ensure_open(&state)?;
        let Some(id) = state.find(name).map(|e| e.id) else {
            return Ok(false);
        };
        if let Some(entry) = state.resources.remove(&id) {
            entry.resource.close_write_trx();
        }
        Ok(true)
    }

    fn resource_name(&self, id: u64) -> Option<String> {
        lock(&self.state)
            .resources
            .get(&id)
            .map(|e| e.config.name().to_string())
    }

    fn remove(&self) -> StorageResult<()> {
        let mut state = lock(&self.state);
        for entry in state.resources.values() {
            entry.resource.close_write_trx();
        }
        state.resources.clear();
        Ok(())
    }

    fn close(&self) -> StorageResult<()> {
        let mut state = lock(&self.state);
        for entry in state.resources.values() {
            entry.resource.close_write_trx();
        }
        state.closed = true;
        Ok(())
    }
}
