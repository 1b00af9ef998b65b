//! History fixtures
//!
//! A fixture describes resources and the revisions committed to them:
//!
//! ```json
//! {
//!   "resources": [
//!     {
//!       "name": "doc",
//!       "created": "1970-01-01T00:00:10Z",
//!       "revisions": [
//!         { "timestamp": "1970-01-01T00:00:20Z", "nodes": [{ "element": "a" }, { "text": "x" }] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Creating a resource seals its empty revision 1 at `created`. Each entry
//! of `revisions` appends its nodes under the document root and commits,
//! so it becomes revision 2, 3 and so on.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::storage::memory::{Clock, ManualClock, MemoryDatabase, RevisionLookup};
use crate::storage::{
    lock_trx, Database, NodeCursor, NodeKind, NodeWriteTrx, ResourceConfig, ResourceManager,
};

use super::errors::{CliError, CliResult};

#[derive(Debug, Deserialize)]
pub struct HistoryFixture {
    pub resources: Vec<ResourceFixture>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceFixture {
    pub name: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub revisions: Vec<RevisionFixture>,
}

#[derive(Debug, Deserialize)]
pub struct RevisionFixture {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub nodes: Vec<NodeFixture>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeFixture {
    Element(String),
    Text(String),
    Attribute { name: String, value: String },
}

impl From<NodeFixture> for NodeKind {
    fn from(node: NodeFixture) -> Self {
        match node {
            NodeFixture::Element(name) => NodeKind::Element { name },
            NodeFixture::Text(value) => NodeKind::Text { value },
            NodeFixture::Attribute { name, value } => NodeKind::Attribute { name, value },
        }
    }
}

impl HistoryFixture {
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::fixture_error(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> CliResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| CliError::fixture_error(format!("invalid history JSON: {}", e)))
    }

    /// Replays the fixture into a fresh in-memory database.
    pub fn build(self, lookup: RevisionLookup) -> CliResult<Arc<MemoryDatabase>> {
        let clock = ManualClock::new(DateTime::<Utc>::UNIX_EPOCH);
        let database = MemoryDatabase::with_clock("history", Clock::Manual(clock.clone()))
            .with_lookup(lookup);

        for resource in self.resources {
            replay(&database, &clock, resource)?;
        }
        Ok(Arc::new(database))
    }
}

fn replay(database: &MemoryDatabase, clock: &ManualClock, fixture: ResourceFixture) -> CliResult<()> {
    clock.set(fixture.created);
    database.create_resource(&ResourceConfig::new(&fixture.name))?;
    let resource = database.open_resource(&fixture.name)?;

    let wtx = resource.begin_write_trx()?;
    let mut previous = fixture.created;
    for revision in fixture.revisions {
        if revision.timestamp < previous {
            return Err(CliError::fixture_error(format!(
                "revisions of {} go back in time at {}",
                fixture.name, revision.timestamp
            )));
        }
        previous = revision.timestamp;
        clock.set(revision.timestamp);

        let mut wtx = lock_trx(&wtx);
        for node in revision.nodes {
            wtx.move_to_document_root()?;
            wtx.insert_child(node.into())?;
        }
        wtx.commit()?;
    }
    resource.close_write_trx();
    Ok(())
}
