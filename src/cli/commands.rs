//! CLI command implementations
//!
//! Every command replays a history fixture into the in-memory store, opens
//! it as a collection and prints JSON lines to stdout. Logs go to stderr.

use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::collection::{parse_revision, CollectionRegistry, DbCollection, Document};
use crate::config::ChronoConfig;
use crate::index::NodeReferences;
use crate::snapshot::Access;
use crate::storage::memory::MemoryDatabase;
use crate::storage::{Database, ResourceManager};

use super::args::{Cli, Command, HistoryArgs};
use super::errors::{CliError, CliResult};
use super::fixture::HistoryFixture;

/// Run the parsed command
pub fn run_command(cli: Cli) -> CliResult<()> {
    let config = match &cli.config {
        Some(path) => ChronoConfig::load(path)?,
        None => ChronoConfig::default(),
    };
    config.apply();
    let registry = CollectionRegistry::new(config.collection.clone());

    let lines = match cli.command {
        Command::Resolve {
            history,
            resource,
            at,
            revision,
            updatable,
        } => vec![resolve(
            &registry,
            &history,
            resource.as_deref(),
            at,
            revision,
            updatable,
        )?],
        Command::Scan {
            history,
            resource,
            revision,
            groups,
        } => scan(&registry, &history, &resource, revision, groups)?,
        Command::History { history } => history_lines(&history)?,
    };

    let mut stdout = io::stdout().lock();
    for line in lines {
        serde_json::to_writer(&mut stdout, &line)?;
        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}

fn open(registry: &CollectionRegistry, history: &HistoryArgs) -> CliResult<DbCollection<MemoryDatabase>> {
    let database = HistoryFixture::load(&history.history)?.build(history.lookup.into())?;
    Ok(registry.open(collection_name(&history.history), database))
}

fn collection_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "history".to_string())
}

/// Resolves one snapshot. `Value::Null` when none exists at `at`.
pub fn resolve(
    registry: &CollectionRegistry,
    history: &HistoryArgs,
    resource: Option<&str>,
    at: Option<DateTime<Utc>>,
    revision: Option<i64>,
    updatable: bool,
) -> CliResult<Value> {
    let collection = open(registry, history)?;
    let access = Access::from_updatable(updatable);

    let document = match (at, resource) {
        (Some(at), Some(name)) => collection.named_document_at(name, at, access)?,
        (Some(at), None) => {
            let name = only_resource(&collection)?;
            collection.named_document_at(&name, at, access)?
        }
        (None, resource) => {
            let revision = parse_revision(revision.unwrap_or(-1))?;
            let document = match resource {
                Some(name) => collection.named_document_at_revision(name, revision, access)?,
                None => collection.document_at_revision(revision, access)?,
            };
            Some(document)
        }
    };

    Ok(match document {
        Some(document) => {
            let value = describe(&document);
            document.close();
            value
        }
        None => Value::Null,
    })
}

fn only_resource(collection: &DbCollection<MemoryDatabase>) -> CliResult<String> {
    let mut resources = collection.database().list_resources();
    if resources.len() == 1 {
        Ok(resources.remove(0))
    } else {
        Err(CliError::invalid_argument(format!(
            "--at needs --resource when the history holds {} resources",
            resources.len()
        )))
    }
}

fn describe(document: &Document<MemoryDatabase>) -> Value {
    json!({
        "collection": document.collection_id(),
        "resource": document.resource_name(),
        "revision": document.revision_number(),
        "timestamp": document.revision_timestamp().to_rfc3339_opts(SecondsFormat::Secs, true),
        "updatable": document.is_updatable(),
    })
}

/// Materializes `groups` against a read-only snapshot, one item per line.
pub fn scan(
    registry: &CollectionRegistry,
    history: &HistoryArgs,
    resource: &str,
    revision: i64,
    groups: Vec<NodeReferences>,
) -> CliResult<Vec<Value>> {
    let collection = open(registry, history)?;
    let revision = parse_revision(revision)?;
    let mut document = collection.named_document_at_revision(resource, revision, Access::ReadOnly)?;

    let items = document.items(groups)?;
    document.close();

    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(CliError::from))
        .collect()
}

/// Revision timeline of every resource, one resource per line.
pub fn history_lines(history: &HistoryArgs) -> CliResult<Vec<Value>> {
    let database = HistoryFixture::load(&history.history)?.build(history.lookup.into())?;

    let mut lines = Vec::new();
    for name in database.list_resources() {
        let resource = database.open_resource(&name)?;
        let revisions: Vec<Value> = resource
            .timeline()
            .revisions()
            .iter()
            .map(|info| {
                json!({
                    "revision": info.number,
                    "timestamp": info.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                })
            })
            .collect();
        lines.push(json!({
            "resource": resource.name(),
            "revisions": revisions,
        }));
    }
    Ok(lines)
}
