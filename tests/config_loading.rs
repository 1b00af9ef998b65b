//! Configuration Loading Tests
//!
//! Config files drive how collections create resources.

use std::fs;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use chronodoc::collection::CollectionRegistry;
use chronodoc::config::{ChronoConfig, ConfigError};
use chronodoc::observability::Severity;
use chronodoc::storage::memory::{MemoryDatabase, MemoryWriteTrx};
use chronodoc::storage::{NodeKind, NodeWriteTrx, StorageResult};

// =============================================================================
// Helper Functions
// =============================================================================

fn write_config(dir: &TempDir, content: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join("chronodoc.json");
    fs::write(&path, content.to_string()).unwrap();
    path
}

fn element(wtx: &mut MemoryWriteTrx) -> StorageResult<()> {
    wtx.insert_child(NodeKind::Element { name: "x".into() })?;
    Ok(())
}

// =============================================================================
// Loading
// =============================================================================

/// Settings from the file reach resources created by `add`.
#[test]
fn test_loaded_settings_apply_to_new_resources() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        &json!({
            "log_level": "ERROR",
            "resource_prefix": "page",
            "resource": { "use_dewey_ids": false, "build_path_summary": false }
        }),
    );

    let config = ChronoConfig::load(&path).unwrap();
    assert_eq!(config.log_level, Severity::Error);

    let db = Arc::new(MemoryDatabase::new("site"));
    let collection = CollectionRegistry::new(config.collection.clone()).open("site", Arc::clone(&db));
    collection.add(element).unwrap().close();

    let created = db.resource_config("page1").unwrap();
    assert!(!created.options().use_dewey_ids);
    assert!(created.options().use_text_compression);
    assert!(!created.options().build_path_summary);
}

#[test]
fn test_empty_file_object_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, &json!({}));

    let config = ChronoConfig::load(&path).unwrap();
    assert_eq!(config, ChronoConfig::default());
}

// =============================================================================
// Rejection
// =============================================================================

#[test]
fn test_blank_prefix_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, &json!({ "resource_prefix": "" }));

    assert!(matches!(ChronoConfig::load(&path), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_unknown_log_level_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, &json!({ "log_level": "LOUD" }));

    assert!(matches!(ChronoConfig::load(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn test_missing_file_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.json");

    let err = ChronoConfig::load(&missing).unwrap_err();
    assert!(err.to_string().contains("nope.json"));
}
