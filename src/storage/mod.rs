//! Versioned storage contract
//!
//! The durable store lives outside this crate. This module defines what the
//! snapshot and stream layers need from it, plus an in-memory reference
//! implementation.
//!
//! # Guarantees relied upon
//!
//! - Revision numbers start at 1 and grow with time
//! - Sealed revisions are immutable
//! - At most one live write transaction per resource
//! - Read-only transactions never observe partial writes

mod api;
mod config;
mod errors;
pub mod memory;
mod node;

pub use api::{
    lock_trx, Database, NodeCursor, NodeReadTrx, NodeWriteTrx, ResourceManager, SharedWriteTrx,
    SubtreeShredder,
};
pub use config::{ResourceConfig, ResourceOptions};
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use node::{Node, NodeKey, NodeKind, NodeTree, DOCUMENT_ROOT_KEY};
