//! chronodoc - point-in-time snapshots over versioned document stores
//!
//! - `snapshot`: resolves a resource at a revision or instant, never later
//!   than the requested instant
//! - `stream`: flattens index lookup groups into lazily materialized items
//! - `collection`: the adapter the query layer talks to
//! - `storage`: the store contract plus an in-memory implementation

pub mod cli;
pub mod collection;
pub mod config;
pub mod index;
pub mod observability;
pub mod revision;
pub mod snapshot;
pub mod storage;
pub mod stream;
