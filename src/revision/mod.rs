//! Revision vocabulary
//!
//! A resource is an append-only sequence of sealed revisions. Each revision
//! has a number (starting at 1) and a creation timestamp, and timestamps never
//! decrease as revision numbers grow.
//!
//! This module provides:
//! - `RevisionNumber` - Sequential revision identity
//! - `RevisionRef` - Either the latest revision or an exact number
//! - `RevisionInfo` - Number and timestamp of one sealed revision
//! - `Timeline` - Ordered revisions with floor and nearest lookups

mod revision_number;
mod timeline;

pub use revision_number::{RevisionNumber, RevisionRef, ZeroRevision};
pub use timeline::{RevisionInfo, Timeline};
