//! Capabilities a collection exposes to the query layer

use chrono::{DateTime, Utc};

use crate::revision::RevisionRef;
use crate::snapshot::Access;

use super::DocumentResult;

/// Hands out snapshots of stored documents.
pub trait SnapshotResolvable {
    type Document;

    /// Snapshot of the only resource at `revision`.
    fn document_at_revision(
        &self,
        revision: RevisionRef,
        access: Access,
    ) -> DocumentResult<Self::Document>;

    /// Snapshot of resource `name` at `revision`.
    fn named_document_at_revision(
        &self,
        name: &str,
        revision: RevisionRef,
        access: Access,
    ) -> DocumentResult<Self::Document>;

    /// Snapshot of resource `name` as of `point_in_time`, if one existed.
    fn named_document_at(
        &self,
        name: &str,
        point_in_time: DateTime<Utc>,
        access: Access,
    ) -> DocumentResult<Option<Self::Document>>;
}

/// Stores new documents built by a shredder `S`.
pub trait DocumentAddable<S> {
    type Document;

    /// Adds a document under a generated resource name.
    fn add(&self, shredder: S) -> DocumentResult<Self::Document>;

    fn add_named(&self, name: &str, shredder: S) -> DocumentResult<Self::Document>;
}

pub trait Closeable {
    fn close(&self) -> DocumentResult<()>;
}
