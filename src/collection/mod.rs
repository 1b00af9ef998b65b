//! Collection adapter
//!
//! Presents a database of versioned resources to the query layer:
//! - document lookups by revision, by point in time, by resource name
//! - ingestion through a `SubtreeShredder`
//! - enumeration, removal, close and delete
//!
//! Lookups that find no data return `Ok(None)`. Every failure is an `Err`.

mod capabilities;
mod db_collection;
mod errors;
mod registry;

pub use capabilities::{Closeable, DocumentAddable, SnapshotResolvable};
pub use db_collection::{DbCollection, Document, WriteTrxOf};
pub use errors::{DocumentError, DocumentResult};
pub use registry::{CollectionId, CollectionRegistry, IdSequence};

use crate::revision::RevisionRef;

/// Parses a raw revision number, `-1` meaning latest.
pub fn parse_revision(raw: i64) -> DocumentResult<RevisionRef> {
    RevisionRef::try_from(raw).map_err(DocumentError::InvalidRevision)
}
