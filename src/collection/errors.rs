//! # Collection Errors

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for collection operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Collection errors
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("collection {collection} holds {count} resources, name one explicitly")]
    AmbiguousResource { collection: String, count: usize },

    #[error("collection {0} holds no resources")]
    EmptyCollection(String),

    #[error("invalid revision number: {0}")]
    InvalidRevision(i64),

    #[error("failed to ingest resource {resource}: {source}")]
    Ingestion {
        resource: String,
        #[source]
        source: StorageError,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DocumentError {
    /// Stable code, storage errors keep their own
    pub fn code(&self) -> &'static str {
        match self {
            DocumentError::AmbiguousResource { .. } => "CHRONO_AMBIGUOUS_RESOURCE",
            DocumentError::EmptyCollection(_) => "CHRONO_EMPTY_COLLECTION",
            DocumentError::InvalidRevision(_) => "CHRONO_INVALID_REVISION",
            DocumentError::Ingestion { .. } => "CHRONO_INGESTION_FAILED",
            DocumentError::Storage(err) => err.code().code(),
        }
    }

    /// The storage error underneath, if any
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            DocumentError::Ingestion { source, .. } => Some(source),
            DocumentError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageErrorCode;

    #[test]
    fn test_codes() {
        assert_eq!(DocumentError::InvalidRevision(0).code(), "CHRONO_INVALID_REVISION");
        assert_eq!(
            DocumentError::EmptyCollection("c".into()).code(),
            "CHRONO_EMPTY_COLLECTION"
        );
        assert_eq!(
            DocumentError::from(StorageError::trx_closed()).code(),
            "CHRONO_TRX_CLOSED"
        );
    }

    #[test]
    fn test_ingestion_keeps_storage_cause() {
        let err = DocumentError::Ingestion {
            resource: "resource1".into(),
            source: StorageError::resource_exists("resource1"),
        };
        assert_eq!(
            err.storage_error().map(|e| e.code()),
            Some(StorageErrorCode::ResourceExists)
        );
        assert!(err.to_string().contains("resource1"));
    }

    /// An I/O failure inside a store stays reachable through `source()`.
    #[test]
    fn test_io_failure_source_chain() {
        use std::error::Error;
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "page truncated");
        let err = DocumentError::Ingestion {
            resource: "resource4".into(),
            source: StorageError::io_error("failed to read revision page", io_err),
        };
        assert_eq!(err.storage_error().map(|e| e.code()), Some(StorageErrorCode::StorageIoError));

        let storage = err.source().unwrap();
        assert!(storage.to_string().contains("CHRONO_STORAGE_IO_ERROR"));
        let root = storage.source().unwrap().downcast_ref::<io::Error>().unwrap();
        assert_eq!(root.kind(), io::ErrorKind::UnexpectedEof);

        let eio = io::Error::new(io::ErrorKind::Other, "eio");
        let wrapped = DocumentError::from(StorageError::io_error("flush failed", eio));
        assert_eq!(wrapped.code(), "CHRONO_STORAGE_IO_ERROR");
        assert!(wrapped.source().and_then(|e| e.downcast_ref::<io::Error>()).is_some());
    }

    #[test]
    fn test_ambiguous_message() {
        let err = DocumentError::AmbiguousResource {
            collection: "books".into(),
            count: 2,
        };
        assert_eq!(err.to_string(), "collection books holds 2 resources, name one explicitly");
    }
}
