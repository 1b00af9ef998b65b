//! Storage error types
//!
//! Error codes:
//! - CHRONO_RESOURCE_NOT_FOUND (ERROR severity)
//! - CHRONO_RESOURCE_EXISTS (ERROR severity)
//! - CHRONO_REVISION_OUT_OF_RANGE (ERROR severity)
//! - CHRONO_REVERT_REJECTED (ERROR severity)
//! - CHRONO_WRITE_TRX_RUNNING (ERROR severity)
//! - CHRONO_NODE_NOT_FOUND (ERROR severity)
//! - CHRONO_TRX_CLOSED (ERROR severity)
//! - CHRONO_DATABASE_CLOSED (ERROR severity)
//! - CHRONO_STORAGE_IO_ERROR (FATAL severity)

use std::fmt;
use std::io;

use crate::revision::RevisionNumber;

use super::NodeKey;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, the store stays usable
    Error,
    /// The store can no longer be trusted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// No resource with the requested name
    ResourceNotFound,
    /// A resource with the requested name already exists
    ResourceExists,
    /// Requested revision is not sealed yet
    RevisionOutOfRange,
    /// Revert target is not strictly before the latest revision
    RevertRejected,
    /// A second write transaction was requested on one resource
    WriteTrxRunning,
    /// Cursor target does not exist in the revision
    NodeNotFound,
    /// Transaction was already closed
    TrxClosed,
    /// Database was already closed
    DatabaseClosed,
    /// Underlying I/O failure
    StorageIoError,
}

impl StorageErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::ResourceNotFound => "CHRONO_RESOURCE_NOT_FOUND",
            StorageErrorCode::ResourceExists => "CHRONO_RESOURCE_EXISTS",
            StorageErrorCode::RevisionOutOfRange => "CHRONO_REVISION_OUT_OF_RANGE",
            StorageErrorCode::RevertRejected => "CHRONO_REVERT_REJECTED",
            StorageErrorCode::WriteTrxRunning => "CHRONO_WRITE_TRX_RUNNING",
            StorageErrorCode::NodeNotFound => "CHRONO_NODE_NOT_FOUND",
            StorageErrorCode::TrxClosed => "CHRONO_TRX_CLOSED",
            StorageErrorCode::DatabaseClosed => "CHRONO_DATABASE_CLOSED",
            StorageErrorCode::StorageIoError => "CHRONO_STORAGE_IO_ERROR",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::StorageIoError => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error type with full context
#[derive(Debug)]
pub struct StorageError {
    /// Error code
    code: StorageErrorCode,
    /// Human-readable message
    message: String,
    /// Optional details about the error context
    details: Option<String>,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl StorageError {
    fn new(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }

    /// No resource called `name`
    pub fn resource_not_found(name: &str) -> Self {
        Self::new(StorageErrorCode::ResourceNotFound, "resource does not exist")
            .with_details(format!("resource: {}", name))
    }

    /// Resource `name` already exists
    pub fn resource_exists(name: &str) -> Self {
        Self::new(StorageErrorCode::ResourceExists, "resource already exists")
            .with_details(format!("resource: {}", name))
    }

    /// `requested` is past the most recent sealed revision
    pub fn revision_out_of_range(requested: RevisionNumber, most_recent: RevisionNumber) -> Self {
        Self::new(
            StorageErrorCode::RevisionOutOfRange,
            format!("revision {} is not sealed", requested),
        )
        .with_details(format!("most_recent: {}", most_recent))
    }

    /// Revert to `target` refused because it is not before `most_recent`
    pub fn revert_rejected(target: RevisionNumber, most_recent: RevisionNumber) -> Self {
        Self::new(
            StorageErrorCode::RevertRejected,
            format!("cannot revert to revision {}", target),
        )
        .with_details(format!("most_recent: {}", most_recent))
    }

    /// A write transaction is already live on `resource`
    pub fn write_trx_running(resource: &str) -> Self {
        Self::new(
            StorageErrorCode::WriteTrxRunning,
            "a write transaction is already running",
        )
        .with_details(format!("resource: {}", resource))
    }

    /// Node `key` is absent from `revision`
    pub fn node_not_found(key: NodeKey, revision: RevisionNumber) -> Self {
        Self::new(
            StorageErrorCode::NodeNotFound,
            format!("node {} does not exist", key),
        )
        .with_details(format!("revision: {}", revision))
    }

    /// Transaction was used after close
    pub fn trx_closed() -> Self {
        Self::new(StorageErrorCode::TrxClosed, "transaction is closed")
    }

    /// Database was used after close
    pub fn database_closed(name: &str) -> Self {
        Self::new(StorageErrorCode::DatabaseClosed, "database is closed")
            .with_details(format!("database: {}", name))
    }

    /// Create a new storage I/O error
    ///
    /// The in-memory store never fails this way; stores backed by files or
    /// the network use it to keep the underlying `io::Error` as the source.
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::StorageIoError,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error leaves the store untrustworthy
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
