//! CLI-specific error types

use std::fmt;
use std::io;

use crate::collection::DocumentError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdout)
    IoError,
    /// History fixture could not be loaded
    FixtureError,
    /// Argument combination not supported
    InvalidArgument,
    /// Lookup or storage failure
    DocumentError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CHRONO_CLI_CONFIG_ERROR",
            Self::IoError => "CHRONO_CLI_IO_ERROR",
            Self::FixtureError => "CHRONO_CLI_FIXTURE_ERROR",
            Self::InvalidArgument => "CHRONO_CLI_INVALID_ARGUMENT",
            Self::DocumentError => "CHRONO_CLI_DOCUMENT_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn fixture_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::FixtureError, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<DocumentError> for CliError {
    fn from(e: DocumentError) -> Self {
        Self::new(CliErrorCode::DocumentError, format!("[{}] {}", e.code(), e))
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        DocumentError::from(e).into()
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_error_keeps_inner_code() {
        let err = CliError::from(DocumentError::InvalidRevision(0));
        assert_eq!(err.code(), &CliErrorCode::DocumentError);
        assert!(err.message().contains("CHRONO_INVALID_REVISION"));
        assert!(err.to_string().starts_with("CHRONO_CLI_DOCUMENT_ERROR"));
    }
}
