//! Error types for the list management engine.
//!
//! This module defines the centralized error type [`FolioError`], the
//! [`ValidationError`] produced by form validation, and a [`Result`] alias used
//! throughout the crate. All errors are implemented with `thiserror`.

use crate::domain::record::RecordId;
use thiserror::Error;

/// A form value that failed local validation.
///
/// Validation happens before any remote call, so this error never reaches a
/// [`RemoteDataService`](crate::service::RemoteDataService).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending form field.
    pub field: String,
    /// Human-readable description of the rule that failed.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The main error type for Folio operations.
///
/// Covers the three failure classes of a list screen (transport, validation,
/// stale reference) plus the infrastructure failures of the bundled service
/// backends and configuration loading.
#[derive(Debug, Error)]
pub enum FolioError {
    /// The remote call was rejected or could not be delivered.
    ///
    /// Aborts the pending mutation; the collection is left unchanged and the
    /// error is never retried automatically.
    #[error("Transport error: {0}")]
    Transport(String),

    /// User input failed a local rule.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A mutation targeted a record the service does not know.
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    /// Reading or writing a service backend failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A sort was requested on a key the entity schema does not define.
    #[error("Unknown sort key: {0}")]
    UnknownSortKey(String),
}

impl FolioError {
    /// Returns `true` for failures caused by user input rather than the service.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// A specialized `Result` type for Folio operations.
pub type Result<T> = std::result::Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display_names_the_field() {
        let err = FolioError::from(ValidationError::new("price", "must be a number"));
        assert_eq!(err.to_string(), "Validation error: price: must be a number");
        assert!(err.is_validation());
    }

    #[test]
    fn not_found_display_includes_id() {
        let err = FolioError::NotFound(RecordId::from(42));
        assert_eq!(err.to_string(), "Record not found: 42");
        assert!(!err.is_validation());
    }
}
