//! Error types for fhir-childmatch
//!
//! This module defines all error types used throughout the library.
//! Missing data (no matching children, no profile, no regex extension) is
//! never an error: it is reported as an empty collection or `None`.

use thiserror::Error;

/// Result type alias using the crate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for fhir-childmatch operations
#[derive(Error, Debug)]
pub enum Error {
    /// A definition cursor could not be returned to its bookmark.
    ///
    /// The cursor is left in an undefined position and must not be reused.
    #[error("cursor invariant violated: {0}")]
    CursorRestore(String),

    /// Malformed structure definition
    #[error("definition error: {0}")]
    Definition(String),

    /// Value error (invalid value, e.g. an uncompilable pattern)
    #[error("value error: {0}")]
    Value(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Whether this error leaves a cursor unusable
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::CursorRestore(_))
    }
}
