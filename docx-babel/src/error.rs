//! Error types for conversion and format operations

use thiserror::Error;

/// Errors that can occur while loading snapshots or serializing documents
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error while reading a block snapshot or a source document
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Format does not support the requested operation
    #[error("Operation not supported: {0}")]
    NotSupported(String),
    /// Filesystem failure while publishing
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for FormatError {
    fn from(err: std::io::Error) -> Self {
        FormatError::Io(err.to_string())
    }
}

/// Failure reported by an external resource capability.
///
/// These never escape the resolver: a failed fetch degrades to "no content".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("image encoding failed: {0}")]
    Encode(String),
    #[error("invalid download url: {0}")]
    Url(String),
}
