//! Error types for docseek.

use thiserror::Error;

/// Result type alias using docseek's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for docseek operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Search query absent or blank after trimming
    #[error("Missing or empty search query")]
    MissingQuery,

    /// Embedding generation failed, timed out, or returned a malformed vector
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Document store could not be read or written
    #[error("Repository error: {0}")]
    Repository(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Upload has an extension or MIME type no extractor handles
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the caller is at fault (400/404-equivalent).
    ///
    /// Everything else is a server-side failure and maps to a 500-equivalent.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MissingQuery
                | Error::InvalidInput(_)
                | Error::UnsupportedFileType(_)
                | Error::NotFound(_)
        )
    }
}
