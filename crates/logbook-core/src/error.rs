//! Error types for logbook backends

use thiserror::Error;

/// Result type alias using [`TransportError`]
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Errors a storage backend can report while talking to a document
#[derive(Debug, Error)]
pub enum TransportError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Credentials were rejected or could not be loaded
    #[error("Authorization failed: {0}")]
    Unauthorized(String),

    /// The named document does not exist
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Worksheet index out of bounds
    #[error("Worksheet index {0} out of bounds (count: {1})")]
    WorksheetOutOfBounds(usize, usize),

    /// Row index beyond what a worksheet can address
    #[error("Row index {0} out of bounds")]
    RowOutOfBounds(usize),

    /// Column index beyond what a worksheet can address
    #[error("Column index {0} out of bounds")]
    ColumnOutOfBounds(usize),

    /// The remote side answered with an error
    #[error("Remote error: {0}")]
    Remote(String),

    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Create a new remote error with a message
    pub fn remote<S: Into<String>>(msg: S) -> Self {
        TransportError::Remote(msg.into())
    }
}
