//! CSV backend error types

use logbook_core::TransportError;
use thiserror::Error;

/// Result type for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors that can occur while reading or writing CSV worksheets
#[derive(Debug, Error)]
pub enum CsvError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<CsvError> for TransportError {
    fn from(err: CsvError) -> Self {
        match err {
            CsvError::Io(e) => TransportError::Io(e),
            other => TransportError::Backend(Box::new(other)),
        }
    }
}
