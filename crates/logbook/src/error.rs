//! Error types for the logbook engine

use logbook_core::{CellAddress, CellValue, RunNumber, TransportError};
use thiserror::Error;

/// Result type alias using [`LogbookError`]
pub type Result<T> = std::result::Result<T, LogbookError>;

/// Errors that can occur while reading or writing a logbook
#[derive(Debug, Error)]
pub enum LogbookError {
    /// The document could not be reached after all retries
    #[error("Could not connect to '{document}' after {attempts} attempts: {source}")]
    Connection {
        document: String,
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// A single transport call failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The run has no row in the selected sheet
    #[error("run_number {0} not found")]
    RunNotFound(RunNumber),

    /// The field is empty for the run and every run in its fallback window
    #[error("Value '{field}' not set for run_number {run}")]
    ValueNotSet { field: String, run: RunNumber },

    /// The field has no column in the selected sheet
    #[error("Field does not exist: {0}")]
    FieldNotFound(String),

    /// The target cell already holds a value and overwriting is off
    #[error("Cell {at} is not empty ({existing}), skipping write")]
    WriteConflict { at: CellAddress, existing: CellValue },

    /// The field has no entry in the unit row
    #[error("No unit for field: {0}")]
    UnitNotFound(String),

    /// The selected sheet is configured without a unit row
    #[error("Sheet has no unit row")]
    NoUnitRow,

    /// A filter criterion cannot be applied to its field
    #[error("Invalid filter on '{field}': {message}")]
    InvalidFilter { field: String, message: String },
}

impl LogbookError {
    /// Errors that reads and writes report softly instead of propagating
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            LogbookError::RunNotFound(_)
                | LogbookError::ValueNotSet { .. }
                | LogbookError::FieldNotFound(_)
                | LogbookError::WriteConflict { .. }
        )
    }

    pub(crate) fn invalid_filter<S: Into<String>>(field: &str, message: S) -> Self {
        LogbookError::InvalidFilter {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
