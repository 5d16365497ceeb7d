//! Logbook configuration

use std::path::PathBuf;
use std::time::Duration;

use logbook_core::RUN_NUMBER_FIELD;

/// Which of the two logbook worksheets an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Sheet {
    /// The recorded-data sheet, with field-name and unit header rows
    #[default]
    Source,
    /// The derived/annotated sheet, with a single field-name header row
    Write,
}

/// Options for opening a logbook
///
/// Only the document name is required; everything else has a default
/// matching the usual layout (source sheet 0 with field names and units,
/// write sheet 1 with field names only, 10 second cache window).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LogbookConfig {
    /// Name of the document to open
    pub document_name: String,
    /// Opaque credential source handed to the backend
    pub credential_source: Option<PathBuf>,
    /// Zero-based index of the source worksheet
    pub source_sheet_index: usize,
    /// Zero-based index of the write worksheet
    pub write_sheet_index: usize,
    /// Leading metadata rows in the source sheet (field names, then units)
    pub header_rows: usize,
    /// Leading metadata rows in the write sheet
    pub write_header_rows: usize,
    /// Minimum interval between remote refreshes, in seconds
    pub cache_window_secs: f64,
    /// Column holding run identifiers
    pub run_field: String,
    /// Connection attempts before giving up
    pub retry_attempts: u32,
    /// Fixed pause after each failed connection attempt, in seconds
    pub retry_backoff_secs: f64,
}

impl Default for LogbookConfig {
    fn default() -> Self {
        Self {
            document_name: String::new(),
            credential_source: None,
            source_sheet_index: 0,
            write_sheet_index: 1,
            header_rows: 2,
            write_header_rows: 1,
            cache_window_secs: 10.0,
            run_field: RUN_NUMBER_FIELD.to_string(),
            retry_attempts: 5,
            retry_backoff_secs: 2.0,
        }
    }
}

impl LogbookConfig {
    /// Create a configuration for a document with default settings
    pub fn new<S: Into<String>>(document_name: S) -> Self {
        Self {
            document_name: document_name.into(),
            ..Default::default()
        }
    }

    /// Set the credential source
    pub fn credentials<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.credential_source = Some(path.into());
        self
    }

    /// Set both worksheet indices
    pub fn sheets(mut self, source: usize, write: usize) -> Self {
        self.source_sheet_index = source;
        self.write_sheet_index = write;
        self
    }

    /// Set the source sheet header-row count
    pub fn header_rows(mut self, rows: usize) -> Self {
        self.header_rows = rows;
        self
    }

    /// Set the cache window
    pub fn cache_window(mut self, window: Duration) -> Self {
        self.cache_window_secs = window.as_secs_f64();
        self
    }

    /// Set the retry policy of the connection manager
    pub fn retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_backoff_secs = backoff.as_secs_f64();
        self
    }

    /// Cache window as a [`Duration`]
    pub fn cache_window_duration(&self) -> Duration {
        secs(self.cache_window_secs)
    }

    /// Retry backoff as a [`Duration`]
    pub fn retry_backoff(&self) -> Duration {
        secs(self.retry_backoff_secs)
    }

    /// Header-row count of a sheet
    pub fn header_rows_of(&self, sheet: Sheet) -> usize {
        match sheet {
            Sheet::Source => self.header_rows,
            Sheet::Write => self.write_header_rows,
        }
    }
}

fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}
