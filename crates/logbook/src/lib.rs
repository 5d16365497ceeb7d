//! # logbook
//!
//! Cached, run-keyed read/write access to a two-sheet experiment logbook.
//!
//! A logbook is a remote spreadsheet document with a source worksheet of
//! recorded run parameters (field names in row 1, units in row 2) and a
//! write worksheet for derived values (field names only). Rows are keyed by
//! the `run_number` column.
//!
//! ## Features
//!
//! - Lazy connection with a fixed-pause retry loop
//! - Snapshot cache refreshed at most once per window (10 s by default)
//! - Value lookup with inheritance from up to 10 earlier runs
//! - Non-clobbering single-cell writes, with optional new columns
//! - Filtering on exact values, value lists and ranges, including
//!   `Date`, `Time` and the virtual `DateTime` field
//!
//! Storage is pluggable through the [`SheetClient`] traits of
//! `logbook-core`; [`MemoryClient`] is an in-memory implementation.
//!
//! ## Example
//!
//! ```rust
//! use logbook::prelude::*;
//!
//! let client = MemoryClient::new();
//! client.add_grid(
//!     "runs",
//!     vec![
//!         MemoryClient::grid(&[
//!             &["run_number", "Date", "Time", "energy"],
//!             &["#", "", "", "MeV"],
//!             &["1", "01/05/2024", "09:00", "10"],
//!             &["2", "01/05/2024", "13:30", ""],
//!             &["3", "01/06/2024", "08:15", "12"],
//!         ]),
//!         MemoryClient::grid(&[&["run_number", "fit"]]),
//!     ],
//! );
//!
//! let mut book = Logbook::new(client, LogbookConfig::new("runs"));
//!
//! // run 2 inherits the energy of run 1
//! let energy = book.get_value("energy", 2, Sheet::Source, false).unwrap();
//! assert_eq!(energy, CellValue::Number(10.0));
//!
//! let filter = Filter::new().eq("Date", "01/05/2024");
//! let result = book.query(Sheet::Source, &filter, None, false).unwrap();
//! assert_eq!(result.runs(), vec![1, 2]);
//!
//! let outcome = book
//!     .write("fit", 0.5, 2, WriteOptions::default(), false)
//!     .unwrap();
//! assert!(outcome.is_written());
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod connection;
pub mod error;
mod logbook;
pub mod lookup;
pub mod memory;
pub mod prelude;
pub mod query;
pub mod write;

pub use cache::{CacheState, SheetSnapshot, Snapshot};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LogbookConfig, Sheet};
pub use connection::{ConnectionManager, Handles};
pub use error::{LogbookError, Result};
pub use logbook::Logbook;
pub use memory::{MemoryClient, MemoryDocument, MemoryWorksheet};
pub use query::{Criterion, Filter, FilterValue, QueryResult, QueryRow};
pub use write::{WriteOptions, WriteOutcome};

// Re-export core types
pub use logbook_core::{
    CellAddress, CellValue, Document, Field, RecordSet, RunNumber, SheetClient, Table,
    TransportError, Worksheet, NOT_AVAILABLE, RUN_NUMBER_FIELD,
};
