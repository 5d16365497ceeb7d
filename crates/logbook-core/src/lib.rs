//! # logbook-core
//!
//! Core data structures for the logbook accessor.
//!
//! This crate provides the fundamental types shared by the engine and the
//! storage backends:
//! - [`CellValue`] and [`Field`] - Typed cell values and the three-way row accessor result
//! - [`CellAddress`] - A cell's location within a worksheet
//! - [`Table`] and [`RecordSet`] - Raw sheet contents and the run-indexed clean view
//! - [`SheetClient`], [`Document`], [`Worksheet`] - The capabilities a backend exposes
//!
//! ## Example
//!
//! ```rust
//! use logbook_core::{CellValue, Field, RecordSet, Table};
//!
//! let grid = vec![
//!     vec![CellValue::from("run_number"), CellValue::from("temp")],
//!     vec![CellValue::from(1), CellValue::from(20)],
//!     vec![CellValue::from(2), CellValue::Empty],
//! ];
//! let table = Table::from_grid(grid, 1);
//! let records = RecordSet::from_table(&table, "run_number");
//!
//! assert_eq!(records.field(1, "temp"), Field::Value(&CellValue::Number(20.0)));
//! assert_eq!(records.field(2, "temp"), Field::Empty);
//! assert_eq!(records.field(2, "pressure"), Field::Absent);
//! ```

pub mod cell;
pub mod error;
pub mod sheet;
pub mod table;

// Re-exports for convenience
pub use cell::{CellAddress, CellValue, Field, NOT_AVAILABLE};
pub use error::{TransportError, TransportResult};
pub use sheet::{Document, SheetClient, Worksheet};
pub use table::{Record, RecordSet, RunNumber, Table};

/// Default name of the column holding run identifiers
pub const RUN_NUMBER_FIELD: &str = "run_number";
