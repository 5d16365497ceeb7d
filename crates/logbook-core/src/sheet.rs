//! Capabilities a storage backend exposes to the engine
//!
//! A backend is a [`SheetClient`] that can authorize and open a named
//! [`Document`], whose worksheets are addressed by zero-based index. The
//! engine never sees the transport behind these traits.

use std::path::Path;

use crate::cell::{CellAddress, CellValue};
use crate::error::TransportResult;
use crate::table::Table;

/// Entry point of a backend
pub trait SheetClient {
    /// Document type this client opens
    type Document: Document;

    /// Obtain (or refresh) access using an opaque credential source
    fn authorize(&mut self, credentials: Option<&Path>) -> TransportResult<()>;

    /// Open a document by name
    fn open(&mut self, name: &str) -> TransportResult<Self::Document>;
}

/// An opened document holding several worksheets
pub trait Document {
    /// Worksheet handle type
    type Worksheet: Worksheet;

    /// Resolve a worksheet by zero-based index
    fn worksheet(&self, index: usize) -> TransportResult<Self::Worksheet>;
}

/// A handle to one worksheet
///
/// Every call is a round trip to the backend. Cell writes are single-cell
/// mutations; there is no batching.
pub trait Worksheet {
    /// Fetch the full cell grid, field-name row first
    fn get_all_values(&self) -> TransportResult<Vec<Vec<CellValue>>>;

    /// Read one cell
    fn cell(&self, at: CellAddress) -> TransportResult<CellValue>;

    /// Overwrite one cell with a string value
    fn update_cell(&self, at: CellAddress, value: &str) -> TransportResult<()>;

    /// Fetch all rows as a [`Table`] with `header_rows` metadata rows
    fn get_all_records(&self, header_rows: usize) -> TransportResult<Table> {
        Ok(Table::from_grid(self.get_all_values()?, header_rows))
    }
}
