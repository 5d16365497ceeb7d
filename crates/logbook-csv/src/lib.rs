//! # logbook-csv
//!
//! A logbook backend over plain CSV files.
//!
//! A document is a directory below the client's root; its worksheets are
//! the `*.csv` files in that directory, ordered by file name. Reading a
//! worksheet parses the whole file, and every cell update rewrites it.

mod client;
mod error;
mod options;
mod reader;
mod writer;

pub use client::{CsvClient, CsvDocument, CsvWorksheet};
pub use error::{CsvError, CsvResult};
pub use options::{CsvOptions, LineTerminator};
pub use reader::read_records;
pub use writer::write_records;
