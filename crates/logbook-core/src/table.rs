//! Sheet contents: the raw table and the run-indexed clean view

use ahash::AHashMap;

use crate::cell::{CellAddress, CellValue, Field};
use crate::error::{TransportError, TransportResult};

/// Identifier of one experimental run, the primary key of both sheets
pub type RunNumber = i64;

/// Raw contents of a worksheet
///
/// The first grid row holds the field names. Every row below it is kept
/// verbatim in [`Table::rows`], so with two header rows the unit row is the
/// pseudo-record at index 0 and data starts at index 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    keys: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    header_rows: usize,
}

impl Table {
    /// Build a table from a full cell grid
    ///
    /// `header_rows` counts the leading grid rows that are metadata (field
    /// names first, then units). Values below 1 are treated as 1.
    pub fn from_grid(grid: Vec<Vec<CellValue>>, header_rows: usize) -> Self {
        let mut grid = grid.into_iter();
        let mut keys: Vec<String> = grid
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        while keys.last().is_some_and(|k| k.is_empty()) {
            keys.pop();
        }

        Self {
            keys,
            rows: grid.collect(),
            header_rows: header_rows.max(1),
        }
    }

    /// Field names in column order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of named columns
    pub fn width(&self) -> usize {
        self.keys.len()
    }

    /// Number of header rows, field-name row included
    pub fn header_rows(&self) -> usize {
        self.header_rows
    }

    /// Column index of a field
    pub fn column(&self, field: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == field)
    }

    /// Every row below the field-name row, header pseudo-records included
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Index in [`Table::rows`] of the first data row
    pub fn first_data_index(&self) -> usize {
        self.header_rows - 1
    }

    /// The unit row, when the sheet has one
    pub fn unit_row(&self) -> Option<Record<'_>> {
        if self.header_rows < 2 {
            return None;
        }
        let cells = self.rows.first().map(Vec::as_slice).unwrap_or(&[]);
        Some(Record::new(&self.keys, cells))
    }

    /// Row at a raw index
    pub fn record(&self, index: usize) -> Option<Record<'_>> {
        self.rows.get(index).map(|cells| Record::new(&self.keys, cells))
    }

    /// Data rows with their raw index
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, Record<'_>)> {
        self.rows
            .iter()
            .enumerate()
            .skip(self.first_data_index())
            .map(|(i, cells)| (i, Record::new(&self.keys, cells)))
    }

    /// Raw index of the first data row whose run cell equals `run`
    pub fn find_run(&self, run_field: &str, run: RunNumber) -> Option<usize> {
        self.data_rows()
            .find(|(_, record)| record.run(run_field) == Some(run))
            .map(|(i, _)| i)
    }

    /// Raw index a run would occupy if rows were aligned 1:1 with run numbers
    ///
    /// The run number is used as the raw index itself, so run `n` sits on
    /// spreadsheet row `n + 2`. Runs that would land on a header row yield `None`.
    pub fn aligned_index(&self, run: RunNumber) -> Option<usize> {
        usize::try_from(run)
            .ok()
            .filter(|&index| index >= self.first_data_index())
    }

    /// Sheet address of the cell at a raw row index and column
    pub fn address(&self, index: usize, col: usize) -> TransportResult<CellAddress> {
        let row = index
            .checked_add(1)
            .ok_or(TransportError::RowOutOfBounds(index))?;
        CellAddress::from_indices(row, col)
    }

    /// Sheet address of a field-name cell
    pub fn header_address(&self, col: usize) -> TransportResult<CellAddress> {
        CellAddress::from_indices(0, col)
    }
}

/// A borrowed view of one row, addressable by field name
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    keys: &'a [String],
    cells: &'a [CellValue],
}

impl<'a> Record<'a> {
    /// Create a record view over a row
    pub fn new(keys: &'a [String], cells: &'a [CellValue]) -> Self {
        Self { keys, cells }
    }

    /// Read a field
    ///
    /// A named column past the end of a short row reads as [`Field::Empty`];
    /// an unknown field name is [`Field::Absent`].
    pub fn get(&self, field: &str) -> Field<'a> {
        match self.keys.iter().position(|k| k == field) {
            Some(col) => match self.cells.get(col) {
                Some(v) => Field::of(Some(v)),
                None => Field::Empty,
            },
            None => Field::Absent,
        }
    }

    /// Run number of this row, if its run cell is integer-like
    pub fn run(&self, run_field: &str) -> Option<RunNumber> {
        self.get(run_field).value().and_then(CellValue::as_integer)
    }

    /// Iterate over `(field, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Field<'a>)> {
        let cells = self.cells;
        self.keys.iter().enumerate().map(move |(col, key)| {
            let field = match cells.get(col) {
                Some(v) => Field::of(Some(v)),
                None => Field::Empty,
            };
            (key.as_str(), field)
        })
    }
}

/// Data rows with a non-empty run identifier, indexed by run number
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    keys: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    runs: Vec<Option<RunNumber>>,
    index: AHashMap<RunNumber, usize>,
}

impl RecordSet {
    /// Build the clean view of a table
    ///
    /// Rows whose run cell is blank are dropped. Rows whose run cell is
    /// non-empty but not an integer are kept but cannot be looked up by run.
    /// When a run appears twice, the first row wins.
    pub fn from_table(table: &Table, run_field: &str) -> Self {
        let mut set = RecordSet {
            keys: table.keys().to_vec(),
            ..Default::default()
        };

        for (_, record) in table.data_rows() {
            let cell = record.get(run_field);
            if !cell.is_set() {
                continue;
            }

            let run = cell.value().and_then(CellValue::as_integer);
            if let Some(run) = run {
                set.index.entry(run).or_insert(set.rows.len());
            }
            set.runs.push(run);
            set.rows.push(record.cells.to_vec());
        }

        set
    }

    /// Field names in column order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Check whether a field name exists
    pub fn has_field(&self, field: &str) -> bool {
        self.keys.iter().any(|k| k == field)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check whether a run has a row
    pub fn contains_run(&self, run: RunNumber) -> bool {
        self.index.contains_key(&run)
    }

    /// Row for a run
    pub fn record(&self, run: RunNumber) -> Option<Record<'_>> {
        self.index
            .get(&run)
            .map(|&i| Record::new(&self.keys, &self.rows[i]))
    }

    /// Read one field of one run; a missing run reads as [`Field::Absent`]
    pub fn field(&self, run: RunNumber, field: &str) -> Field<'_> {
        self.record(run).map_or(Field::Absent, |r| r.get(field))
    }

    /// Iterate over rows in sheet order with their run number
    pub fn iter(&self) -> impl Iterator<Item = (Option<RunNumber>, Record<'_>)> {
        self.runs
            .iter()
            .zip(&self.rows)
            .map(|(run, cells)| (*run, Record::new(&self.keys, cells)))
    }
}
