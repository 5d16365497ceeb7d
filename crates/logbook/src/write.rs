//! Write engine: non-clobbering single-cell writes keyed by run and field

use logbook_core::{CellAddress, CellValue, RunNumber, Table, Worksheet};

use crate::config::Sheet;
use crate::error::{LogbookError, Result};

/// How a write is allowed to touch the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Target worksheet
    pub sheet: Sheet,
    /// Append a new column when the field does not exist yet
    pub allow_new_field: bool,
    /// Replace non-empty cells
    pub overwrite: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sheet: Sheet::Write,
            allow_new_field: false,
            overwrite: false,
        }
    }
}

impl WriteOptions {
    /// Write into the given sheet
    pub fn to(sheet: Sheet) -> Self {
        Self {
            sheet,
            ..Default::default()
        }
    }

    /// Allow appending a new column
    pub fn allow_new_field(mut self) -> Self {
        self.allow_new_field = true;
        self
    }

    /// Allow replacing non-empty cells
    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }
}

/// What a write did
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", rename_all = "snake_case"))]
pub enum WriteOutcome {
    /// The value was written into an existing column
    Written { at: CellAddress },
    /// A new column was appended and the value written into it
    CreatedField { header: CellAddress, at: CellAddress },
    /// The target cell was not empty; nothing was written there
    Conflict { at: CellAddress, existing: CellValue },
    /// The field has no column and creating one was not allowed
    FieldNotFound { field: String },
}

impl WriteOutcome {
    /// Check whether the value landed in the sheet
    pub fn is_written(&self) -> bool {
        matches!(
            self,
            WriteOutcome::Written { .. } | WriteOutcome::CreatedField { .. }
        )
    }

    /// Address of the written cell, or the soft failure as an error
    pub fn into_result(self) -> Result<CellAddress> {
        match self {
            WriteOutcome::Written { at } | WriteOutcome::CreatedField { at, .. } => Ok(at),
            WriteOutcome::Conflict { at, existing } => {
                Err(LogbookError::WriteConflict { at, existing })
            }
            WriteOutcome::FieldNotFound { field } => Err(LogbookError::FieldNotFound(field)),
        }
    }
}

/// Write `value` into `field` of `run`
///
/// `table` is the cached raw table of `sheet`; it locates the row and the
/// column, while the current contents of the target cells are read live
/// before each mutation.
///
/// When the run has no row yet, rows are assumed to be aligned 1:1 with run
/// numbers (see [`Table::aligned_index`]). The run number is written into that
/// row's run cell if the cell is empty (or `overwrite` is set). A run cell
/// that already holds a different run is reported as a conflict and nothing
/// is written, so a value never lands in another run's row.
#[allow(clippy::too_many_arguments)]
pub fn write_value<W: Worksheet>(
    sheet: &W,
    table: &Table,
    run_field: &str,
    field: &str,
    value: &str,
    run: RunNumber,
    options: &WriteOptions,
    verbose: bool,
) -> Result<WriteOutcome> {
    let run_col = table
        .column(run_field)
        .ok_or_else(|| LogbookError::FieldNotFound(run_field.to_string()))?;

    let index = match table.find_run(run_field, run) {
        Some(index) => index,
        None => {
            let index = table
                .aligned_index(run)
                .ok_or(LogbookError::RunNotFound(run))?;
            let at = table.address(index, run_col)?;
            let current = sheet.cell(at)?;

            if current.is_empty() || options.overwrite {
                sheet.update_cell(at, &run.to_string())?;
                log::debug!("Added run_number {run} at {at}");
            } else if current.as_integer() != Some(run) {
                return Ok(conflict(at, current, verbose));
            }
            index
        }
    };

    let col = match table.column(field) {
        Some(col) => col,
        None if options.allow_new_field => {
            let col = table.width();
            let header = table.header_address(col)?;
            let current = sheet.cell(header)?;

            if current.is_empty() {
                // a blank header may still sit above data
                let at = table.address(index, col)?;
                let existing = sheet.cell(at)?;
                if !existing.is_empty() && !options.overwrite {
                    return Ok(conflict(at, existing, verbose));
                }
                sheet.update_cell(header, field)?;
                sheet.update_cell(at, value)?;
                log::debug!("Created field '{field}' at {header}, wrote {at}");
                return Ok(WriteOutcome::CreatedField { header, at });
            }
            if current.to_string().trim() != field {
                return Ok(conflict(header, current, verbose));
            }
            // someone else created the column since the snapshot was taken
            col
        }
        None => {
            if verbose {
                log::warn!("Error: Key does not exist ({field})!");
            } else {
                log::debug!("Field '{field}' does not exist");
            }
            return Ok(WriteOutcome::FieldNotFound {
                field: field.to_string(),
            });
        }
    };

    let at = table.address(index, col)?;
    let current = sheet.cell(at)?;
    if current.is_empty() || options.overwrite {
        sheet.update_cell(at, value)?;
        log::debug!("Wrote '{field}' for run {run} at {at}");
        Ok(WriteOutcome::Written { at })
    } else {
        Ok(conflict(at, current, verbose))
    }
}

fn conflict(at: CellAddress, existing: CellValue, verbose: bool) -> WriteOutcome {
    if verbose {
        log::warn!("Cell {at} is not empty, skipping write.");
    } else {
        log::debug!("Cell {at} is not empty ({existing}), skipping write");
    }
    WriteOutcome::Conflict { at, existing }
}
