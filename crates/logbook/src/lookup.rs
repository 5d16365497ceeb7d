//! Lookup engine: run/field resolution with fallback to earlier runs
//!
//! Settings are usually recorded only on the run where they change, so an
//! empty cell inherits the value of the nearest earlier run that has one.
//! The walk covers the requested run and the [`FALLBACK_WINDOW`] runs before
//! it. Free-text comment fields are per run and never inherit.

use logbook_core::{CellValue, Field, RecordSet, RunNumber, Table};

use crate::error::{LogbookError, Result};

/// How many earlier runs are searched for an inherited value
pub const FALLBACK_WINDOW: RunNumber = 10;

/// Fields whose name contains this marker never inherit
pub const COMMENT_MARKER: &str = "comment";

/// Whether empty values of `field` inherit from earlier runs
pub fn inherits(field: &str) -> bool {
    !field.contains(COMMENT_MARKER)
}

/// Resolve the value of `field` for `run`
///
/// Returns [`LogbookError::RunNotFound`] when `run` has no row and
/// [`LogbookError::ValueNotSet`] when nothing in the window is set. Runs
/// missing inside the window, and rows without the field, count as empty.
pub fn resolve(records: &RecordSet, field: &str, run: RunNumber) -> Result<CellValue> {
    if !records.contains_run(run) {
        return Err(LogbookError::RunNotFound(run));
    }

    let lowest = if inherits(field) {
        run.saturating_sub(FALLBACK_WINDOW)
    } else {
        run
    };

    for candidate in (lowest..=run).rev() {
        if let Field::Value(value) = records.field(candidate, field) {
            if candidate != run {
                log::trace!("'{field}' for run {run} inherited from run {candidate}");
            }
            return Ok(value.clone());
        }
    }

    Err(LogbookError::ValueNotSet {
        field: field.to_string(),
        run,
    })
}

/// Unit of `field` from the unit row of a raw table
///
/// A field with a blank unit cell yields an empty string.
pub fn unit(table: &Table, field: &str) -> Result<String> {
    let units = table.unit_row().ok_or(LogbookError::NoUnitRow)?;
    match units.get(field) {
        Field::Value(v) => Ok(v.to_string()),
        Field::Empty => Ok(String::new()),
        Field::Absent => Err(LogbookError::UnitNotFound(field.to_string())),
    }
}

/// Turn soft lookup misses into the `"n/a"` sentinel
///
/// Misses are logged as warnings when `verbose` is set. Transport and
/// connection failures are passed through.
pub(crate) fn soften(result: Result<CellValue>, verbose: bool) -> Result<CellValue> {
    match result {
        Err(e) if e.is_soft() => {
            if verbose {
                log::warn!("Error: {e}!");
            } else {
                log::debug!("{e}");
            }
            Ok(CellValue::not_available())
        }
        other => other,
    }
}
