//! Tests for value and unit lookup through the logbook

use logbook::lookup::{self, FALLBACK_WINDOW};
use logbook::prelude::*;
use logbook::{ManualClock, RecordSet, Table};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn logbook() -> Logbook<MemoryClient> {
    let client = MemoryClient::new();
    client.add_grid(
        "runs",
        vec![
            MemoryClient::grid(&[
                &["run_number", "energy", "mode", "comment"],
                &["#", "MeV", "", ""],
                &["1", "10", "fast", "first light"],
                &["2", "", "", ""],
                &["3", "12", "", "realigned"],
                &["", "99", "ignored", ""],
                &["5", "", "slow", ""],
            ]),
            MemoryClient::grid(&[&["run_number", "fit"], &["1", "0.5"], &["2", ""]]),
        ],
    );
    Logbook::with_clock(client, LogbookConfig::new("runs"), ManualClock::new())
}

#[test]
fn test_get_value_inherits() {
    let mut book = logbook();

    assert_eq!(
        book.get_value("energy", 1, Sheet::Source, false).unwrap(),
        CellValue::Number(10.0)
    );
    assert_eq!(
        book.get_value("energy", 2, Sheet::Source, false).unwrap(),
        CellValue::Number(10.0)
    );
    // run 4 is missing, so run 5 reaches run 3
    assert_eq!(
        book.get_value("energy", 5, Sheet::Source, false).unwrap(),
        CellValue::Number(12.0)
    );
    assert_eq!(
        book.get_value("mode", 3, Sheet::Source, false).unwrap(),
        CellValue::text("fast")
    );
    assert_eq!(
        book.get_value("fit", 2, Sheet::Write, false).unwrap(),
        CellValue::Number(0.5)
    );
}

#[test]
fn test_comment_is_per_run() {
    let mut book = logbook();

    assert_eq!(
        book.get_value("comment", 1, Sheet::Source, false).unwrap(),
        CellValue::text("first light")
    );
    assert!(book
        .get_value("comment", 2, Sheet::Source, false)
        .unwrap()
        .is_not_available());
}

#[test]
fn test_misses_are_not_available() {
    let mut book = logbook();

    // unknown run
    let value = book.get_value("energy", 40, Sheet::Source, false).unwrap();
    assert_eq!(value.to_string(), NOT_AVAILABLE);
    // row without a run identifier is invisible
    assert!(book
        .get_value("energy", 4, Sheet::Source, true)
        .unwrap()
        .is_not_available());
    // unknown field
    assert!(book
        .get_value("pressure", 1, Sheet::Source, false)
        .unwrap()
        .is_not_available());
}

#[test]
fn test_strict_lookup_reports_misses() {
    let mut book = logbook();

    assert!(matches!(
        book.lookup("energy", 40, Sheet::Source, false),
        Err(LogbookError::RunNotFound(40))
    ));
    assert!(matches!(
        book.lookup("comment", 2, Sheet::Source, false),
        Err(LogbookError::ValueNotSet { run: 2, .. })
    ));
    assert_eq!(
        book.lookup("energy", 3, Sheet::Source, false).unwrap(),
        CellValue::Number(12.0)
    );
}

#[test]
fn test_get_unit() {
    let mut book = logbook();

    assert_eq!(book.get_unit("energy", Sheet::Source, false).unwrap(), "MeV");
    assert_eq!(book.get_unit("run_number", Sheet::Source, false).unwrap(), "#");
    assert_eq!(book.get_unit("mode", Sheet::Source, false).unwrap(), "");
    assert!(matches!(
        book.get_unit("pressure", Sheet::Source, false),
        Err(LogbookError::UnitNotFound(_))
    ));
    assert!(matches!(
        book.get_unit("fit", Sheet::Write, false),
        Err(LogbookError::NoUnitRow)
    ));
}

fn column(values: &[Option<u8>]) -> RecordSet {
    let mut grid = vec![vec![CellValue::from("run_number"), CellValue::from("v")]];
    for (run, value) in values.iter().enumerate() {
        let cell = value.map_or(CellValue::Empty, |v| CellValue::from(v as i64));
        grid.push(vec![CellValue::from(run as i64), cell]);
    }
    RecordSet::from_table(&Table::from_grid(grid, 1), "run_number")
}

proptest! {
    #[test]
    fn prop_resolves_nearest_set_run_in_window(
        values in prop::collection::vec(prop::option::of(0u8..100), 1..40),
        pick in any::<prop::sample::Index>(),
    ) {
        let records = column(&values);
        let run = pick.index(values.len());

        let expected = (0..=run)
            .rev()
            .take(FALLBACK_WINDOW as usize + 1)
            .find_map(|r| values[r]);

        match (lookup::resolve(&records, "v", run as i64), expected) {
            (Ok(value), Some(v)) => prop_assert_eq!(value, CellValue::Number(v as f64)),
            (Err(LogbookError::ValueNotSet { .. }), None) => {}
            (other, expected) => prop_assert!(false, "got {:?}, expected {:?}", other, expected),
        }
    }

    #[test]
    fn prop_comment_fields_never_inherit(
        values in prop::collection::vec(prop::option::of(0u8..100), 1..20),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut grid = vec![vec![CellValue::from("run_number"), CellValue::from("comment")]];
        for (run, value) in values.iter().enumerate() {
            let cell = value.map_or(CellValue::Empty, |v| CellValue::from(v as i64));
            grid.push(vec![CellValue::from(run as i64), cell]);
        }
        let records = RecordSet::from_table(&Table::from_grid(grid, 1), "run_number");
        let run = pick.index(values.len());

        let resolved = lookup::resolve(&records, "comment", run as i64).ok();
        prop_assert_eq!(resolved, values[run].map(|v| CellValue::Number(v as f64)));
    }
}
