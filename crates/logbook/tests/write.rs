//! Tests for non-clobbering writes

use logbook::prelude::*;
use logbook::{CellAddress, ManualClock};
use pretty_assertions::assert_eq;

fn client() -> MemoryClient {
    let client = MemoryClient::new();
    client.add_grid(
        "runs",
        vec![
            MemoryClient::grid(&[
                &["run_number", "energy"],
                &["#", "MeV"],
                &["1", "10"],
                &["2", ""],
            ]),
            MemoryClient::grid(&[&["run_number", "fit", "note"], &["1", "0.5", ""]]),
        ],
    );
    client
}

fn logbook(client: &MemoryClient) -> Logbook<MemoryClient> {
    Logbook::with_clock(client.clone(), LogbookConfig::new("runs"), ManualClock::new())
}

#[test]
fn test_write_into_empty_cell() {
    let client = client();
    let mut book = logbook(&client);

    let outcome = book
        .write("note", "good shot", 1, WriteOptions::default(), false)
        .unwrap();
    assert_eq!(
        outcome,
        WriteOutcome::Written {
            at: CellAddress::new(1, 2)
        }
    );

    // visible right away, the write invalidated the cache
    assert_eq!(
        book.get_value("note", 1, Sheet::Write, false).unwrap(),
        CellValue::text("good shot")
    );
}

#[test]
fn test_occupied_cell_is_not_clobbered() {
    let client = client();
    let mut book = logbook(&client);

    let outcome = book
        .write("fit", 0.7, 1, WriteOptions::default(), true)
        .unwrap();
    assert_eq!(
        outcome,
        WriteOutcome::Conflict {
            at: CellAddress::new(1, 1),
            existing: CellValue::Number(0.5),
        }
    );
    assert_eq!(client.update_count(), 0);
    assert_eq!(
        book.get_value("fit", 1, Sheet::Write, false).unwrap(),
        CellValue::Number(0.5)
    );

    let outcome = book
        .write("fit", 0.7, 1, WriteOptions::default().overwrite(), false)
        .unwrap();
    assert!(outcome.is_written());
    assert_eq!(
        book.get_value("fit", 1, Sheet::Write, false).unwrap(),
        CellValue::Number(0.7)
    );
}

#[test]
fn test_unknown_field() {
    let client = client();
    let mut book = logbook(&client);

    let outcome = book
        .write("gain", 3, 1, WriteOptions::default(), false)
        .unwrap();
    assert_eq!(
        outcome,
        WriteOutcome::FieldNotFound {
            field: "gain".into()
        }
    );
    assert_eq!(client.update_count(), 0);
    assert!(matches!(
        outcome.into_result(),
        Err(LogbookError::FieldNotFound(_))
    ));
}

#[test]
fn test_new_field_is_appended() {
    let client = client();
    let mut book = logbook(&client);

    let outcome = book
        .write("gain", 3, 1, WriteOptions::default().allow_new_field(), false)
        .unwrap();
    assert_eq!(
        outcome,
        WriteOutcome::CreatedField {
            header: CellAddress::new(0, 3),
            at: CellAddress::new(1, 3),
        }
    );
    assert_eq!(
        book.get_value("gain", 1, Sheet::Write, false).unwrap(),
        CellValue::Number(3.0)
    );

    let grid = client.sheet("runs", 1).unwrap();
    assert_eq!(grid[0][3], CellValue::text("gain"));
}

#[test]
fn test_new_field_created_concurrently() {
    let client = client();
    let mut book = logbook(&client);
    book.refresh(false).unwrap();

    // another writer adds the column after our snapshot
    client.set_cell("runs", 1, CellAddress::new(0, 3), "gain");
    let outcome = book
        .write("gain", 3, 1, WriteOptions::default().allow_new_field(), false)
        .unwrap();
    assert_eq!(
        outcome,
        WriteOutcome::Written {
            at: CellAddress::new(1, 3)
        }
    );

    book.refresh(false).unwrap();
    client.set_cell("runs", 1, CellAddress::new(0, 4), "other");
    let outcome = book
        .write("offset", 1, 1, WriteOptions::default().allow_new_field(), false)
        .unwrap();
    assert!(matches!(
        outcome,
        WriteOutcome::Conflict { at, .. } if at == CellAddress::new(0, 4)
    ));
}

#[test]
fn test_missing_run_gets_a_row() {
    let client = client();
    let mut book = logbook(&client);

    let outcome = book
        .write("fit", 1.5, 3, WriteOptions::default(), false)
        .unwrap();
    assert_eq!(
        outcome,
        WriteOutcome::Written {
            at: CellAddress::new(4, 1)
        }
    );
    assert_eq!(
        book.get_value("fit", 3, Sheet::Write, false).unwrap(),
        CellValue::Number(1.5)
    );

    // the second write finds the row instead of creating another
    book.write("note", "rerun", 3, WriteOptions::default(), false)
        .unwrap();
    let grid = client.sheet("runs", 1).unwrap();
    let rows_for_run_3 = grid
        .iter()
        .filter(|row| row.first() == Some(&CellValue::Number(3.0)))
        .count();
    assert_eq!(rows_for_run_3, 1);
    assert_eq!(grid[4][2], CellValue::text("rerun"));
}

#[test]
fn test_aligned_row_of_another_run_is_a_conflict() {
    let client = MemoryClient::new();
    client.add_grid(
        "runs",
        vec![
            MemoryClient::grid(&[&["run_number"], &["#"], &["1"]]),
            MemoryClient::grid(&[&["run_number", "fit"], &["1", ""], &["4", ""], &["9", ""]]),
        ],
    );
    let mut book = logbook(&client);

    let outcome = book
        .write("fit", 2, 2, WriteOptions::default(), false)
        .unwrap();
    assert_eq!(
        outcome,
        WriteOutcome::Conflict {
            at: CellAddress::new(3, 0),
            existing: CellValue::Number(9.0),
        }
    );
    assert_eq!(client.update_count(), 0);
}

#[test]
fn test_write_to_source_sheet() {
    let client = client();
    let mut book = logbook(&client);

    let outcome = book
        .write("energy", 11, 2, WriteOptions::to(Sheet::Source), false)
        .unwrap();
    assert_eq!(
        outcome,
        WriteOutcome::Written {
            at: CellAddress::new(3, 1)
        }
    );
    assert_eq!(
        book.get_value("energy", 2, Sheet::Source, false).unwrap(),
        CellValue::Number(11.0)
    );

    // run 5 lands on raw index 5, spreadsheet row 7
    book.write("energy", 14, 5, WriteOptions::to(Sheet::Source), false)
        .unwrap();
    let grid = client.sheet("runs", 0).unwrap();
    assert_eq!(grid[6][0], CellValue::Number(5.0));
    assert_eq!(
        book.get_value("energy", 5, Sheet::Source, false).unwrap(),
        CellValue::Number(14.0)
    );
}

#[test]
fn test_next_source_run_follows_without_gap() {
    let client = client();
    let mut book = logbook(&client);

    let outcome = book
        .write("energy", 12, 3, WriteOptions::to(Sheet::Source), false)
        .unwrap();
    assert_eq!(
        outcome,
        WriteOutcome::Written {
            at: CellAddress::new(4, 1)
        }
    );

    let grid = client.sheet("runs", 0).unwrap();
    assert_eq!(grid.len(), 5);
    assert_eq!(grid[3][0], CellValue::Number(2.0));
    assert_eq!(grid[4][0], CellValue::Number(3.0));

    // run 0 would overwrite the unit row
    assert!(matches!(
        book.write("energy", 1, 0, WriteOptions::to(Sheet::Source), false),
        Err(LogbookError::RunNotFound(0))
    ));
    assert_eq!(
        book.get_unit("energy", Sheet::Source, false).unwrap(),
        "MeV"
    );
}

#[test]
fn test_new_field_keeps_data_under_blank_header() {
    let client = MemoryClient::new();
    client.add_grid(
        "runs",
        vec![
            MemoryClient::grid(&[&["run_number"], &["#"], &["1"]]),
            MemoryClient::grid(&[&["run_number", "fit"], &["1", "0.5", "keep me"]]),
        ],
    );
    let mut book = logbook(&client);

    let outcome = book
        .write("gain", 3, 1, WriteOptions::default().allow_new_field(), false)
        .unwrap();
    assert_eq!(
        outcome,
        WriteOutcome::Conflict {
            at: CellAddress::new(1, 2),
            existing: CellValue::text("keep me"),
        }
    );
    assert_eq!(client.update_count(), 0);

    let grid = client.sheet("runs", 1).unwrap();
    assert!(grid[0].get(2).map_or(true, CellValue::is_empty));
    assert_eq!(grid[1][2], CellValue::text("keep me"));

    // overwrite claims the column
    let outcome = book
        .write(
            "gain",
            3,
            1,
            WriteOptions::default().allow_new_field().overwrite(),
            false,
        )
        .unwrap();
    assert!(matches!(outcome, WriteOutcome::CreatedField { .. }));
    assert_eq!(
        book.get_value("gain", 1, Sheet::Write, false).unwrap(),
        CellValue::Number(3.0)
    );
}

#[test]
fn test_negative_run_is_rejected() {
    let client = client();
    let mut book = logbook(&client);

    assert!(matches!(
        book.write("fit", 1, -1, WriteOptions::default(), false),
        Err(LogbookError::RunNotFound(-1))
    ));
}

#[test]
fn test_write_without_connection_fails() {
    let client = client();
    let mut book = logbook(&client);
    client.fail_next_opens(100);

    assert!(matches!(
        book.write("fit", 1, 1, WriteOptions::default(), false),
        Err(LogbookError::Connection { .. })
    ));
}
