//! CSV reader

use std::io::Read;

use crate::error::CsvResult;
use crate::options::CsvOptions;

/// Read every record as raw strings
///
/// There is no header handling; the field-name row is just the first
/// record. Records may have different lengths.
pub fn read_records<R: Read>(reader: R, options: &CsvOptions) -> CsvResult<Vec<Vec<String>>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .quote(options.quote)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_ragged_rows() {
        let data = "run_number,temp,note\n1,20\n2,,\"a, b\"\n";
        let rows = read_records(data.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["run_number", "temp", "note"],
                vec!["1", "20"],
                vec!["2", "", "a, b"],
            ]
        );
    }

    #[test]
    fn test_read_tsv() {
        let rows = read_records("a\tb\n1\t2\n".as_bytes(), &CsvOptions::tsv()).unwrap();
        assert_eq!(rows[1], vec!["1", "2"]);
    }
}
