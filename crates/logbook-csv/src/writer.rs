//! CSV writer

use std::io::Write;

use crate::error::CsvResult;
use crate::options::CsvOptions;

/// Write records, padding every row to the widest one
pub fn write_records<W: Write>(
    rows: &[Vec<String>],
    writer: W,
    options: &CsvOptions,
) -> CsvResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .quote(options.quote)
        .terminator(options.line_terminator.to_csv())
        .from_writer(writer);

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in rows {
        let padding = std::iter::repeat("").take(width - row.len());
        csv_writer.write_record(row.iter().map(String::as_str).chain(padding))?;
    }

    csv_writer.flush()?;
    Ok(())
}
