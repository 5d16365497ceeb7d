//! CSV-directory client

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use logbook_core::{
    CellAddress, CellValue, Document, SheetClient, TransportError, TransportResult, Worksheet,
};
use tempfile::NamedTempFile;

use crate::error::CsvResult;
use crate::options::CsvOptions;
use crate::reader::read_records;
use crate::writer::write_records;

/// A [`SheetClient`] whose documents are directories of CSV files
#[derive(Debug, Clone)]
pub struct CsvClient {
    root: PathBuf,
    options: CsvOptions,
}

impl CsvClient {
    /// Serve documents below `root`
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self::with_options(root, CsvOptions::default())
    }

    /// Serve documents below `root` with custom CSV options
    pub fn with_options<P: Into<PathBuf>>(root: P, options: CsvOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    /// Directory documents are looked up in
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SheetClient for CsvClient {
    type Document = CsvDocument;

    /// Local files need no credentials; a given source must exist
    fn authorize(&mut self, credentials: Option<&Path>) -> TransportResult<()> {
        match credentials {
            Some(path) if !path.exists() => Err(TransportError::Unauthorized(format!(
                "credential source {} does not exist",
                path.display()
            ))),
            _ => Ok(()),
        }
    }

    fn open(&mut self, name: &str) -> TransportResult<CsvDocument> {
        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Err(TransportError::DocumentNotFound(name.to_string()));
        }

        let mut sheets = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(&self.options.extension));
            if matches && path.is_file() {
                sheets.push(path);
            }
        }
        sheets.sort();

        log::debug!("Opened {} with {} worksheets", dir.display(), sheets.len());
        Ok(CsvDocument {
            sheets,
            options: self.options.clone(),
        })
    }
}

/// An opened directory of worksheet files
#[derive(Debug, Clone)]
pub struct CsvDocument {
    sheets: Vec<PathBuf>,
    options: CsvOptions,
}

impl CsvDocument {
    /// Worksheet files in index order
    pub fn paths(&self) -> &[PathBuf] {
        &self.sheets
    }
}

impl Document for CsvDocument {
    type Worksheet = CsvWorksheet;

    fn worksheet(&self, index: usize) -> TransportResult<CsvWorksheet> {
        let path = self
            .sheets
            .get(index)
            .ok_or(TransportError::WorksheetOutOfBounds(index, self.sheets.len()))?;
        Ok(CsvWorksheet {
            path: path.clone(),
            options: self.options.clone(),
        })
    }
}

/// One CSV file
#[derive(Debug, Clone)]
pub struct CsvWorksheet {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvWorksheet {
    /// File backing this worksheet
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> CsvResult<Vec<Vec<String>>> {
        read_records(File::open(&self.path)?, &self.options)
    }

    fn write(&self, rows: &[Vec<String>]) -> CsvResult<()> {
        replace_file(&self.path, |file| write_records(rows, file, &self.options))
    }
}

/// Replace the contents of `path` with whatever `fill` writes
///
/// The new contents go to a temporary file in the same directory, which is
/// renamed over `path` only once `fill` succeeded. On failure `path` is left
/// untouched and the temporary file is removed.
fn replace_file<F>(path: &Path, fill: F) -> CsvResult<()>
where
    F: FnOnce(&mut File) -> CsvResult<()>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    fill(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions())?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl Worksheet for CsvWorksheet {
    fn get_all_values(&self) -> TransportResult<Vec<Vec<CellValue>>> {
        let rows = self.read()?;
        Ok(rows
            .iter()
            .map(|row| row.iter().map(|raw| CellValue::parse(raw)).collect())
            .collect())
    }

    fn cell(&self, at: CellAddress) -> TransportResult<CellValue> {
        let rows = self.read()?;
        Ok(rows
            .get(at.row as usize)
            .and_then(|row| row.get(at.col as usize))
            .map(|raw| CellValue::parse(raw))
            .unwrap_or_default())
    }

    fn update_cell(&self, at: CellAddress, value: &str) -> TransportResult<()> {
        let mut rows = self.read()?;
        let (row, col) = (at.row as usize, at.col as usize);

        if rows.len() <= row {
            rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.to_string();

        self.write(&rows)?;
        log::debug!("Updated {at} in {}", self.path.display());
        Ok(())
    }
}
