//! In-memory backend
//!
//! [`MemoryClient`] keeps documents as plain grids behind a shared lock.
//! Clones see the same documents, so a test can hand one clone to a
//! [`Logbook`](crate::Logbook) and keep another to inspect writes, edit
//! cells behind the cache's back, or inject failures.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use ahash::AHashMap;
use logbook_core::{
    CellAddress, CellValue, Document, SheetClient, TransportError, TransportResult, Worksheet,
};

type Grid = Vec<Vec<CellValue>>;

#[derive(Debug, Default)]
struct State {
    documents: AHashMap<String, Vec<Grid>>,
    credentials: Option<PathBuf>,
    failing_opens: u32,
    failing_fetches: u32,
    opens: usize,
    fetches: usize,
    updates: usize,
}

/// A [`SheetClient`] over in-memory grids
#[derive(Debug, Clone, Default)]
pub struct MemoryClient {
    state: Arc<Mutex<State>>,
}

impl MemoryClient {
    /// Create a client with no documents
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from string cells, numericising the way remote sheets do
    pub fn grid(rows: &[&[&str]]) -> Vec<Vec<CellValue>> {
        rows.iter()
            .map(|row| row.iter().map(|raw| CellValue::parse(raw)).collect())
            .collect()
    }

    /// Add or replace a document with the given worksheets
    pub fn add_grid<S: Into<String>>(&self, name: S, sheets: Vec<Vec<Vec<CellValue>>>) {
        self.lock().documents.insert(name.into(), sheets);
    }

    /// Remove a document
    pub fn remove_document(&self, name: &str) {
        self.lock().documents.remove(name);
    }

    /// Make the next `n` opens fail with a remote error
    pub fn fail_next_opens(&self, n: u32) {
        self.lock().failing_opens = n;
    }

    /// Make the next `n` worksheet reads fail with a remote error
    pub fn fail_next_fetches(&self, n: u32) {
        self.lock().failing_fetches = n;
    }

    /// Number of open calls, failed ones included
    pub fn open_count(&self) -> usize {
        self.lock().opens
    }

    /// Number of successful whole-sheet reads
    pub fn fetch_count(&self) -> usize {
        self.lock().fetches
    }

    /// Number of cell updates
    pub fn update_count(&self) -> usize {
        self.lock().updates
    }

    /// Credential source of the last authorization
    pub fn credentials(&self) -> Option<PathBuf> {
        self.lock().credentials.clone()
    }

    /// Current contents of a worksheet
    pub fn sheet(&self, name: &str, index: usize) -> Option<Vec<Vec<CellValue>>> {
        self.lock()
            .documents
            .get(name)
            .and_then(|sheets| sheets.get(index))
            .cloned()
    }

    /// Change a cell without going through a logbook
    pub fn set_cell<V: Into<CellValue>>(&self, name: &str, index: usize, at: CellAddress, value: V) {
        let mut state = self.lock();
        if let Some(grid) = state
            .documents
            .get_mut(name)
            .and_then(|sheets| sheets.get_mut(index))
        {
            put(grid, at, value.into());
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }
}

impl SheetClient for MemoryClient {
    type Document = MemoryDocument;

    fn authorize(&mut self, credentials: Option<&Path>) -> TransportResult<()> {
        self.lock().credentials = credentials.map(Path::to_path_buf);
        Ok(())
    }

    fn open(&mut self, name: &str) -> TransportResult<MemoryDocument> {
        let mut state = self.lock();
        state.opens += 1;

        if state.failing_opens > 0 {
            state.failing_opens -= 1;
            return Err(TransportError::remote(format!("cannot reach '{name}'")));
        }
        if !state.documents.contains_key(name) {
            return Err(TransportError::DocumentNotFound(name.to_string()));
        }

        Ok(MemoryDocument {
            name: name.to_string(),
            state: Arc::clone(&self.state),
        })
    }
}

/// An open in-memory document
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    name: String,
    state: Arc<Mutex<State>>,
}

impl Document for MemoryDocument {
    type Worksheet = MemoryWorksheet;

    fn worksheet(&self, index: usize) -> TransportResult<MemoryWorksheet> {
        let state = lock(&self.state);
        let count = state
            .documents
            .get(&self.name)
            .map(Vec::len)
            .ok_or_else(|| TransportError::DocumentNotFound(self.name.clone()))?;
        if index >= count {
            return Err(TransportError::WorksheetOutOfBounds(index, count));
        }

        Ok(MemoryWorksheet {
            document: self.name.clone(),
            index,
            state: Arc::clone(&self.state),
        })
    }
}

/// Handle to one in-memory worksheet
#[derive(Debug, Clone)]
pub struct MemoryWorksheet {
    document: String,
    index: usize,
    state: Arc<Mutex<State>>,
}

impl MemoryWorksheet {
    fn with_grid<T>(&self, f: impl FnOnce(&mut Grid) -> T) -> TransportResult<T> {
        let mut state = lock(&self.state);
        let grid = state
            .documents
            .get_mut(&self.document)
            .ok_or_else(|| TransportError::DocumentNotFound(self.document.clone()))?
            .get_mut(self.index)
            .ok_or_else(|| TransportError::remote(format!("worksheet {} was removed", self.index)))?;
        Ok(f(grid))
    }
}

impl Worksheet for MemoryWorksheet {
    fn get_all_values(&self) -> TransportResult<Vec<Vec<CellValue>>> {
        {
            let mut state = lock(&self.state);
            if state.failing_fetches > 0 {
                state.failing_fetches -= 1;
                return Err(TransportError::remote("read timed out"));
            }
        }

        let grid = self.with_grid(|grid| grid.clone())?;
        lock(&self.state).fetches += 1;
        Ok(grid)
    }

    fn cell(&self, at: CellAddress) -> TransportResult<CellValue> {
        self.with_grid(|grid| {
            grid.get(at.row as usize)
                .and_then(|row| row.get(at.col as usize))
                .cloned()
                .unwrap_or_default()
        })
    }

    fn update_cell(&self, at: CellAddress, value: &str) -> TransportResult<()> {
        self.with_grid(|grid| put(grid, at, CellValue::parse(value)))?;
        lock(&self.state).updates += 1;
        Ok(())
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

fn put(grid: &mut Grid, at: CellAddress, value: CellValue) {
    let (row, col) = (at.row as usize, at.col as usize);
    if grid.len() <= row {
        grid.resize_with(row + 1, Vec::new);
    }
    let cells = &mut grid[row];
    if cells.len() <= col {
        cells.resize(col + 1, CellValue::Empty);
    }
    cells[col] = value;
}
