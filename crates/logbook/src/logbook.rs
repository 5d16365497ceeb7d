//! The logbook facade

use std::path::PathBuf;
use std::sync::Arc;

use logbook_core::{CellValue, RunNumber, SheetClient, TransportResult, Worksheet};

use crate::cache::{CacheState, Snapshot};
use crate::clock::{Clock, SystemClock};
use crate::config::{LogbookConfig, Sheet};
use crate::connection::{ConnectionManager, Handles, WorksheetOf};
use crate::error::Result;
use crate::lookup;
use crate::query::{self, Filter, QueryResult};
use crate::write::{self, WriteOptions, WriteOutcome};

/// Cached, structured access to a two-sheet logbook
///
/// The logbook connects lazily on first use. Reads are served from a
/// snapshot of both worksheets that is refreshed at most once per cache
/// window; writes go straight to the remote and invalidate the snapshot.
///
/// # Example
///
/// ```
/// use logbook::{Logbook, LogbookConfig, MemoryClient, Sheet};
///
/// let client = MemoryClient::new();
/// client.add_grid(
///     "runs",
///     vec![
///         MemoryClient::grid(&[&["run_number", "temp"], &["#", "K"], &["1", "20"], &["2", ""]]),
///         MemoryClient::grid(&[&["run_number", "fit"]]),
///     ],
/// );
///
/// let mut book = Logbook::new(client, LogbookConfig::new("runs"));
/// let temp = book.get_value("temp", 2, Sheet::Source, false).unwrap();
/// assert_eq!(temp.to_string(), "20");
/// assert_eq!(book.get_unit("temp", Sheet::Source, false).unwrap(), "K");
/// ```
pub struct Logbook<C: SheetClient> {
    config: LogbookConfig,
    connection: ConnectionManager<C>,
    handles: Option<Handles<WorksheetOf<C>>>,
    cache: CacheState,
    clock: Box<dyn Clock>,
}

impl<C: SheetClient> Logbook<C> {
    /// Create a logbook over `client` using the system clock
    pub fn new(client: C, config: LogbookConfig) -> Self {
        Self::with_clock(client, config, SystemClock)
    }

    /// Create a logbook with an explicit time source
    pub fn with_clock<K: Clock + 'static>(client: C, config: LogbookConfig, clock: K) -> Self {
        let cache = CacheState::new(config.cache_window_duration());
        Self {
            config,
            connection: ConnectionManager::new(client),
            handles: None,
            cache,
            clock: Box::new(clock),
        }
    }

    /// Connect now instead of on first use
    pub fn connect(&mut self, verbose: bool) -> Result<()> {
        if self.handles.is_none() {
            let handles = self.connection.connect(&self.config, self.clock.as_ref(), verbose)?;
            self.handles = Some(handles);
        }
        Ok(())
    }

    /// Whether worksheet handles are currently held
    pub fn is_connected(&self) -> bool {
        self.handles.is_some()
    }

    /// Current configuration
    pub fn config(&self) -> &LogbookConfig {
        &self.config
    }

    /// The backend client
    pub fn client(&self) -> &C {
        self.connection.client()
    }

    /// Mutable access to the backend client
    pub fn client_mut(&mut self) -> &mut C {
        self.connection.client_mut()
    }

    /// The cached snapshot, if any, without touching the remote
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.cache.current()
    }

    /// Refresh the snapshot if the cache window has passed
    pub fn refresh(&mut self, verbose: bool) -> Result<Arc<Snapshot>> {
        self.load(false, verbose)
    }

    /// Refresh the snapshot regardless of the cache window
    pub fn force_refresh(&mut self, verbose: bool) -> Result<Arc<Snapshot>> {
        self.load(true, verbose)
    }

    /// Make the next read go back to the remote
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Unit of `field` from the unit row of `sheet`
    pub fn get_unit(&mut self, field: &str, sheet: Sheet, verbose: bool) -> Result<String> {
        let snapshot = self.load(false, verbose)?;
        lookup::unit(snapshot.sheet(sheet).raw(), field)
    }

    /// Value of `field` for `run`, inheriting from earlier runs
    ///
    /// Missing runs, unset values and unknown fields yield `"n/a"`. Only
    /// connection and transport failures are errors.
    pub fn get_value(
        &mut self,
        field: &str,
        run: RunNumber,
        sheet: Sheet,
        verbose: bool,
    ) -> Result<CellValue> {
        let snapshot = self.load(false, verbose)?;
        lookup::soften(
            lookup::resolve(snapshot.sheet(sheet).clean(), field, run),
            verbose,
        )
    }

    /// Like [`get_value`](Self::get_value) but reports misses as errors
    pub fn lookup(
        &mut self,
        field: &str,
        run: RunNumber,
        sheet: Sheet,
        verbose: bool,
    ) -> Result<CellValue> {
        let snapshot = self.load(false, verbose)?;
        lookup::resolve(snapshot.sheet(sheet).clean(), field, run)
    }

    /// Write `value` into `field` of `run`
    ///
    /// Soft failures (occupied cell, unknown field) are reported through the
    /// returned [`WriteOutcome`]. The cache is invalidated after every write
    /// attempt, so the next read sees the new value.
    pub fn write<V: Into<CellValue>>(
        &mut self,
        field: &str,
        value: V,
        run: RunNumber,
        options: WriteOptions,
        verbose: bool,
    ) -> Result<WriteOutcome> {
        let snapshot = self.load(false, verbose)?;
        let handles = match self.handles.take() {
            Some(handles) => handles,
            None => self.connection.connect(&self.config, self.clock.as_ref(), verbose)?,
        };

        let value = value.into().to_string();
        let outcome = write::write_value(
            handles.get(options.sheet),
            snapshot.sheet(options.sheet).raw(),
            &self.config.run_field,
            field,
            &value,
            run,
            &options,
            verbose,
        );
        self.handles = Some(handles);

        self.cache.invalidate();
        outcome
    }

    /// Runs of `sheet` matching `filter`, optionally sorted by `sort_by`
    ///
    /// All runs are evaluated against one snapshot.
    pub fn query(
        &mut self,
        sheet: Sheet,
        filter: &Filter,
        sort_by: Option<&str>,
        verbose: bool,
    ) -> Result<QueryResult> {
        let snapshot = self.load(false, verbose)?;
        query::query(snapshot.sheet(sheet).clean(), filter, sort_by, verbose)
    }

    /// Switch to another document
    pub fn set_document<S: Into<String>>(&mut self, name: S) {
        self.config.document_name = name.into();
        self.reset(true);
    }

    /// Switch worksheets
    pub fn set_sheets(&mut self, source: usize, write: usize) {
        self.config.source_sheet_index = source;
        self.config.write_sheet_index = write;
        self.reset(true);
    }

    /// Change the number of header rows of the source sheet
    pub fn set_header_rows(&mut self, rows: usize) {
        self.config.header_rows = rows;
        self.cache.clear();
    }

    /// Change the credential source
    pub fn set_credentials<P: Into<PathBuf>>(&mut self, path: Option<P>) {
        self.config.credential_source = path.map(Into::into);
        self.reset(false);
    }

    /// Change the cache window
    pub fn set_cache_window(&mut self, window: std::time::Duration) {
        self.config.cache_window_secs = window.as_secs_f64();
        self.cache.set_window(self.config.cache_window_duration());
    }

    fn reset(&mut self, drop_snapshot: bool) {
        self.handles = None;
        if drop_snapshot {
            self.cache.clear();
        } else {
            self.cache.invalidate();
        }
    }

    fn load(&mut self, force: bool, verbose: bool) -> Result<Arc<Snapshot>> {
        if !force && !self.cache.is_stale(self.clock.now()) {
            if let Some(snapshot) = self.cache.current() {
                if verbose {
                    log::warn!("Warning: Using cached data");
                }
                return Ok(snapshot);
            }
        }

        match self.fetch(verbose) {
            Ok(snapshot) => {
                let at = snapshot.fetched_at();
                Ok(self.cache.install(snapshot, at))
            }
            Err(e) => match self.cache.current() {
                Some(snapshot) => {
                    if verbose {
                        log::warn!("Warning: refresh failed ({e}), using cached data");
                    } else {
                        log::debug!("Refresh failed, serving previous snapshot: {e}");
                    }
                    Ok(snapshot)
                }
                None => Err(e),
            },
        }
    }

    fn fetch(&mut self, verbose: bool) -> Result<Snapshot> {
        let first = self
            .handles
            .as_ref()
            .map(|h| Self::read_sheets(h, &self.config, self.clock.as_ref()));

        match first {
            Some(Ok(snapshot)) => return Ok(snapshot),
            Some(Err(e)) => {
                if verbose {
                    log::warn!("Error reading the sheets: {e}, reconnecting");
                } else {
                    log::debug!("Fetch failed, reacquiring handles: {e}");
                }
                self.handles = None;
            }
            None => {}
        }

        let handles = self.connection.connect(&self.config, self.clock.as_ref(), verbose)?;
        let result = Self::read_sheets(&handles, &self.config, self.clock.as_ref());
        self.handles = Some(handles);
        Ok(result?)
    }

    fn read_sheets(
        handles: &Handles<WorksheetOf<C>>,
        config: &LogbookConfig,
        clock: &dyn Clock,
    ) -> TransportResult<Snapshot> {
        let source = handles
            .source
            .get_all_records(config.header_rows_of(Sheet::Source))?;
        let write = handles
            .write
            .get_all_records(config.header_rows_of(Sheet::Write))?;
        log::debug!(
            "Fetched {} source and {} write rows",
            source.rows().len(),
            write.rows().len()
        );
        Ok(Snapshot::new(source, write, &config.run_field, clock.now()))
    }
}
