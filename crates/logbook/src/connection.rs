//! Remote connection manager: authorize, open, resolve both worksheets

use logbook_core::{Document, SheetClient, TransportResult};

use crate::clock::Clock;
use crate::config::{LogbookConfig, Sheet};
use crate::error::{LogbookError, Result};

/// Worksheet handle type produced by a client
pub type WorksheetOf<C> = <<C as SheetClient>::Document as Document>::Worksheet;

/// Resolved handles to the two logbook worksheets
#[derive(Debug, Clone)]
pub struct Handles<W> {
    /// Source (recorded data) worksheet
    pub source: W,
    /// Write (derived data) worksheet
    pub write: W,
}

impl<W> Handles<W> {
    /// Handle of one sheet
    pub fn get(&self, sheet: Sheet) -> &W {
        match sheet {
            Sheet::Source => &self.source,
            Sheet::Write => &self.write,
        }
    }
}

/// Owns the backend client and turns it into worksheet handles
///
/// A connection attempt authorizes, opens the document and resolves both
/// worksheets. Failed attempts are retried with a fixed pause; there is no
/// exponential backoff.
#[derive(Debug)]
pub struct ConnectionManager<C> {
    client: C,
}

impl<C: SheetClient> ConnectionManager<C> {
    /// Wrap a backend client
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The backend client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Mutable access to the backend client
    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Connect, retrying up to `config.retry_attempts` times
    ///
    /// Sleeps `config.retry_backoff()` after every failed attempt. Returns
    /// [`LogbookError::Connection`] carrying the last transport error once
    /// the attempts are used up.
    pub fn connect(
        &mut self,
        config: &LogbookConfig,
        clock: &dyn Clock,
        verbose: bool,
    ) -> Result<Handles<WorksheetOf<C>>> {
        let attempts = config.retry_attempts.max(1);
        let backoff = config.retry_backoff();
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.try_connect(config) {
                Ok(handles) => {
                    log::debug!(
                        "Opened '{}' (sheets {} and {}) on attempt {attempt}",
                        config.document_name,
                        config.source_sheet_index,
                        config.write_sheet_index
                    );
                    return Ok(handles);
                }
                Err(e) => {
                    if verbose {
                        log::warn!("Error getting the sheet instance: {e}");
                        if attempt < attempts {
                            log::warn!("   will retry...");
                        }
                    } else {
                        log::debug!("Connection attempt {attempt}/{attempts} failed: {e}");
                    }

                    clock.sleep(backoff);

                    if attempt >= attempts {
                        return Err(LogbookError::Connection {
                            document: config.document_name.clone(),
                            attempts,
                            source: e,
                        });
                    }
                }
            }
        }
    }

    fn try_connect(&mut self, config: &LogbookConfig) -> TransportResult<Handles<WorksheetOf<C>>> {
        self.client.authorize(config.credential_source.as_deref())?;
        let document = self.client.open(&config.document_name)?;
        Ok(Handles {
            source: document.worksheet(config.source_sheet_index)?,
            write: document.worksheet(config.write_sheet_index)?,
        })
    }
}
