//! Snapshot cache
//!
//! A [`Snapshot`] is an immutable copy of both worksheets. [`CacheState`]
//! keeps the current one behind an `Arc` together with the time it was
//! fetched, and decides whether the next read has to go back to the remote.
//! Refreshes replace the `Arc` wholesale, so anyone holding the old snapshot
//! keeps a consistent view.

use std::sync::Arc;
use std::time::{Duration, Instant};

use logbook_core::{RecordSet, Table};

use crate::config::Sheet;

/// Raw and clean contents of one worksheet
#[derive(Debug, Clone)]
pub struct SheetSnapshot {
    raw: Table,
    clean: RecordSet,
}

impl SheetSnapshot {
    /// Partition a fetched table
    pub fn new(raw: Table, run_field: &str) -> Self {
        let clean = RecordSet::from_table(&raw, run_field);
        Self { raw, clean }
    }

    /// Every fetched row, header pseudo-records included
    pub fn raw(&self) -> &Table {
        &self.raw
    }

    /// Data rows with a non-empty run identifier
    pub fn clean(&self) -> &RecordSet {
        &self.clean
    }
}

/// Both worksheets as fetched at one point in time
#[derive(Debug, Clone)]
pub struct Snapshot {
    source: SheetSnapshot,
    write: SheetSnapshot,
    fetched_at: Instant,
}

impl Snapshot {
    /// Build a snapshot from the two fetched tables
    pub fn new(source: Table, write: Table, run_field: &str, fetched_at: Instant) -> Self {
        Self {
            source: SheetSnapshot::new(source, run_field),
            write: SheetSnapshot::new(write, run_field),
            fetched_at,
        }
    }

    /// Contents of one worksheet
    pub fn sheet(&self, sheet: Sheet) -> &SheetSnapshot {
        match sheet {
            Sheet::Source => &self.source,
            Sheet::Write => &self.write,
        }
    }

    /// When the data was fetched
    pub fn fetched_at(&self) -> Instant {
        self.fetched_at
    }
}

/// The current snapshot and its freshness
#[derive(Debug)]
pub struct CacheState {
    snapshot: Option<Arc<Snapshot>>,
    last_update: Option<Instant>,
    window: Duration,
}

impl CacheState {
    /// Create an empty cache with the given window
    pub fn new(window: Duration) -> Self {
        Self {
            snapshot: None,
            last_update: None,
            window,
        }
    }

    /// Change the cache window
    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    /// The cache window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// True when a fetch is due: never fetched, invalidated, or strictly
    /// more than one window since the last fetch
    pub fn is_stale(&self, now: Instant) -> bool {
        match self.last_update {
            Some(at) => now.saturating_duration_since(at) > self.window,
            None => true,
        }
    }

    /// The current snapshot, fresh or not
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.clone()
    }

    /// Swap in a freshly fetched snapshot
    pub fn install(&mut self, snapshot: Snapshot, at: Instant) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.snapshot = Some(Arc::clone(&snapshot));
        self.last_update = Some(at);
        snapshot
    }

    /// Force the next read to fetch, keeping the old snapshot as fallback
    pub fn invalidate(&mut self) {
        self.last_update = None;
    }

    /// Drop the snapshot entirely
    pub fn clear(&mut self) {
        self.snapshot = None;
        self.last_update = None;
    }
}
