//! Prelude module - common imports for logbook users
//!
//! ```rust
//! use logbook::prelude::*;
//! ```

pub use crate::{
    CellValue,
    // Query types
    Criterion,
    Filter,
    FilterValue,
    // Main types
    Logbook,
    LogbookConfig,
    // Error types
    LogbookError,
    MemoryClient,
    QueryResult,
    Result,
    RunNumber,
    Sheet,
    SheetClient,
    // Write types
    WriteOptions,
    WriteOutcome,
    NOT_AVAILABLE,
};
