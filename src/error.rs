//! Error types shared by the core and the service layer.
//!
//! None of these are fatal: each one is handled where it occurs and the
//! chronometer keeps running.

use alloc::string::String;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, ChronoError>;

/// Errors reported by chronometer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChronoError {
    /// A read request did not use the fixed record size.
    #[error("invalid record size (expected {expected} bytes, found {found} bytes)")]
    InvalidRecordSize {
        /// Size of one encoded record.
        expected: usize,
        /// Size of the buffer that was supplied.
        found: usize,
    },

    /// The lap display mode was not `0` (absolute) or `1` (split).
    #[error("invalid lap mode {0:?} (expected 0 or 1)")]
    InvalidLapMode(String),

    /// The lap ledger has no room for another record.
    #[error("lap ledger full ({capacity} records)")]
    LedgerFull {
        /// Maximum number of records the ledger holds.
        capacity: usize,
    },

    /// The seven-segment display rejected a write.
    #[error("display write failed: {0}")]
    Display(String),

    /// The indicator LEDs rejected a write.
    #[error("led write failed: {0}")]
    Led(String),

    /// The interrupt line already has a deferred handler attached.
    #[error("deferred handler already attached")]
    HandlerAttached,
}
