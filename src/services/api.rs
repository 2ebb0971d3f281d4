//! API request and response types for the HTTP surface.

use serde::{Deserialize, Serialize};

use crate::chrono::{ChronoSnapshot, LapMode};
use crate::ledger::LapRecord;
use crate::reader::ReadRecord;

// ============================================================================
// Response Types
// ============================================================================

/// API response wrapper for consistent JSON structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (present when success=true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present when success=false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Current chronometer state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    /// Whether the stopwatch is running
    pub running: bool,
    /// Live elapsed time as `MM:SS.cc`
    pub current_time: String,
    /// Live elapsed time in centiseconds
    pub elapsed_centis: u32,
    /// Whether laps are being replayed
    pub replaying: bool,
    /// Whether a reset is waiting for replay to end
    pub pending_clear: bool,
    /// Number of recorded laps
    pub laps_count: usize,
    /// Lap display mode (0 = absolute, 1 = split)
    pub laps_mode: u8,
}

impl From<&ChronoSnapshot> for StateResponse {
    fn from(snap: &ChronoSnapshot) -> Self {
        Self {
            running: snap.running,
            current_time: snap.elapsed.to_string(),
            elapsed_centis: snap.elapsed.total_centis(),
            replaying: snap.replaying,
            pending_clear: snap.pending_clear,
            laps_count: snap.lap_count,
            laps_mode: snap.mode.as_u8(),
        }
    }
}

/// One lap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapResponse {
    /// Zero-based position in capture order
    pub index: usize,
    /// Lap time as `MM:SS.cc`
    pub time: String,
}

impl From<&LapRecord> for LapResponse {
    fn from(lap: &LapRecord) -> Self {
        Self {
            index: lap.index,
            time: lap.time.to_string(),
        }
    }
}

/// Lap count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    /// Number of recorded laps
    pub count: usize,
}

/// Lap display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeResponse {
    /// 0 = absolute, 1 = split
    pub mode: u8,
}

impl From<LapMode> for ModeResponse {
    fn from(mode: LapMode) -> Self {
        Self { mode: mode.as_u8() }
    }
}

/// One sequential-read record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordResponse {
    /// Live elapsed time as `MM:SS.cc`
    pub current_time: String,
    /// Lap time as `MM:SS.cc` (absent on the end record)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lap: Option<String>,
    /// Whether this is the end of the pass
    pub is_end: bool,
}

impl From<&ReadRecord> for RecordResponse {
    fn from(record: &ReadRecord) -> Self {
        Self {
            current_time: record.current.to_string(),
            lap: (!record.is_end).then(|| record.lap.to_string()),
            is_end: record.is_end,
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

/// Body of `POST /api/laps/mode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetLapModeRequest {
    /// 0 = absolute, 1 = split
    pub mode: u8,
}
