//! # rs-chrono
//!
//! A stopwatch controller driving a six-digit seven-segment display and
//! three indicator LEDs from four keys, with lap capture, lap replay and a
//! sequential lap reader.
//!
//! ## Features
//!
//! - **Centisecond timing**: `MM:SS.cc` up to `99:59.99`, then a forced stop
//! - **Lap ledger**: up to 128 laps, with independent stream and replay cursors
//! - **Lap replay**: one lap every three seconds, absolute or split
//! - **Sequential reader**: fixed 28-byte records, one pass per drain
//! - **Interrupt hand-off**: edge register read in a deferred handler
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Display, clock, LED and key register abstractions
//! - `chrono` - The state machine behind the single lock
//! - `engine`, `ledger`, `reader` - Timing, lap storage and record encoding
//! - `services` - Tokio tasks, attributes and the optional HTTP surface
//! - `hal` - Concrete implementations (mock for testing, host for desktop)
//!
//! ## Example
//!
//! ```rust
//! use rs_chrono::{ButtonEvent, ChronoState, ChronoTime, LapMode, ReadRecord, RECORD_SIZE};
//!
//! const SEC: u64 = 1_000_000_000;
//!
//! let mut state = ChronoState::new();
//! state.handle_event(ButtonEvent::ToggleRun, 0);
//! state.handle_event(ButtonEvent::CaptureLap, 10 * SEC);
//! state.handle_event(ButtonEvent::CaptureLap, 25 * SEC);
//! state.set_mode(LapMode::Split);
//!
//! // The sequential reader yields each lap, then an end record.
//! let first = state.next_record(30 * SEC);
//! assert_eq!(first.lap, ChronoTime::new(0, 10, 0).unwrap());
//! state.next_record(30 * SEC);
//! let end = state.next_record(30 * SEC);
//! assert!(end.is_end);
//!
//! let bytes = end.to_bytes();
//! assert_eq!(bytes.len(), RECORD_SIZE);
//! assert_eq!(ReadRecord::from_bytes(&bytes).unwrap(), end);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// The chronometer state machine and its effects.
pub mod chrono;
/// Seven-segment digit encoding.
pub mod display;
/// Start/stop timing with the display limit applied.
pub mod engine;
/// Error types.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Key events decoded from the edge register.
pub mod input;
/// Fixed-capacity lap storage with stream and replay cursors.
pub mod ledger;
/// Sequential-read record encoding.
pub mod reader;
/// `MM:SS.cc` time values.
pub mod time;
/// Core traits for hardware abstraction.
pub mod traits;

/// Shared configuration system.
pub mod config;

/// Async service layer: tasks, attributes and the HTTP surface (feature-gated).
#[cfg(feature = "runtime")]
pub mod services;

// Re-exports for convenience
pub use chrono::{
    BlinkState, BlinkStep, ChronoSnapshot, ChronoState, Effects, LapMode, RenderTick, ReplayState,
    ReplayStep,
};
pub use engine::TimingEngine;
pub use error::{ChronoError, Result};
pub use input::ButtonEvent;
pub use ledger::{Cursor, LapLedger, LapRecord, StreamStep, LEDGER_CAPACITY};
pub use reader::{ReadRecord, RECORD_SIZE};
pub use time::ChronoTime;
pub use traits::{
    ButtonInput, Clock, DisplayTarget, Indicator, LedSink, SegmentDisplay, KEY_LAP, KEY_REPLAY,
    KEY_RESET, KEY_RUN,
};

// Config re-exports
pub use config::{ChronoConfig, Config, DeviceConfig, WebConfig};
