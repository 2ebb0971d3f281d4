//! Run/stop time accounting.
//!
//! [`TimingEngine`] keeps the stopwatch's elapsed time as an accumulated
//! duration plus the instant the current running segment began. It never
//! reads a clock itself; callers pass `now_ns` from a
//! [`Clock`](crate::traits::Clock) so the engine stays deterministic under
//! test.
//!
//! ```rust
//! use rs_chrono::TimingEngine;
//!
//! let mut engine = TimingEngine::new();
//! engine.start(1_000);
//! engine.stop(4_000);
//! engine.start(10_000);
//! assert_eq!(engine.elapsed(12_000), 5_000);
//! ```

use crate::time::{ChronoTime, MAX_NANOS};

/// Stopwatch time accounting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimingEngine {
    running: bool,
    start_ns: u64,
    accumulated_ns: u64,
}

impl TimingEngine {
    /// Creates a stopped engine at zero.
    pub const fn new() -> Self {
        Self {
            running: false,
            start_ns: 0,
            accumulated_ns: 0,
        }
    }

    /// Starts a running segment. Returns `false` if already running.
    pub fn start(&mut self, now_ns: u64) -> bool {
        if self.running {
            return false;
        }
        self.start_ns = now_ns;
        self.running = true;
        true
    }

    /// Ends the running segment and folds it into the accumulated time.
    /// Returns `false` if not running.
    pub fn stop(&mut self, now_ns: u64) -> bool {
        if !self.running {
            return false;
        }
        self.accumulated_ns = self.elapsed(now_ns);
        self.running = false;
        true
    }

    /// Elapsed nanoseconds, capped at [`MAX_NANOS`].
    pub fn elapsed(&self, now_ns: u64) -> u64 {
        let total = if self.running {
            self.accumulated_ns
                .saturating_add(now_ns.saturating_sub(self.start_ns))
        } else {
            self.accumulated_ns
        };
        total.min(MAX_NANOS)
    }

    /// Elapsed time as a display value.
    pub fn elapsed_time(&self, now_ns: u64) -> ChronoTime {
        ChronoTime::from_nanos(self.elapsed(now_ns))
    }

    /// Zeroes the accumulated time. Only allowed while stopped; returns
    /// `false` (and does nothing) if running.
    pub fn reset(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.accumulated_ns = 0;
        self.start_ns = 0;
        true
    }

    /// Stops the engine pinned at the maximum if the limit has been reached.
    ///
    /// Returns `true` when this call performed the forced stop.
    pub fn enforce_limit(&mut self, now_ns: u64) -> bool {
        if !self.running || self.elapsed(now_ns) < MAX_NANOS {
            return false;
        }
        self.accumulated_ns = MAX_NANOS;
        self.running = false;
        true
    }

    /// Returns true while a segment is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns true once elapsed time has hit the maximum.
    pub fn at_limit(&self, now_ns: u64) -> bool {
        self.elapsed(now_ns) >= MAX_NANOS
    }
}
