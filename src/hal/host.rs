//! Host implementations for running the chronometer on a desktop.
//!
//! The display and LEDs have no physical output here; every change is
//! reported through `tracing` so it shows up in the log.

use std::convert::Infallible;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::display::DIGIT_SEGMENTS;
use crate::input::ButtonEvent;
use crate::traits::{ButtonInput, Clock, DisplayTarget, Indicator, LedSink, SegmentDisplay};

// ============================================================================
// Clocks
// ============================================================================

/// Monotonic clock backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

impl StdClock {
    /// Creates a clock whose epoch is now.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now_ns(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Monotonic clock backed by [`tokio::time::Instant`].
///
/// Follows Tokio's paused test clock, so timer-driven behavior can be
/// tested deterministically.
#[cfg(feature = "runtime")]
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

#[cfg(feature = "runtime")]
impl TokioClock {
    /// Creates a clock whose epoch is now.
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

#[cfg(feature = "runtime")]
impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "runtime")]
impl Clock for TokioClock {
    fn now_ns(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

// ============================================================================
// Display
// ============================================================================

/// Display that logs what it would show.
#[derive(Debug, Default, Clone)]
pub struct TracingDisplay {
    digits: [u8; 6],
}

impl TracingDisplay {
    /// Creates a blank display.
    pub fn new() -> Self {
        Self::default()
    }

    /// The display as text, `MM:SS.cc`, with `-` for unknown or blank digits.
    pub fn text(&self) -> String {
        let chars: Vec<char> = self
            .digits
            .iter()
            .map(|&code| {
                DIGIT_SEGMENTS
                    .iter()
                    .position(|&c| c == code)
                    .and_then(|d| char::from_digit(d as u32, 10))
                    .unwrap_or('-')
            })
            .collect();
        format!(
            "{}{}:{}{}.{}{}",
            chars[0], chars[1], chars[2], chars[3], chars[4], chars[5]
        )
    }
}

impl SegmentDisplay for TracingDisplay {
    type Error = Infallible;

    fn write(&mut self, target: DisplayTarget, code: u8) -> Result<(), Infallible> {
        let slot = &mut self.digits[target.position()];
        if *slot != code {
            *slot = code;
            if target == DisplayTarget::CentiUnits {
                trace!(shown = %self.text(), "display");
            }
        }
        Ok(())
    }
}

// ============================================================================
// LEDs
// ============================================================================

/// LEDs that log every change.
#[derive(Debug, Default, Clone)]
pub struct TracingLeds {
    register: u32,
}

impl TracingLeds {
    /// Creates a set with every LED off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current LED register.
    pub fn register(&self) -> u32 {
        self.register
    }
}

impl LedSink for TracingLeds {
    type Error = Infallible;

    fn set(&mut self, led: Indicator, on: bool) -> Result<(), Infallible> {
        let next = if on {
            self.register | led.bit()
        } else {
            self.register & !led.bit()
        };
        if next != self.register {
            self.register = next;
            trace!(?led, on, register = next, "led");
        }
        Ok(())
    }
}

// ============================================================================
// Buttons
// ============================================================================

/// Edge register shared between a key source and the deferred handler.
///
/// A console or test driver keeps one clone and calls
/// [`press`](Self::press); the handler owns another.
#[derive(Debug, Default, Clone)]
pub struct SharedRegisterButtons {
    register: Arc<AtomicU32>,
}

impl SharedRegisterButtons {
    /// Creates a register with no latched edges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches the key for `event`.
    pub fn press(&self, event: ButtonEvent) {
        debug!(event = event.as_str(), "key latched");
        self.register.fetch_or(event.key_bit(), Ordering::SeqCst);
    }
}

impl ButtonInput for SharedRegisterButtons {
    fn edges(&self) -> u32 {
        self.register.load(Ordering::SeqCst)
    }

    fn acknowledge(&mut self) {
        self.register.store(0, Ordering::SeqCst);
    }
}
