//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware traits, enabling
//! development and testing on desktop without the chronometer board.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//! | [`MockDisplay`] | [`SegmentDisplay`] | Stores digit codes, decodes the shown time |
//! | [`MockLeds`] | [`LedSink`] | LED register plus change history |
//! | [`MockButtons`] | [`ButtonInput`] | Shared edge register that tests can press |
//!
//! # Example
//!
//! ```rust
//! use rs_chrono::{ButtonEvent, ChronoTime};
//! use rs_chrono::display::render_time;
//! use rs_chrono::hal::{MockButtons, MockDisplay};
//! use rs_chrono::traits::ButtonInput;
//!
//! let mut display = MockDisplay::new();
//! let time = ChronoTime::new(1, 2, 3).unwrap();
//! render_time(&mut display, &time).unwrap();
//! assert_eq!(display.shown(), Some(time));
//!
//! let mut buttons = MockButtons::new();
//! buttons.press(ButtonEvent::CaptureLap);
//! assert_eq!(buttons.edges(), 0x2);
//! buttons.acknowledge();
//! assert_eq!(buttons.edges(), 0);
//! ```
//!
//! [`Clock`]: crate::traits::Clock
//! [`SegmentDisplay`]: crate::traits::SegmentDisplay
//! [`LedSink`]: crate::traits::LedSink
//! [`ButtonInput`]: crate::traits::ButtonInput

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::display::{DIGIT_SEGMENTS, SEGMENTS_OFF};
use crate::input::ButtonEvent;
use crate::time::{ChronoTime, NANOS_PER_SEC};
use crate::traits::{ButtonInput, Clock, DisplayTarget, Indicator, LedSink, SegmentDisplay};

// ============================================================================
// Clock
// ============================================================================

/// Mock clock for testing.
///
/// Time only moves when the test moves it. Interior mutability lets a
/// shared clock be advanced while the chronometer holds a reference.
///
/// # Example
///
/// ```rust
/// use rs_chrono::hal::MockClock;
/// use rs_chrono::traits::Clock;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now_ns(), 0);
///
/// clock.set_ms(1000);
/// assert_eq!(clock.now_ns(), 1_000_000_000);
///
/// clock.advance_ms(500);
/// assert_eq!(clock.now_ns(), 1_500_000_000);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_ns: AtomicU64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0.
    pub const fn new() -> Self {
        Self {
            current_ns: AtomicU64::new(0),
        }
    }

    /// Sets the current time in nanoseconds.
    pub fn set_ns(&self, ns: u64) {
        self.current_ns.store(ns, Ordering::SeqCst);
    }

    /// Sets the current time in milliseconds.
    pub fn set_ms(&self, ms: u64) {
        self.set_ns(ms.saturating_mul(1_000_000));
    }

    /// Advances the clock by the given number of nanoseconds.
    pub fn advance_ns(&self, ns: u64) {
        self.current_ns.fetch_add(ns, Ordering::SeqCst);
    }

    /// Advances the clock by the given number of milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance_ns(ms.saturating_mul(1_000_000));
    }

    /// Advances the clock by whole seconds.
    pub fn advance_secs(&self, secs: u64) {
        self.advance_ns(secs.saturating_mul(NANOS_PER_SEC));
    }
}

impl Clock for MockClock {
    fn now_ns(&self) -> u64 {
        self.current_ns.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Display
// ============================================================================

/// Mock six-digit display.
///
/// Stores the last code written to each digit. [`shown`](Self::shown)
/// decodes the digits back into a time.
///
/// # Example
///
/// ```
/// use rs_chrono::hal::MockDisplay;
/// use rs_chrono::traits::{DisplayTarget, SegmentDisplay};
///
/// let mut display = MockDisplay::new();
/// display.write(DisplayTarget::MinuteTens, 0x06).unwrap();
/// assert_eq!(display.digits[0], 0x06);
/// assert_eq!(display.write_count, 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockDisplay {
    /// Last code written to each digit, most significant first.
    pub digits: [u8; 6],
    /// Number of successful writes.
    pub write_count: usize,
    /// Whether writes fail.
    pub fail: bool,
}

impl MockDisplay {
    /// Creates a blank mock display.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Returns true when every digit is switched off.
    pub fn is_blank(&self) -> bool {
        self.digits.iter().all(|&code| code == SEGMENTS_OFF)
    }

    /// Decodes the displayed time.
    ///
    /// Returns `None` for a blank display or when any digit holds a code
    /// that is not a decimal digit.
    pub fn shown(&self) -> Option<ChronoTime> {
        if self.is_blank() {
            return None;
        }
        let mut values = [0u8; 6];
        for (value, code) in values.iter_mut().zip(self.digits) {
            *value = DIGIT_SEGMENTS.iter().position(|&c| c == code)? as u8;
        }
        ChronoTime::new(
            values[0] * 10 + values[1],
            values[2] * 10 + values[3],
            values[4] * 10 + values[5],
        )
    }
}

impl SegmentDisplay for MockDisplay {
    type Error = ();

    fn write(&mut self, target: DisplayTarget, code: u8) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.digits[target.position()] = code;
        self.write_count += 1;
        Ok(())
    }
}

// ============================================================================
// LEDs
// ============================================================================

/// Mock indicator LEDs.
///
/// Keeps the LED register and a history of every change.
#[derive(Debug, Default, Clone)]
pub struct MockLeds {
    /// LED register, one bit per [`Indicator`].
    pub register: u32,
    /// Every `set` call in order.
    pub history: Vec<(Indicator, bool)>,
    /// Whether writes fail.
    pub fail: bool,
}

impl MockLeds {
    /// Creates a mock with every LED off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Whether `led` is currently lit.
    pub fn is_on(&self, led: Indicator) -> bool {
        self.register & led.bit() != 0
    }

    /// Number of `set` calls that targeted `led`.
    pub fn changes(&self, led: Indicator) -> usize {
        self.history.iter().filter(|(l, _)| *l == led).count()
    }

    /// Number of times `led` was switched on.
    pub fn times_lit(&self, led: Indicator) -> usize {
        self.history
            .iter()
            .filter(|&&(l, on)| l == led && on)
            .count()
    }
}

impl LedSink for MockLeds {
    type Error = ();

    fn set(&mut self, led: Indicator, on: bool) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        if on {
            self.register |= led.bit();
        } else {
            self.register &= !led.bit();
        }
        self.history.push((led, on));
        Ok(())
    }
}

// ============================================================================
// Buttons
// ============================================================================

/// Mock key edge register.
///
/// Clones share the same register, so a test can keep one handle to press
/// keys while the handler owns another.
#[derive(Debug, Default, Clone)]
pub struct MockButtons {
    register: Arc<AtomicU32>,
    acks: Arc<AtomicU32>,
}

impl MockButtons {
    /// Creates a register with no latched edges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches the key for `event`.
    pub fn press(&self, event: ButtonEvent) {
        self.latch(event.key_bit());
    }

    /// Latches arbitrary bits, including invalid combinations.
    pub fn latch(&self, bits: u32) {
        self.register.fetch_or(bits, Ordering::SeqCst);
    }

    /// Number of times the register was acknowledged.
    pub fn ack_count(&self) -> u32 {
        self.acks.load(Ordering::SeqCst)
    }
}

impl ButtonInput for MockButtons {
    fn edges(&self) -> u32 {
        self.register.load(Ordering::SeqCst)
    }

    fn acknowledge(&mut self) {
        self.register.store(0, Ordering::SeqCst);
        self.acks.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Tests
// ============================================================================
