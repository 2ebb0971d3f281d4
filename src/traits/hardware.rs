//! Hardware abstraction traits for the clock, indicator LEDs and buttons.
//!
//! These are the collaborators the chronometer core calls out to. For
//! testing and desktop development use the mocks in [`crate::hal::mock`];
//! [`crate::hal::host`] has std-backed versions.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`Clock`] | Monotonic nanosecond time source |
//! | [`LedSink`] | Indicator LEDs (running, replay, lap blink) |
//! | [`ButtonInput`] | Latched key edge register |
//!
//! # Example
//!
//! ```rust
//! use rs_chrono::traits::{Clock, Indicator, LedSink};
//! use rs_chrono::hal::{MockClock, MockLeds};
//!
//! let clock = MockClock::new();
//! clock.advance_ms(15);
//! assert_eq!(clock.now_ns(), 15_000_000);
//!
//! let mut leds = MockLeds::new();
//! leds.set(Indicator::Running, true).unwrap();
//! assert!(leds.is_on(Indicator::Running));
//! ```

/// Key bit for the run/stop button.
pub const KEY_RUN: u32 = 0x1;
/// Key bit for the lap capture button.
pub const KEY_LAP: u32 = 0x2;
/// Key bit for the replay toggle button.
pub const KEY_REPLAY: u32 = 0x4;
/// Key bit for the reset button.
pub const KEY_RESET: u32 = 0x8;

/// Time source.
///
/// Must be monotonically non-decreasing. The epoch is arbitrary; only
/// differences matter.
pub trait Clock {
    /// Returns the current time in nanoseconds.
    fn now_ns(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ns(&self) -> u64 {
        (**self).now_ns()
    }
}

impl<C: Clock + ?Sized> Clock for alloc::sync::Arc<C> {
    fn now_ns(&self) -> u64 {
        (**self).now_ns()
    }
}

/// The three indicator LEDs the chronometer drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Indicator {
    /// Lit while the stopwatch is running.
    Running,
    /// Lit while laps are being replayed on the display.
    Replay,
    /// Blinks after each lap capture.
    Lap,
}

impl Indicator {
    /// Bit mask of this LED in the LED register.
    pub const fn bit(self) -> u32 {
        match self {
            Indicator::Running => 0x1,
            Indicator::Replay => 0x2,
            Indicator::Lap => 0x4,
        }
    }
}

/// Indicator LED output.
///
/// Implementations own read-modify-write of the LED register so that
/// setting one indicator leaves the others untouched.
pub trait LedSink {
    /// Error type for LED operations.
    type Error: core::fmt::Debug;

    /// Switches one indicator on or off.
    fn set(&mut self, led: Indicator, on: bool) -> Result<(), Self::Error>;

    /// Switches every indicator off.
    fn all_off(&mut self) -> Result<(), Self::Error> {
        self.set(Indicator::Running, false)?;
        self.set(Indicator::Replay, false)?;
        self.set(Indicator::Lap, false)
    }
}

/// Latched key edge register.
///
/// The hardware sets a bit per key when it is pressed and keeps it set until
/// acknowledged.
pub trait ButtonInput {
    /// Returns the latched edge bits (see [`KEY_RUN`] and friends).
    fn edges(&self) -> u32;

    /// Clears the latched edges so the same press is not handled twice.
    fn acknowledge(&mut self);
}
