//! Stopwatch time values and nanosecond conversion.
//!
//! [`ChronoTime`] is what the display, the lap ledger and the sequential
//! reader all speak: minutes, seconds and centiseconds, always normalized and
//! never beyond [`ChronoTime::MAX`] (`99:59.99`).
//!
//! ```rust
//! use rs_chrono::ChronoTime;
//!
//! let t = ChronoTime::from_nanos(75_430_000_000);
//! assert_eq!((t.minutes, t.seconds, t.centiseconds), (1, 15, 43));
//! assert_eq!(format!("{t}"), "01:15.43");
//!
//! // Saturates instead of wrapping past 99 minutes
//! assert_eq!(ChronoTime::from_nanos(u64::MAX), ChronoTime::MAX);
//! ```

use core::fmt;

/// Nanoseconds per centisecond.
pub const NANOS_PER_CENTI: u64 = 10_000_000;

/// Nanoseconds per second.
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Nanoseconds per minute.
pub const NANOS_PER_MIN: u64 = 60 * NANOS_PER_SEC;

/// Largest representable elapsed time in nanoseconds (`99:59.99`).
pub const MAX_NANOS: u64 = 99 * NANOS_PER_MIN + 59 * NANOS_PER_SEC + 99 * NANOS_PER_CENTI;

/// A normalized stopwatch reading.
///
/// Ordering compares minutes, then seconds, then centiseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChronoTime {
    /// Minutes, `0..=99`.
    pub minutes: u8,
    /// Seconds, `0..=59`.
    pub seconds: u8,
    /// Hundredths of a second, `0..=99`.
    pub centiseconds: u8,
}

impl ChronoTime {
    /// `00:00.00`.
    pub const ZERO: Self = Self {
        minutes: 0,
        seconds: 0,
        centiseconds: 0,
    };

    /// `99:59.99`, the saturation point.
    pub const MAX: Self = Self {
        minutes: 99,
        seconds: 59,
        centiseconds: 99,
    };

    /// Builds a time from components, returning `None` if any field is out
    /// of range.
    pub const fn new(minutes: u8, seconds: u8, centiseconds: u8) -> Option<Self> {
        if minutes > 99 || seconds > 59 || centiseconds > 99 {
            return None;
        }
        Some(Self {
            minutes,
            seconds,
            centiseconds,
        })
    }

    /// Converts elapsed nanoseconds, truncating to centiseconds and
    /// saturating at [`ChronoTime::MAX`].
    pub const fn from_nanos(nanos: u64) -> Self {
        if nanos >= MAX_NANOS {
            return Self::MAX;
        }
        let total_centis = nanos / NANOS_PER_CENTI;
        Self {
            minutes: (total_centis / 6000) as u8,
            seconds: ((total_centis / 100) % 60) as u8,
            centiseconds: (total_centis % 100) as u8,
        }
    }

    /// Converts back to nanoseconds (exact at centisecond resolution).
    pub const fn as_nanos(&self) -> u64 {
        self.total_centis() as u64 * NANOS_PER_CENTI
    }

    /// Total hundredths of a second.
    pub const fn total_centis(&self) -> u32 {
        self.minutes as u32 * 6000 + self.seconds as u32 * 100 + self.centiseconds as u32
    }

    /// Builds a time from total centiseconds, saturating at the maximum.
    pub const fn from_centis(centis: u32) -> Self {
        Self::from_nanos(centis as u64 * NANOS_PER_CENTI)
    }

    /// Difference `self - earlier`, or zero if `earlier` is later.
    ///
    /// Used for split display, where each lap is shown relative to the
    /// previous one.
    pub const fn saturating_sub(&self, earlier: &Self) -> Self {
        Self::from_centis(self.total_centis().saturating_sub(earlier.total_centis()))
    }

    /// Returns true for `00:00.00`.
    pub const fn is_zero(&self) -> bool {
        self.minutes == 0 && self.seconds == 0 && self.centiseconds == 0
    }

    /// Decimal digits in display order:
    /// minute tens, minute units, second tens, second units,
    /// centisecond tens, centisecond units.
    pub const fn digits(&self) -> [u8; 6] {
        [
            self.minutes / 10,
            self.minutes % 10,
            self.seconds / 10,
            self.seconds % 10,
            self.centiseconds / 10,
            self.centiseconds % 10,
        ]
    }
}

impl fmt::Display for ChronoTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}.{:02}",
            self.minutes, self.seconds, self.centiseconds
        )
    }
}
