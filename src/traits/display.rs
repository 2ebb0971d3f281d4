//! Seven-segment display abstraction.
//!
//! This module defines the [`SegmentDisplay`] trait the chronometer renders
//! through. The hardware exposes six independently addressable digits
//! (`MM:SS.cc`); each write carries a raw segment pattern.

/// One digit position on the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DisplayTarget {
    /// Tens of minutes.
    MinuteTens,
    /// Units of minutes.
    MinuteUnits,
    /// Tens of seconds.
    SecondTens,
    /// Units of seconds.
    SecondUnits,
    /// Tenths of a second.
    CentiTens,
    /// Hundredths of a second.
    CentiUnits,
}

impl DisplayTarget {
    /// All targets, most significant first.
    pub const ALL: [DisplayTarget; 6] = [
        DisplayTarget::MinuteTens,
        DisplayTarget::MinuteUnits,
        DisplayTarget::SecondTens,
        DisplayTarget::SecondUnits,
        DisplayTarget::CentiTens,
        DisplayTarget::CentiUnits,
    ];

    /// Position of this digit, `0` for [`MinuteTens`](Self::MinuteTens).
    pub const fn position(self) -> usize {
        match self {
            DisplayTarget::MinuteTens => 0,
            DisplayTarget::MinuteUnits => 1,
            DisplayTarget::SecondTens => 2,
            DisplayTarget::SecondUnits => 3,
            DisplayTarget::CentiTens => 4,
            DisplayTarget::CentiUnits => 5,
        }
    }
}

/// Display trait for the chronometer's digits.
///
/// Implementors translate a target and a segment code into whatever the
/// hardware needs (register writes, a simulated panel, a log line).
///
/// # Example
///
/// ```ignore
/// use rs_chrono::traits::{DisplayTarget, SegmentDisplay};
///
/// struct HexPanel { /* register handles */ }
///
/// impl SegmentDisplay for HexPanel {
///     type Error = ();
///
///     fn write(&mut self, target: DisplayTarget, code: u8) -> Result<(), ()> {
///         // Shift `code` into the byte lane for `target`...
///         Ok(())
///     }
/// }
/// ```
pub trait SegmentDisplay {
    /// Error type for display operations.
    type Error: core::fmt::Debug;

    /// Writes a raw segment pattern to one digit.
    fn write(&mut self, target: DisplayTarget, code: u8) -> Result<(), Self::Error>;
}
