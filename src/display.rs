//! Rendering a [`ChronoTime`] onto the six-digit segment display.
//!
//! Each digit is written independently. A zero time is rendered as a blank
//! display: every target receives [`SEGMENTS_OFF`] once, with no digit
//! decoding.

use crate::time::ChronoTime;
use crate::traits::{DisplayTarget, SegmentDisplay};

/// Segment pattern that switches a digit off.
pub const SEGMENTS_OFF: u8 = 0x00;

/// Segment patterns for the decimal digits `0` through `9`.
pub const DIGIT_SEGMENTS: [u8; 10] = [
    0x3f, // 0
    0x06, // 1
    0x5b, // 2
    0x4f, // 3
    0x66, // 4
    0x6d, // 5
    0x7d, // 6
    0x07, // 7
    0x7f, // 8
    0x6f, // 9
];

/// Segment pattern for a decimal digit. Values above 9 render as blank.
pub const fn segment_code(digit: u8) -> u8 {
    if digit < 10 {
        DIGIT_SEGMENTS[digit as usize]
    } else {
        SEGMENTS_OFF
    }
}

/// The six segment codes that would show `time`.
pub fn segment_codes(time: &ChronoTime) -> [(DisplayTarget, u8); 6] {
    let digits = time.digits();
    DisplayTarget::ALL.map(|target| (target, segment_code(digits[target.position()])))
}

/// Writes `time` to the display, blanking it when `time` is zero.
///
/// Stops at the first failing write and returns its error.
pub fn render_time<D: SegmentDisplay>(display: &mut D, time: &ChronoTime) -> Result<(), D::Error> {
    if time.is_zero() {
        return blank(display);
    }
    for (target, code) in segment_codes(time) {
        display.write(target, code)?;
    }
    Ok(())
}

/// Switches every digit off.
pub fn blank<D: SegmentDisplay>(display: &mut D) -> Result<(), D::Error> {
    for target in DisplayTarget::ALL {
        display.write(target, SEGMENTS_OFF)?;
    }
    Ok(())
}
