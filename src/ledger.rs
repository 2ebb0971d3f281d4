//! Append-only lap ledger with two independent cursors.
//!
//! Laps are kept in a fixed-capacity `heapless::Vec`, so a position is just
//! an index and appending never disturbs an existing one. Two readers walk
//! the ledger independently:
//!
//! - the **stream cursor** used by the sequential reader, which survives
//!   across reads and wraps back to the head after reporting the end, and
//! - the **display cursor** used while replaying laps on the display.
//!
//! Both are a [`Cursor`]: either a valid index or [`Cursor::End`].
//!
//! ```rust
//! use rs_chrono::{ChronoTime, LapLedger, StreamStep};
//!
//! let mut ledger = LapLedger::new();
//! ledger.capture(ChronoTime::new(0, 10, 0).unwrap()).unwrap();
//! ledger.capture(ChronoTime::new(0, 20, 0).unwrap()).unwrap();
//!
//! assert!(matches!(ledger.stream_next(), StreamStep::Lap(_)));
//! assert!(matches!(ledger.stream_next(), StreamStep::Lap(_)));
//! assert_eq!(ledger.stream_next(), StreamStep::End);
//! // Wrapped: the next pass starts from the first lap again
//! assert_eq!(
//!     ledger.stream_next(),
//!     StreamStep::Lap(ChronoTime::new(0, 10, 0).unwrap())
//! );
//! ```

use heapless::Vec;

use crate::error::{ChronoError, Result};
use crate::time::ChronoTime;

/// Maximum number of laps the ledger holds.
pub const LEDGER_CAPACITY: usize = 128;

/// A captured lap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LapRecord {
    /// Zero-based position in capture order.
    pub index: usize,
    /// Elapsed time at capture.
    pub time: ChronoTime,
}

/// A position in the ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cursor {
    /// Refers to the record at this index.
    At(usize),
    /// One past the last record (or an empty ledger).
    #[default]
    End,
}

/// Result of advancing the stream cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamStep {
    /// The ledger holds no laps.
    Empty,
    /// The cursor was past the last lap; it has been moved back to the head.
    End,
    /// The lap under the cursor; the cursor moved on by one.
    Lap(ChronoTime),
}

/// Ordered lap storage.
#[derive(Clone, Debug, Default)]
pub struct LapLedger {
    laps: Vec<LapRecord, LEDGER_CAPACITY>,
    stream: Cursor,
    display: Cursor,
}

impl LapLedger {
    /// Creates an empty ledger with both cursors at the end.
    pub const fn new() -> Self {
        Self {
            laps: Vec::new(),
            stream: Cursor::End,
            display: Cursor::End,
        }
    }

    /// Appends a lap at the tail.
    ///
    /// If the stream cursor was at the end it is moved back to the head so
    /// the next read starts a fresh pass. Fails with
    /// [`ChronoError::LedgerFull`] when there is no room; nothing changes in
    /// that case.
    pub fn capture(&mut self, time: ChronoTime) -> Result<LapRecord> {
        let record = LapRecord {
            index: self.laps.len(),
            time,
        };
        self.laps
            .push(record)
            .map_err(|_| ChronoError::LedgerFull {
                capacity: LEDGER_CAPACITY,
            })?;
        if self.stream == Cursor::End {
            self.stream = Cursor::At(0);
        }
        Ok(record)
    }

    /// Removes every lap and parks both cursors at the end.
    pub fn clear(&mut self) {
        self.laps.clear();
        self.stream = Cursor::End;
        self.display = Cursor::End;
    }

    /// Returns true when no laps are recorded.
    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    /// Number of recorded laps.
    pub fn count(&self) -> usize {
        self.laps.len()
    }

    /// Lap at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&LapRecord> {
        self.laps.get(index)
    }

    /// All laps in capture order.
    pub fn iter(&self) -> impl Iterator<Item = &LapRecord> {
        self.laps.iter()
    }

    // ------------------------------------------------------------------------
    // Stream cursor
    // ------------------------------------------------------------------------

    /// Current stream cursor position.
    pub fn stream_cursor(&self) -> Cursor {
        self.stream
    }

    /// Advances the stream cursor by one step.
    pub fn stream_next(&mut self) -> StreamStep {
        if self.laps.is_empty() {
            return StreamStep::Empty;
        }
        match self.stream {
            Cursor::At(i) => match self.laps.get(i) {
                Some(record) => {
                    let time = record.time;
                    self.stream = self.cursor_after(i);
                    StreamStep::Lap(time)
                }
                None => {
                    self.stream = Cursor::At(0);
                    StreamStep::End
                }
            },
            Cursor::End => {
                self.stream = Cursor::At(0);
                StreamStep::End
            }
        }
    }

    // ------------------------------------------------------------------------
    // Display cursor
    // ------------------------------------------------------------------------

    /// Current display cursor position.
    pub fn display_cursor(&self) -> Cursor {
        self.display
    }

    /// Points the display cursor at the first lap (or the end when empty).
    pub fn rewind_display(&mut self) {
        self.display = if self.laps.is_empty() {
            Cursor::End
        } else {
            Cursor::At(0)
        };
    }

    /// Returns the lap under the display cursor together with the lap shown
    /// before it, then moves the cursor on. Returns `None` at the end.
    pub fn display_next(&mut self) -> Option<(LapRecord, Option<LapRecord>)> {
        let Cursor::At(i) = self.display else {
            return None;
        };
        let current = *self.laps.get(i)?;
        let previous = i.checked_sub(1).and_then(|p| self.laps.get(p)).copied();
        self.display = self.cursor_after(i);
        Some((current, previous))
    }

    fn cursor_after(&self, index: usize) -> Cursor {
        if index + 1 < self.laps.len() {
            Cursor::At(index + 1)
        } else {
            Cursor::End
        }
    }
}
