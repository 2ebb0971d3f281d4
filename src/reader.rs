//! Fixed-size records for the sequential lap reader.
//!
//! Every read returns exactly one [`ReadRecord`]: the live elapsed time plus
//! one lap, or an end marker. A consumer drains the ledger by reading until
//! `is_end` is set; the next read starts over from the first lap.
//!
//! # Wire format
//!
//! [`RECORD_SIZE`] bytes, little-endian:
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0..12  | current time: centiseconds, seconds, minutes (`u32` each) |
//! | 12..24 | lap time: centiseconds, seconds, minutes (`u32` each) |
//! | 24     | `is_end` (`0` or `1`) |
//! | 25..28 | zero padding |
//!
//! ```rust
//! use rs_chrono::{ChronoTime, ReadRecord, RECORD_SIZE};
//!
//! let record = ReadRecord::lap(ChronoTime::MAX, ChronoTime::new(0, 10, 0).unwrap());
//! let mut buf = [0u8; RECORD_SIZE];
//! record.encode(&mut buf).unwrap();
//! assert_eq!(ReadRecord::from_bytes(&buf).unwrap(), record);
//!
//! // Any other buffer size is rejected
//! assert!(record.encode(&mut [0u8; 16]).is_err());
//! ```

use crate::error::{ChronoError, Result};
use crate::ledger::StreamStep;
use crate::time::ChronoTime;

/// Size of one encoded record in bytes.
pub const RECORD_SIZE: usize = 28;

/// One sequential-read result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReadRecord {
    /// Live elapsed time when the record was produced.
    pub current: ChronoTime,
    /// The lap being streamed; zero on an end record.
    pub lap: ChronoTime,
    /// Set when there is no lap in this record.
    pub is_end: bool,
}

impl ReadRecord {
    /// A record carrying a lap.
    pub const fn lap(current: ChronoTime, lap: ChronoTime) -> Self {
        Self {
            current,
            lap,
            is_end: false,
        }
    }

    /// An end-of-pass record.
    pub const fn end(current: ChronoTime) -> Self {
        Self {
            current,
            lap: ChronoTime::ZERO,
            is_end: true,
        }
    }

    /// Builds the record for one step of the stream cursor.
    pub const fn from_step(current: ChronoTime, step: StreamStep) -> Self {
        match step {
            StreamStep::Lap(lap) => Self::lap(current, lap),
            StreamStep::Empty | StreamStep::End => Self::end(current),
        }
    }

    /// Encodes into `buf`, which must be exactly [`RECORD_SIZE`] bytes.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        check_size(buf.len())?;
        put_time(&mut buf[0..12], &self.current);
        put_time(&mut buf[12..24], &self.lap);
        buf[24] = u8::from(self.is_end);
        buf[25..RECORD_SIZE].fill(0);
        Ok(RECORD_SIZE)
    }

    /// Encodes into a new array.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        put_time(&mut buf[0..12], &self.current);
        put_time(&mut buf[12..24], &self.lap);
        buf[24] = u8::from(self.is_end);
        buf
    }

    /// Decodes a record produced by [`encode`](Self::encode).
    ///
    /// Out-of-range time fields saturate rather than fail.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        check_size(buf.len())?;
        Ok(Self {
            current: get_time(&buf[0..12]),
            lap: get_time(&buf[12..24]),
            is_end: buf[24] != 0,
        })
    }
}

/// Fails unless `found` is exactly [`RECORD_SIZE`].
pub fn check_size(found: usize) -> Result<()> {
    if found != RECORD_SIZE {
        return Err(ChronoError::InvalidRecordSize {
            expected: RECORD_SIZE,
            found,
        });
    }
    Ok(())
}

fn put_time(out: &mut [u8], time: &ChronoTime) {
    let fields = [time.centiseconds, time.seconds, time.minutes];
    for (chunk, value) in out.chunks_exact_mut(4).zip(fields) {
        chunk.copy_from_slice(&u32::from(value).to_le_bytes());
    }
}

fn get_time(bytes: &[u8]) -> ChronoTime {
    let mut fields = [0u32; 3];
    for (field, chunk) in fields.iter_mut().zip(bytes.chunks_exact(4)) {
        *field = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    let [centis, secs, mins] = fields;
    let total = mins
        .saturating_mul(6000)
        .saturating_add(secs.saturating_mul(100))
        .saturating_add(centis);
    ChronoTime::from_centis(total)
}
