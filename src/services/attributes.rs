//! Text attributes.
//!
//! Each attribute is a short newline-terminated string, the format a
//! control file or shell script expects:
//!
//! | Attribute | Read | Store |
//! |-----------|------|-------|
//! | `is_running` | `"1\n"` / `"0\n"` | |
//! | `current_time` | `"MM:SS.cc\n"` | |
//! | `laps` | one `"MM:SS.cc\n"` per lap | |
//! | `laps_count` | `"N\n"` | |
//! | `laps_mode` | `"0\n"` / `"1\n"` | `"0"` or `"1"` |

use tracing::warn;

use crate::chrono::LapMode;
use crate::error::Result;
use crate::ledger::LapRecord;
use crate::traits::{Clock, LedSink, SegmentDisplay};

use super::shared::SharedChrono;

impl<C, D, L> SharedChrono<C, D, L>
where
    C: Clock,
    D: SegmentDisplay,
    L: LedSink,
{
    /// All laps in ledger order.
    pub fn laps(&self) -> Vec<LapRecord> {
        self.with_state(|state| state.ledger().iter().copied().collect())
    }

    /// `is_running` attribute.
    pub fn is_running_attr(&self) -> String {
        let running = self.with_state(|state| state.is_running());
        format!("{}\n", u8::from(running))
    }

    /// `current_time` attribute: live elapsed time.
    pub fn current_time_attr(&self) -> String {
        let elapsed = self.with_state_at(|state, now_ns| state.elapsed(now_ns));
        format!("{elapsed}\n")
    }

    /// `laps` attribute: absolute lap times, one per line.
    pub fn laps_attr(&self) -> String {
        self.laps()
            .iter()
            .map(|lap| format!("{}\n", lap.time))
            .collect()
    }

    /// `laps_count` attribute.
    pub fn laps_count_attr(&self) -> String {
        let count = self.with_state(|state| state.lap_count());
        format!("{count}\n")
    }

    /// `laps_mode` attribute.
    pub fn laps_mode_attr(&self) -> String {
        let mode = self.with_state(|state| state.mode());
        format!("{}\n", mode.as_u8())
    }

    /// Stores the `laps_mode` attribute.
    ///
    /// Returns the number of bytes consumed. Anything but `0` or `1` is
    /// rejected and the previous mode is kept.
    pub fn store_laps_mode(&self, input: &str) -> Result<usize> {
        let mode = LapMode::parse(input).inspect_err(|err| {
            warn!(%err, "rejected lap mode");
        })?;
        self.set_mode(mode);
        Ok(input.len())
    }

    /// Changes the lap display mode.
    pub fn set_mode(&self, mode: LapMode) {
        self.with_state(|state| state.set_mode(mode));
    }
}
