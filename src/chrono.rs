//! The chronometer state machine.
//!
//! [`ChronoState`] is the one cohesive struct that lives behind the
//! chronometer's lock: the timing engine, the last rendered time, the lap
//! ledger with its cursors, the replay flags and the lap-blink countdown.
//!
//! Every operation is a short read-modify-write that returns what the caller
//! has to do *after* releasing the lock: an [`Effects`] value naming the
//! display render, the indicator changes and the tasks to start or cancel.
//! Nothing here touches hardware, reads a clock or sleeps.
//!
//! # Example
//!
//! ```rust
//! use rs_chrono::{ButtonEvent, ChronoState, ChronoTime};
//!
//! const SEC: u64 = 1_000_000_000;
//!
//! let mut state = ChronoState::new();
//! let fx = state.handle_event(ButtonEvent::ToggleRun, 0);
//! assert!(fx.start_render_loop);
//!
//! state.handle_event(ButtonEvent::CaptureLap, 10 * SEC);
//! state.handle_event(ButtonEvent::ToggleRun, 12 * SEC);
//!
//! assert_eq!(state.lap_count(), 1);
//! assert_eq!(state.elapsed(99 * SEC), ChronoTime::new(0, 12, 0).unwrap());
//! ```

use heapless::Vec;
use tracing::{debug, info, warn};

use crate::config::ChronoConfig;
use crate::engine::TimingEngine;
use crate::error::{ChronoError, Result};
use crate::input::ButtonEvent;
use crate::ledger::{LapLedger, LapRecord};
use crate::reader::ReadRecord;
use crate::time::ChronoTime;
use crate::traits::Indicator;

// ============================================================================
// Lap Mode
// ============================================================================

/// How laps are shown during replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LapMode {
    /// Each lap's elapsed time as captured.
    #[default]
    Absolute,
    /// Each lap relative to the one before it.
    Split,
}

impl LapMode {
    /// Numeric value used by the mode attribute.
    pub const fn as_u8(self) -> u8 {
        match self {
            LapMode::Absolute => 0,
            LapMode::Split => 1,
        }
    }

    /// Mode for a numeric attribute value.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(LapMode::Absolute),
            1 => Some(LapMode::Split),
            _ => None,
        }
    }

    /// Parses attribute text: `"0"` or `"1"`, surrounding whitespace allowed.
    ///
    /// ```
    /// use rs_chrono::LapMode;
    ///
    /// assert_eq!(LapMode::parse("1\n").unwrap(), LapMode::Split);
    /// assert!(LapMode::parse("2").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        match text.trim() {
            "0" => Ok(LapMode::Absolute),
            "1" => Ok(LapMode::Split),
            other => Err(ChronoError::InvalidLapMode(other.into())),
        }
    }

    /// The time to show for `lap`, given the lap shown before it.
    pub fn display_value(self, lap: ChronoTime, previous: Option<ChronoTime>) -> ChronoTime {
        match self {
            LapMode::Absolute => lap,
            LapMode::Split => lap.saturating_sub(&previous.unwrap_or(ChronoTime::ZERO)),
        }
    }
}

// ============================================================================
// Sub-state
// ============================================================================

/// Replay flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayState {
    /// Laps are being stepped through on the display.
    pub active: bool,
    /// A reset arrived during replay; the ledger is cleared when replay ends.
    pub pending_clear: bool,
    /// Incremented on every replay entry so ticks from an older replay are
    /// recognized and dropped.
    pub session: u32,
}

/// Lap LED blink countdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlinkState {
    remaining: u8,
    lit: bool,
    active: bool,
}

impl BlinkState {
    /// Restarts the countdown. Returns `true` when no blink task is running
    /// and one must be started.
    pub fn arm(&mut self, toggles: u8) -> bool {
        self.remaining = toggles;
        if self.active {
            return false;
        }
        self.active = true;
        true
    }

    /// Advances one blink period.
    pub fn tick(&mut self) -> BlinkStep {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.lit = !self.lit;
            BlinkStep::Toggle(self.lit)
        } else {
            self.lit = false;
            self.active = false;
            BlinkStep::Done
        }
    }

    /// Returns true while a blink task should be running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Ticks left before the LED is switched off.
    pub fn remaining(&self) -> u8 {
        self.remaining
    }
}

/// Outcome of one blink period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlinkStep {
    /// Set the lap LED to this state and keep going.
    Toggle(bool),
    /// Switch the lap LED off and stop.
    Done,
}

// ============================================================================
// Effects
// ============================================================================

/// Work to carry out after the state lock is released.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Effects {
    /// Time to render on the display.
    pub render: Option<ChronoTime>,
    /// Indicator changes, in order.
    pub leds: Vec<(Indicator, bool), 4>,
    /// The render worker must be started.
    pub start_render_loop: bool,
    /// A replay stepper must be started for this session, first tick
    /// immediately.
    pub start_replay: Option<u32>,
    /// Any pending replay tick must be cancelled.
    pub cancel_replay: bool,
    /// The blink task must be started.
    pub start_blink: bool,
    /// The lap recorded by this operation.
    pub captured: Option<LapRecord>,
}

impl Effects {
    /// No follow-up work.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns true when there is nothing to do.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn led(&mut self, led: Indicator, on: bool) {
        // Capacity covers every operation's worst case
        let _ = self.leds.push((led, on));
    }
}

/// Outcome of one render worker iteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderTick {
    /// Still running; render this time if present, sleep, repeat.
    Continue(Option<ChronoTime>),
    /// The engine is stopped; apply these effects and exit the worker.
    Stopped(Effects),
}

/// Outcome of one replay stepper tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplayStep {
    /// Show this lap value, light the replay LED, schedule the next tick.
    Show(ChronoTime),
    /// Replay ended; apply these effects and stop.
    Finished(Effects),
    /// The tick belongs to a replay that is no longer active.
    Stale,
}

/// Snapshot of everything observable, for attributes and APIs.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChronoSnapshot {
    /// Whether the stopwatch is running.
    pub running: bool,
    /// Live elapsed time.
    pub elapsed: ChronoTime,
    /// Whether laps are being replayed.
    pub replaying: bool,
    /// Whether a deferred clear is waiting for replay to end.
    pub pending_clear: bool,
    /// Number of recorded laps.
    pub lap_count: usize,
    /// Lap display mode.
    pub mode: LapMode,
}

// ============================================================================
// Chrono State
// ============================================================================

/// Lock-guarded chronometer state.
///
/// # Thread Safety
///
/// Not thread-safe by itself. The service layer keeps exactly one instance
/// behind a mutex and only holds it for the duration of a single method
/// call.
#[derive(Clone, Debug)]
pub struct ChronoState {
    engine: TimingEngine,
    rendered: ChronoTime,
    ledger: LapLedger,
    replay: ReplayState,
    blink: BlinkState,
    blink_toggles: u8,
    mode: LapMode,
    render_active: bool,
}

impl Default for ChronoState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChronoState {
    /// Creates a stopped chronometer with default settings.
    pub fn new() -> Self {
        Self::with_config(&ChronoConfig::default())
    }

    /// Creates a stopped chronometer using `config` for the lap mode and
    /// blink length.
    pub fn with_config(config: &ChronoConfig) -> Self {
        Self {
            engine: TimingEngine::new(),
            rendered: ChronoTime::ZERO,
            ledger: LapLedger::new(),
            replay: ReplayState::default(),
            blink: BlinkState::default(),
            blink_toggles: config.blink_toggles,
            mode: config.lap_mode,
            render_active: false,
        }
    }

    // ------------------------------------------------------------------------
    // Button events
    // ------------------------------------------------------------------------

    /// Applies one button event.
    pub fn handle_event(&mut self, event: ButtonEvent, now_ns: u64) -> Effects {
        debug!(event = event.as_str(), "button event");
        match event {
            ButtonEvent::ToggleRun => {
                if self.engine.is_running() {
                    self.stop(now_ns)
                } else {
                    self.start(now_ns)
                }
            }
            ButtonEvent::CaptureLap => {
                if !self.engine.is_running() {
                    debug!("lap ignored while stopped");
                    return Effects::none();
                }
                let time = self.engine.elapsed_time(now_ns);
                self.record_lap(time)
            }
            ButtonEvent::ToggleReplay => {
                if self.replay.active {
                    let mut fx = self.finish_replay(now_ns);
                    fx.cancel_replay = true;
                    fx
                } else {
                    self.enter_replay()
                }
            }
            ButtonEvent::Reset => {
                if self.engine.is_running() {
                    debug!("reset ignored while running");
                    return Effects::none();
                }
                self.reset(now_ns)
            }
        }
    }

    fn start(&mut self, now_ns: u64) -> Effects {
        let mut fx = Effects::none();
        if self.engine.start(now_ns) {
            info!("chronometer started");
            fx.led(Indicator::Running, true);
            if !self.render_active {
                self.render_active = true;
                fx.start_render_loop = true;
            }
        }
        fx
    }

    fn stop(&mut self, now_ns: u64) -> Effects {
        let mut fx = Effects::none();
        if self.engine.stop(now_ns) {
            self.rendered = self.engine.elapsed_time(now_ns);
            info!(elapsed = %self.rendered, "chronometer stopped");
            fx.led(Indicator::Running, false);
            if !self.replay.active {
                fx.render = Some(self.rendered);
            }
        }
        fx
    }

    fn record_lap(&mut self, time: ChronoTime) -> Effects {
        let mut fx = Effects::none();
        match self.ledger.capture(time) {
            Ok(record) => {
                debug!(index = record.index, time = %record.time, "lap captured");
                fx.captured = Some(record);
                fx.start_blink = self.blink.arm(self.blink_toggles);
            }
            Err(err) => warn!(%err, time = %time, "dropping lap capture"),
        }
        fx
    }

    fn enter_replay(&mut self) -> Effects {
        self.replay.active = true;
        self.replay.session = self.replay.session.wrapping_add(1);
        self.ledger.rewind_display();
        info!(laps = self.ledger.count(), "replay started");
        Effects {
            start_replay: Some(self.replay.session),
            ..Effects::none()
        }
    }

    fn finish_replay(&mut self, now_ns: u64) -> Effects {
        self.replay.active = false;
        if self.replay.pending_clear {
            self.replay.pending_clear = false;
            self.ledger.clear();
            info!("deferred lap clear applied");
        }
        info!("replay finished");
        let mut fx = Effects::none();
        fx.render = Some(self.engine.elapsed_time(now_ns));
        fx.led(Indicator::Replay, false);
        fx
    }

    fn reset(&mut self, now_ns: u64) -> Effects {
        let last = self.engine.elapsed_time(now_ns);
        self.engine.reset();
        self.rendered = ChronoTime::ZERO;

        if self.replay.active {
            // Keep the final time in the ledger and clear once replay ends
            let fx = self.record_lap(last);
            self.replay.pending_clear = true;
            info!(last = %last, "reset during replay, clear deferred");
            fx
        } else {
            self.ledger.clear();
            info!("chronometer reset");
            Effects {
                render: Some(ChronoTime::ZERO),
                ..Effects::none()
            }
        }
    }

    // ------------------------------------------------------------------------
    // Periodic work
    // ------------------------------------------------------------------------

    /// One iteration of the render worker.
    pub fn render_tick(&mut self, now_ns: u64) -> RenderTick {
        if !self.engine.is_running() {
            self.render_active = false;
            return RenderTick::Stopped(Effects::none());
        }
        if self.engine.enforce_limit(now_ns) {
            self.render_active = false;
            self.rendered = ChronoTime::MAX;
            info!("maximum time reached, chronometer stopped");
            let mut fx = Effects::none();
            fx.led(Indicator::Running, false);
            if !self.replay.active {
                fx.render = Some(ChronoTime::MAX);
            }
            return RenderTick::Stopped(fx);
        }
        self.rendered = self.engine.elapsed_time(now_ns);
        RenderTick::Continue((!self.replay.active).then_some(self.rendered))
    }

    /// One tick of the replay stepper for `session`.
    pub fn replay_tick(&mut self, session: u32, now_ns: u64) -> ReplayStep {
        if !self.replay.active || self.replay.session != session {
            return ReplayStep::Stale;
        }
        if self.ledger.is_empty() {
            debug!("no laps to replay");
            return ReplayStep::Finished(self.finish_replay(now_ns));
        }
        match self.ledger.display_next() {
            Some((lap, previous)) => {
                let value = self.mode.display_value(lap.time, previous.map(|p| p.time));
                debug!(index = lap.index, shown = %value, "replaying lap");
                ReplayStep::Show(value)
            }
            None => ReplayStep::Finished(self.finish_replay(now_ns)),
        }
    }

    /// One period of the lap LED blink.
    pub fn blink_tick(&mut self) -> BlinkStep {
        self.blink.tick()
    }

    // ------------------------------------------------------------------------
    // Sequential reader
    // ------------------------------------------------------------------------

    /// Produces the next sequential-read record and moves the stream cursor.
    pub fn next_record(&mut self, now_ns: u64) -> ReadRecord {
        let current = self.engine.elapsed_time(now_ns);
        ReadRecord::from_step(current, self.ledger.stream_next())
    }

    // ------------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------------

    /// Stops the engine unconditionally. Returns `true` if it was running.
    pub fn force_stop(&mut self, now_ns: u64) -> bool {
        let stopped = self.engine.stop(now_ns);
        if stopped {
            self.rendered = self.engine.elapsed_time(now_ns);
        }
        stopped
    }

    /// Drops all laps and replay/blink state. Called once every task is
    /// cancelled.
    pub fn teardown(&mut self) {
        self.ledger.clear();
        self.replay.active = false;
        self.replay.pending_clear = false;
        self.blink = BlinkState::default();
        self.render_active = false;
    }

    // ------------------------------------------------------------------------
    // Queries and settings
    // ------------------------------------------------------------------------

    /// Whether the stopwatch is running.
    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    /// Live elapsed time.
    pub fn elapsed(&self, now_ns: u64) -> ChronoTime {
        self.engine.elapsed_time(now_ns)
    }

    /// The last live time computed by the render worker or a stop.
    pub fn rendered(&self) -> ChronoTime {
        self.rendered
    }

    /// The lap ledger.
    pub fn ledger(&self) -> &LapLedger {
        &self.ledger
    }

    /// Number of recorded laps.
    pub fn lap_count(&self) -> usize {
        self.ledger.count()
    }

    /// Replay flags.
    pub fn replay(&self) -> ReplayState {
        self.replay
    }

    /// Whether laps are being replayed.
    pub fn is_replaying(&self) -> bool {
        self.replay.active
    }

    /// Lap blink countdown.
    pub fn blink(&self) -> BlinkState {
        self.blink
    }

    /// Current lap display mode.
    pub fn mode(&self) -> LapMode {
        self.mode
    }

    /// Changes the lap display mode. Takes effect from the next replayed lap.
    pub fn set_mode(&mut self, mode: LapMode) {
        if self.mode != mode {
            info!(mode = mode.as_u8(), "lap mode changed");
        }
        self.mode = mode;
    }

    /// Full snapshot for attribute and API readers.
    pub fn snapshot(&self, now_ns: u64) -> ChronoSnapshot {
        ChronoSnapshot {
            running: self.engine.is_running(),
            elapsed: self.engine.elapsed_time(now_ns),
            replaying: self.replay.active,
            pending_clear: self.replay.pending_clear,
            lap_count: self.ledger.count(),
            mode: self.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{MAX_NANOS, NANOS_PER_SEC};

    const SEC: u64 = NANOS_PER_SEC;

    fn secs(s: u8) -> ChronoTime {
        ChronoTime::new(0, s, 0).unwrap()
    }

    fn running_state() -> ChronoState {
        let mut state = ChronoState::new();
        state.handle_event(ButtonEvent::ToggleRun, 0);
        state
    }

    // =========================================================================
    // Lap Mode Tests
    // =========================================================================

    #[test]
    fn lap_mode_numeric() {
        assert_eq!(LapMode::from_u8(0), Some(LapMode::Absolute));
        assert_eq!(LapMode::from_u8(1), Some(LapMode::Split));
        assert_eq!(LapMode::from_u8(2), None);
        assert_eq!(LapMode::Split.as_u8(), 1);
    }

    #[test]
    fn lap_mode_parse_rejects_other_text() {
        assert_eq!(LapMode::parse(" 0 ").unwrap(), LapMode::Absolute);
        for bad in ["", "2", "-1", "01x", "split"] {
            assert!(matches!(
                LapMode::parse(bad),
                Err(ChronoError::InvalidLapMode(_))
            ));
        }
    }

    #[test]
    fn split_display_value() {
        assert_eq!(LapMode::Split.display_value(secs(25), Some(secs(10))), secs(15));
        assert_eq!(LapMode::Split.display_value(secs(10), None), secs(10));
        assert_eq!(
            LapMode::Absolute.display_value(secs(25), Some(secs(10))),
            secs(25)
        );
    }

    // =========================================================================
    // Blink Tests
    // =========================================================================

    #[test]
    fn blink_toggles_then_finishes() {
        let mut blink = BlinkState::default();
        assert!(blink.arm(3));
        assert_eq!(blink.tick(), BlinkStep::Toggle(true));
        assert_eq!(blink.tick(), BlinkStep::Toggle(false));
        assert_eq!(blink.tick(), BlinkStep::Toggle(true));
        assert_eq!(blink.tick(), BlinkStep::Done);
        assert!(!blink.is_active());
    }

    #[test]
    fn blink_rearm_restarts_countdown() {
        let mut blink = BlinkState::default();
        assert!(blink.arm(10));
        for _ in 0..7 {
            blink.tick();
        }
        // Already running: no second task, countdown back to full
        assert!(!blink.arm(10));
        assert_eq!(blink.remaining(), 10);
    }

    // =========================================================================
    // Event Tests
    // =========================================================================

    #[test]
    fn start_requests_render_loop_and_led() {
        let mut state = ChronoState::new();
        let fx = state.handle_event(ButtonEvent::ToggleRun, 0);
        assert!(state.is_running());
        assert!(fx.start_render_loop);
        assert_eq!(fx.leds.as_slice(), &[(Indicator::Running, true)]);
    }

    #[test]
    fn restart_before_worker_exits_does_not_spawn_twice() {
        let mut state = running_state();
        state.handle_event(ButtonEvent::ToggleRun, SEC);
        let fx = state.handle_event(ButtonEvent::ToggleRun, 2 * SEC);
        assert!(!fx.start_render_loop);

        // Once the worker has observed the stop, a new start spawns again
        state.handle_event(ButtonEvent::ToggleRun, 3 * SEC);
        assert!(matches!(state.render_tick(3 * SEC), RenderTick::Stopped(_)));
        let fx = state.handle_event(ButtonEvent::ToggleRun, 4 * SEC);
        assert!(fx.start_render_loop);
    }

    #[test]
    fn stop_renders_settled_time() {
        let mut state = running_state();
        let fx = state.handle_event(ButtonEvent::ToggleRun, 5 * SEC);
        assert_eq!(fx.render, Some(secs(5)));
        assert_eq!(fx.leds.as_slice(), &[(Indicator::Running, false)]);
        assert_eq!(state.rendered(), secs(5));
    }

    #[test]
    fn lap_while_stopped_is_noop() {
        let mut state = ChronoState::new();
        let fx = state.handle_event(ButtonEvent::CaptureLap, SEC);
        assert!(fx.is_empty());
        assert_eq!(state.lap_count(), 0);
    }

    #[test]
    fn lap_records_elapsed_and_arms_blink() {
        let mut state = running_state();
        let fx = state.handle_event(ButtonEvent::CaptureLap, 10 * SEC);
        assert_eq!(fx.captured.unwrap().time, secs(10));
        assert!(fx.start_blink);

        let fx = state.handle_event(ButtonEvent::CaptureLap, 11 * SEC);
        assert!(!fx.start_blink);
        assert_eq!(state.lap_count(), 2);
    }

    #[test]
    fn reset_while_running_is_noop() {
        let mut state = running_state();
        state.handle_event(ButtonEvent::CaptureLap, SEC);
        let fx = state.handle_event(ButtonEvent::Reset, 2 * SEC);
        assert!(fx.is_empty());
        assert_eq!(state.lap_count(), 1);
        assert!(state.is_running());
    }

    #[test]
    fn reset_when_stopped_clears_everything() {
        let mut state = running_state();
        state.handle_event(ButtonEvent::CaptureLap, SEC);
        state.handle_event(ButtonEvent::ToggleRun, 2 * SEC);

        let fx = state.handle_event(ButtonEvent::Reset, 3 * SEC);
        assert_eq!(fx.render, Some(ChronoTime::ZERO));
        assert_eq!(state.lap_count(), 0);
        assert_eq!(state.elapsed(10 * SEC), ChronoTime::ZERO);
        assert_eq!(state.rendered(), ChronoTime::ZERO);
    }

    // =========================================================================
    // Replay Tests
    // =========================================================================

    fn state_with_laps(laps: &[u8]) -> ChronoState {
        let mut state = running_state();
        for &s in laps {
            state.handle_event(ButtonEvent::CaptureLap, u64::from(s) * SEC);
        }
        state
    }

    #[test]
    fn replay_steps_through_laps_then_finishes() {
        let mut state = state_with_laps(&[10, 20]);
        let fx = state.handle_event(ButtonEvent::ToggleReplay, 30 * SEC);
        let session = fx.start_replay.unwrap();

        assert_eq!(state.replay_tick(session, 30 * SEC), ReplayStep::Show(secs(10)));
        assert_eq!(state.replay_tick(session, 33 * SEC), ReplayStep::Show(secs(20)));
        match state.replay_tick(session, 36 * SEC) {
            ReplayStep::Finished(fx) => {
                assert_eq!(fx.render, Some(secs(36)));
                assert_eq!(fx.leds.as_slice(), &[(Indicator::Replay, false)]);
            }
            other => panic!("expected finish, got {other:?}"),
        }
        assert!(!state.is_replaying());
    }

    #[test]
    fn replay_on_empty_ledger_finishes_at_first_tick() {
        let mut state = ChronoState::new();
        let session = state
            .handle_event(ButtonEvent::ToggleReplay, 0)
            .start_replay
            .unwrap();
        assert!(matches!(
            state.replay_tick(session, 0),
            ReplayStep::Finished(_)
        ));
    }

    #[test]
    fn split_mode_replay() {
        let mut state = state_with_laps(&[10, 25, 40]);
        state.set_mode(LapMode::Split);
        let session = state
            .handle_event(ButtonEvent::ToggleReplay, 50 * SEC)
            .start_replay
            .unwrap();

        let shown: alloc::vec::Vec<_> = (0..3)
            .map(|_| match state.replay_tick(session, 50 * SEC) {
                ReplayStep::Show(t) => t,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(shown, [secs(10), secs(15), secs(15)]);
    }

    #[test]
    fn toggle_replay_again_exits_early() {
        let mut state = state_with_laps(&[1, 2, 3]);
        let session = state
            .handle_event(ButtonEvent::ToggleReplay, 4 * SEC)
            .start_replay
            .unwrap();
        state.replay_tick(session, 4 * SEC);

        let fx = state.handle_event(ButtonEvent::ToggleReplay, 5 * SEC);
        assert!(fx.cancel_replay);
        assert_eq!(fx.render, Some(secs(5)));
        assert!(!state.is_replaying());
        assert_eq!(state.replay_tick(session, 6 * SEC), ReplayStep::Stale);
    }

    #[test]
    fn ticks_from_previous_session_are_stale() {
        let mut state = state_with_laps(&[1]);
        let first = state
            .handle_event(ButtonEvent::ToggleReplay, 0)
            .start_replay
            .unwrap();
        state.handle_event(ButtonEvent::ToggleReplay, 0);
        let second = state
            .handle_event(ButtonEvent::ToggleReplay, 0)
            .start_replay
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(state.replay_tick(first, 0), ReplayStep::Stale);
        assert_eq!(state.replay_tick(second, 0), ReplayStep::Show(secs(1)));
    }

    #[test]
    fn live_render_suppressed_during_replay() {
        let mut state = state_with_laps(&[1]);
        state.handle_event(ButtonEvent::ToggleReplay, 2 * SEC);
        assert_eq!(state.render_tick(2 * SEC), RenderTick::Continue(None));

        let fx = state.handle_event(ButtonEvent::ToggleRun, 3 * SEC);
        assert_eq!(fx.render, None);
    }

    #[test]
    fn reset_during_replay_defers_clear() {
        let mut state = state_with_laps(&[10, 20]);
        state.handle_event(ButtonEvent::ToggleRun, 30 * SEC);
        let session = state
            .handle_event(ButtonEvent::ToggleReplay, 31 * SEC)
            .start_replay
            .unwrap();

        let fx = state.handle_event(ButtonEvent::Reset, 32 * SEC);
        assert_eq!(fx.captured.unwrap().time, secs(30));
        assert_eq!(fx.render, None);
        assert_eq!(state.lap_count(), 3);
        assert!(state.replay().pending_clear);
        assert_eq!(state.elapsed(40 * SEC), ChronoTime::ZERO);

        // The synthetic lap is replayed too, then the ledger is cleared
        for expected in [10, 20, 30] {
            assert_eq!(
                state.replay_tick(session, 33 * SEC),
                ReplayStep::Show(secs(expected))
            );
        }
        assert!(matches!(
            state.replay_tick(session, 34 * SEC),
            ReplayStep::Finished(_)
        ));
        assert_eq!(state.lap_count(), 0);
        assert!(!state.replay().pending_clear);
    }

    #[test]
    fn pending_clear_applies_on_early_exit() {
        let mut state = state_with_laps(&[10]);
        state.handle_event(ButtonEvent::ToggleRun, 15 * SEC);
        state.handle_event(ButtonEvent::ToggleReplay, 16 * SEC);
        state.handle_event(ButtonEvent::Reset, 17 * SEC);
        assert_eq!(state.lap_count(), 2);

        state.handle_event(ButtonEvent::ToggleReplay, 18 * SEC);
        assert_eq!(state.lap_count(), 0);
    }

    // =========================================================================
    // Render Worker Tests
    // =========================================================================

    #[test]
    fn render_tick_reports_live_time() {
        let mut state = running_state();
        assert_eq!(
            state.render_tick(1_500_000_000),
            RenderTick::Continue(Some(ChronoTime::new(0, 1, 50).unwrap()))
        );
    }

    #[test]
    fn render_tick_forces_stop_at_max() {
        let mut state = running_state();
        match state.render_tick(MAX_NANOS + SEC) {
            RenderTick::Stopped(fx) => {
                assert_eq!(fx.render, Some(ChronoTime::MAX));
                assert_eq!(fx.leds.as_slice(), &[(Indicator::Running, false)]);
            }
            other => panic!("expected forced stop, got {other:?}"),
        }
        assert!(!state.is_running());
        assert_eq!(state.elapsed(u64::MAX), ChronoTime::MAX);
    }

    #[test]
    fn render_tick_when_stopped_exits() {
        let mut state = ChronoState::new();
        assert_eq!(state.render_tick(0), RenderTick::Stopped(Effects::none()));
    }

    // =========================================================================
    // Reader Tests
    // =========================================================================

    #[test]
    fn next_record_reports_live_time() {
        let mut state = state_with_laps(&[1]);
        let record = state.next_record(5 * SEC);
        assert_eq!(record, ReadRecord::lap(secs(5), secs(1)));
        assert_eq!(state.next_record(6 * SEC), ReadRecord::end(secs(6)));
    }

    #[test]
    fn next_record_on_empty_is_end() {
        let mut state = ChronoState::new();
        assert_eq!(state.next_record(0), ReadRecord::end(ChronoTime::ZERO));
    }

    // =========================================================================
    // Teardown Tests
    // =========================================================================

    #[test]
    fn force_stop_and_teardown() {
        let mut state = state_with_laps(&[1, 2]);
        state.handle_event(ButtonEvent::ToggleReplay, 3 * SEC);
        assert!(state.force_stop(4 * SEC));
        assert!(!state.force_stop(5 * SEC));

        state.teardown();
        assert_eq!(state.lap_count(), 0);
        assert!(!state.is_replaying());
        assert!(!state.blink().is_active());
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut state = state_with_laps(&[3]);
        state.set_mode(LapMode::Split);
        let snap = state.snapshot(4 * SEC);
        assert!(snap.running);
        assert_eq!(snap.elapsed, secs(4));
        assert_eq!(snap.lap_count, 1);
        assert_eq!(snap.mode, LapMode::Split);
        assert!(!snap.replaying);
    }
}
