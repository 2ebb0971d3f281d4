//! Shared chronometer context.
//!
//! `SharedChrono` owns the one lock-guarded [`ChronoState`], the clock and
//! the two output sinks. Every task (deferred handler, render worker,
//! replay stepper, blink, readers) goes through it.
//!
//! # Example
//!
//! ```rust
//! use rs_chrono::config::ChronoConfig;
//! use rs_chrono::hal::{MockClock, MockDisplay, MockLeds};
//! use rs_chrono::services::SharedChrono;
//! use rs_chrono::ButtonEvent;
//!
//! let shared = SharedChrono::new(
//!     &ChronoConfig::default(),
//!     MockClock::new(),
//!     MockDisplay::new(),
//!     MockLeds::new(),
//! );
//!
//! shared.handle_event(ButtonEvent::ToggleRun);
//! assert!(shared.with_state(|s| s.is_running()));
//! ```

use std::sync::Mutex;

use tracing::warn;

use crate::chrono::{ChronoSnapshot, ChronoState, Effects};
use crate::config::ChronoConfig;
use crate::display;
use crate::error::Result;
use crate::input::ButtonEvent;
use crate::reader::{self, ReadRecord};
use crate::time::ChronoTime;
use crate::traits::{Clock, Indicator, LedSink, SegmentDisplay};

use super::lock;

// ============================================================================
// Stream Pass
// ============================================================================

/// One full pass of the sequential reader.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamPass {
    /// Live time reported by the end record.
    pub current: ChronoTime,
    /// Laps in ledger order.
    pub laps: Vec<ChronoTime>,
}

// ============================================================================
// Shared Chrono
// ============================================================================

/// Shared state for all chronometer tasks.
///
/// # Thread Safety
///
/// - One `Mutex` guards all timing and lap state. It is only reachable
///   through the closure passed to [`with_state`](Self::with_state), so the
///   guard cannot be held across a sink write or an await.
/// - The display and LEDs each have their own lock and are never written
///   while the state lock is held.
/// - Poisoned locks are recovered, not propagated.
pub struct SharedChrono<C, D, L> {
    state: Mutex<ChronoState>,
    clock: C,
    display: Mutex<D>,
    leds: Mutex<L>,
}

impl<C, D, L> SharedChrono<C, D, L>
where
    C: Clock,
    D: SegmentDisplay,
    L: LedSink,
{
    /// Creates a stopped chronometer with an empty ledger.
    pub fn new(config: &ChronoConfig, clock: C, display: D, leds: L) -> Self {
        Self {
            state: Mutex::new(ChronoState::with_config(config)),
            clock,
            display: Mutex::new(display),
            leds: Mutex::new(leds),
        }
    }

    /// Current clock reading.
    #[inline]
    pub fn now_ns(&self) -> u64 {
        self.clock.now_ns()
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Runs `f` with the state lock held and the current time.
    ///
    /// The clock is read under the lock so concurrent callers observe
    /// non-decreasing timestamps.
    pub fn with_state_at<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut ChronoState, u64) -> R,
    {
        let mut guard = lock(&self.state);
        let now_ns = self.clock.now_ns();
        f(&mut guard, now_ns)
    }

    /// Runs `f` with the state lock held.
    pub fn with_state<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut ChronoState) -> R,
    {
        let mut guard = lock(&self.state);
        f(&mut guard)
    }

    /// Runs `f` with the display lock held (state lock not held).
    pub fn with_display<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut D) -> R,
    {
        f(&mut lock(&self.display))
    }

    /// Runs `f` with the LED lock held (state lock not held).
    pub fn with_leds<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut L) -> R,
    {
        f(&mut lock(&self.leds))
    }

    /// Snapshot of everything observable.
    pub fn snapshot(&self) -> ChronoSnapshot {
        self.with_state_at(|state, now_ns| state.snapshot(now_ns))
    }

    // ------------------------------------------------------------------------
    // Sinks
    // ------------------------------------------------------------------------

    /// Renders `time`. Failures are logged and dropped.
    pub fn render(&self, time: &ChronoTime) {
        let mut display = lock(&self.display);
        if let Err(err) = display::render_time(&mut *display, time) {
            warn!(?err, time = %time, "display write failed");
        }
    }

    /// Renders `time` only if `still_wanted` holds at the moment of the
    /// write. Returns whether it rendered.
    ///
    /// The display lock is taken first and the state lock only for the
    /// check, so a task that computed `time` earlier cannot overwrite a
    /// newer render.
    pub fn render_if<F>(&self, time: &ChronoTime, still_wanted: F) -> bool
    where
        F: FnOnce(&ChronoState) -> bool,
    {
        let mut display = lock(&self.display);
        if !still_wanted(&lock(&self.state)) {
            return false;
        }
        if let Err(err) = display::render_time(&mut *display, time) {
            warn!(?err, time = %time, "display write failed");
        }
        true
    }

    /// Shows a replayed lap and lights the replay LED, unless replay
    /// `session` ended in the meantime. Returns whether it rendered.
    ///
    /// The LED is set while the display lock is still held, so an exit from
    /// replay always switches it off after this.
    pub fn show_replay_lap(&self, session: u32, time: &ChronoTime) -> bool {
        let mut display = lock(&self.display);
        let current = {
            let state = lock(&self.state);
            state.is_replaying() && state.replay().session == session
        };
        if !current {
            return false;
        }
        if let Err(err) = display::render_time(&mut *display, time) {
            warn!(?err, time = %time, "display write failed");
        }
        self.set_led(Indicator::Replay, true);
        true
    }

    /// Blanks the display.
    pub fn blank_display(&self) {
        let mut display = lock(&self.display);
        if let Err(err) = display::blank(&mut *display) {
            warn!(?err, "display blank failed");
        }
    }

    /// Sets one indicator. Failures are logged and dropped.
    pub fn set_led(&self, led: Indicator, on: bool) {
        if let Err(err) = lock(&self.leds).set(led, on) {
            warn!(?err, ?led, on, "led write failed");
        }
    }

    /// Switches every indicator off.
    pub fn leds_off(&self) {
        if let Err(err) = lock(&self.leds).all_off() {
            warn!(?err, "led write failed");
        }
    }

    /// Carries out the render and indicator parts of `fx`.
    pub fn apply_io(&self, fx: &Effects) {
        if let Some(time) = fx.render {
            self.render(&time);
        }
        for &(led, on) in &fx.leds {
            self.set_led(led, on);
        }
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Applies a button event and its render/indicator effects.
    ///
    /// Task starts and cancellations in the returned [`Effects`] are left to
    /// the caller.
    pub fn handle_event(&self, event: ButtonEvent) -> Effects {
        let fx = self.with_state_at(|state, now_ns| state.handle_event(event, now_ns));
        self.apply_io(&fx);
        fx
    }

    // ------------------------------------------------------------------------
    // Sequential reader
    // ------------------------------------------------------------------------

    /// Produces the next record and advances the stream cursor.
    pub fn next_record(&self) -> ReadRecord {
        self.with_state_at(|state, now_ns| state.next_record(now_ns))
    }

    /// Fills `buf` with the next encoded record.
    ///
    /// `buf` must be exactly [`RECORD_SIZE`](crate::reader::RECORD_SIZE)
    /// bytes; otherwise nothing is read and the cursor does not move.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        reader::check_size(buf.len())?;
        self.next_record().encode(buf)
    }

    /// Reads records until the end marker.
    pub fn drain_pass(&self) -> StreamPass {
        let mut pass = StreamPass::default();
        loop {
            let record = self.next_record();
            if record.is_end {
                pass.current = record.current;
                return pass;
            }
            pass.laps.push(record.lap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChronoError;
    use crate::hal::{MockClock, MockDisplay, MockLeds};
    use crate::reader::RECORD_SIZE;

    type TestShared = SharedChrono<MockClock, MockDisplay, MockLeds>;

    fn shared() -> TestShared {
        SharedChrono::new(
            &ChronoConfig::default(),
            MockClock::new(),
            MockDisplay::new(),
            MockLeds::new(),
        )
    }

    fn secs(s: u8) -> ChronoTime {
        ChronoTime::new(0, s, 0).unwrap()
    }

    // ========================================================================
    // Event tests
    // ========================================================================

    #[test]
    fn start_lights_running_led() {
        let shared = shared();
        let fx = shared.handle_event(ButtonEvent::ToggleRun);
        assert!(fx.start_render_loop);
        assert!(shared.with_leds(|l| l.is_on(Indicator::Running)));
    }

    #[test]
    fn stop_renders_settled_time() {
        let shared = shared();
        shared.handle_event(ButtonEvent::ToggleRun);
        shared.clock().advance_secs(7);
        shared.handle_event(ButtonEvent::ToggleRun);

        assert_eq!(shared.with_display(|d| d.shown()), Some(secs(7)));
        assert!(!shared.with_leds(|l| l.is_on(Indicator::Running)));
    }

    #[test]
    fn reset_blanks_display() {
        let shared = shared();
        shared.handle_event(ButtonEvent::ToggleRun);
        shared.clock().advance_secs(1);
        shared.handle_event(ButtonEvent::ToggleRun);
        shared.handle_event(ButtonEvent::Reset);
        assert!(shared.with_display(|d| d.is_blank()));
    }

    #[test]
    fn sink_failures_are_not_fatal() {
        let shared = SharedChrono::new(
            &ChronoConfig::default(),
            MockClock::new(),
            MockDisplay::new().failing(),
            MockLeds::new().failing(),
        );
        shared.handle_event(ButtonEvent::ToggleRun);
        shared.clock().advance_secs(1);
        shared.handle_event(ButtonEvent::ToggleRun);
        assert_eq!(shared.snapshot().elapsed, secs(1));
    }

    #[test]
    fn replay_lap_shown_only_for_current_session() {
        let shared = shared();
        let session = shared
            .handle_event(ButtonEvent::ToggleReplay)
            .start_replay
            .unwrap();

        assert!(!shared.show_replay_lap(session.wrapping_add(1), &secs(4)));
        assert!(shared.show_replay_lap(session, &secs(4)));
        assert_eq!(shared.with_display(|d| d.shown()), Some(secs(4)));
        assert!(shared.with_leds(|l| l.is_on(Indicator::Replay)));

        shared.handle_event(ButtonEvent::ToggleReplay);
        assert!(!shared.show_replay_lap(session, &secs(5)));
        assert!(!shared.with_leds(|l| l.is_on(Indicator::Replay)));
    }

    #[test]
    fn render_if_checks_state() {
        let shared = shared();
        assert!(!shared.render_if(&secs(3), |s| s.is_running()));
        assert!(shared.with_display(|d| d.is_blank()));
        assert!(shared.render_if(&secs(3), |s| !s.is_running()));
        assert_eq!(shared.with_display(|d| d.shown()), Some(secs(3)));
    }

    // ========================================================================
    // Reader tests
    // ========================================================================

    #[test]
    fn read_rejects_wrong_size_without_moving_cursor() {
        let shared = shared();
        shared.handle_event(ButtonEvent::ToggleRun);
        shared.clock().advance_secs(1);
        shared.handle_event(ButtonEvent::CaptureLap);

        let mut small = [0u8; RECORD_SIZE - 1];
        assert_eq!(
            shared.read(&mut small),
            Err(ChronoError::InvalidRecordSize {
                expected: RECORD_SIZE,
                found: RECORD_SIZE - 1,
            })
        );

        let mut buf = [0u8; RECORD_SIZE];
        assert_eq!(shared.read(&mut buf), Ok(RECORD_SIZE));
        let record = ReadRecord::from_bytes(&buf).unwrap();
        assert!(!record.is_end);
        assert_eq!(record.lap, secs(1));
    }

    #[test]
    fn drain_pass_collects_laps_then_restarts() {
        let shared = shared();
        shared.handle_event(ButtonEvent::ToggleRun);
        for _ in 0..3 {
            shared.clock().advance_secs(10);
            shared.handle_event(ButtonEvent::CaptureLap);
        }

        let first = shared.drain_pass();
        assert_eq!(first.laps, vec![secs(10), secs(20), secs(30)]);
        assert_eq!(first.current, secs(30));

        let second = shared.drain_pass();
        assert_eq!(second.laps, first.laps);
    }

    #[test]
    fn drain_pass_on_empty_ledger() {
        let shared = shared();
        let pass = shared.drain_pass();
        assert!(pass.laps.is_empty());
        assert_eq!(pass.current, ChronoTime::ZERO);
    }

    #[test]
    fn concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let shared = Arc::new(shared());
        shared.handle_event(ButtonEvent::ToggleRun);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for _ in 0..10 {
                        shared.clock().advance_ms(1);
                        shared.handle_event(ButtonEvent::CaptureLap);
                        let _ = shared.next_record();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.snapshot().lap_count, 40);
    }
}
