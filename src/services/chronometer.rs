//! The running chronometer: task ownership and teardown.
//!
//! [`Chronometer`] wires a [`SharedChrono`] to Tokio. Each periodic
//! activity runs as its own task with its own cancel handle:
//!
//! | Task | Period | Lives while |
//! |------|--------|-------------|
//! | deferred handler | on interrupt | until shutdown |
//! | render worker | `render_interval_ms` | the stopwatch runs |
//! | replay stepper | `replay_interval_ms` | laps are replayed |
//! | lap blink | `blink_interval_ms` | the toggle countdown lasts |
//!
//! # Example
//!
//! ```rust
//! use rs_chrono::config::ChronoConfig;
//! use rs_chrono::hal::{MockButtons, MockDisplay, MockLeds, TokioClock};
//! use rs_chrono::services::Chronometer;
//! use rs_chrono::ButtonEvent;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let chrono = Chronometer::start(
//!     &ChronoConfig::default(),
//!     TokioClock::new(),
//!     MockDisplay::new(),
//!     MockLeds::new(),
//! );
//!
//! let buttons = MockButtons::new();
//! buttons.press(ButtonEvent::ToggleRun);
//! chrono.handle_edges(&mut buttons.clone());
//! assert_eq!(chrono.is_running_attr(), "1\n");
//!
//! chrono.shutdown().await;
//! assert_eq!(chrono.is_running_attr(), "0\n");
//! # }
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, debug_span, info, instrument, trace, warn, Instrument};

use crate::chrono::{BlinkStep, ChronoSnapshot, ChronoState, Effects, RenderTick, ReplayStep};
use crate::config::ChronoConfig;
use crate::error::{ChronoError, Result};
use crate::input::ButtonEvent;
use crate::reader::ReadRecord;
use crate::traits::{ButtonInput, Clock, Indicator, LedSink, SegmentDisplay};

use super::irq::{interrupt_channel, InterruptLine, InterruptReceiver};
use super::lock;
use super::shared::{SharedChrono, StreamPass};

fn millis(ms: u32) -> Duration {
    Duration::from_millis(u64::from(ms))
}

// ============================================================================
// Task Slots
// ============================================================================

/// Cancel handle for one activity.
#[derive(Debug, Default)]
struct TaskSlot {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TaskSlot {
    /// Installs `handle`, aborting whatever the slot held before.
    fn set(&self, handle: JoinHandle<()>) {
        if let Some(old) = lock(&self.handle).replace(handle) {
            old.abort();
        }
    }

    /// Aborts the task without waiting for it.
    fn abort(&self) {
        if let Some(handle) = lock(&self.handle).take() {
            handle.abort();
        }
    }

    /// Aborts the task and waits until it is gone.
    async fn cancel(&self) {
        let handle = lock(&self.handle).take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
    }

    fn is_running(&self) -> bool {
        lock(&self.handle)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[derive(Debug, Default)]
struct Tasks {
    handler: TaskSlot,
    render: TaskSlot,
    replay: TaskSlot,
    blink: TaskSlot,
}

/// Which tasks are currently alive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskStatus {
    /// Deferred interrupt handler.
    pub handler: bool,
    /// Live render worker.
    pub render: bool,
    /// Replay stepper.
    pub replay: bool,
    /// Lap LED blink.
    pub blink: bool,
}

// ============================================================================
// Chronometer
// ============================================================================

/// A chronometer running on Tokio.
///
/// Cloning is cheap; clones share state and tasks.
pub struct Chronometer<C, D, L> {
    shared: Arc<SharedChrono<C, D, L>>,
    config: ChronoConfig,
    tasks: Arc<Tasks>,
    line: InterruptLine,
    receiver: Arc<Mutex<Option<InterruptReceiver>>>,
}

impl<C, D, L> Clone for Chronometer<C, D, L> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            config: self.config.clone(),
            tasks: Arc::clone(&self.tasks),
            line: self.line.clone(),
            receiver: Arc::clone(&self.receiver),
        }
    }
}

impl<C, D, L> Chronometer<C, D, L>
where
    C: Clock + Send + Sync + 'static,
    D: SegmentDisplay + Send + 'static,
    L: LedSink + Send + 'static,
{
    /// Creates a stopped chronometer, blanks the display and switches every
    /// indicator off.
    pub fn start(config: &ChronoConfig, clock: C, display: D, leds: L) -> Self {
        let shared = Arc::new(SharedChrono::new(config, clock, display, leds));
        shared.blank_display();
        shared.leds_off();

        let (line, receiver) = interrupt_channel(config.irq_queue_depth);
        info!(
            render_ms = config.render_interval_ms,
            replay_ms = config.replay_interval_ms,
            "chronometer ready"
        );
        Self {
            shared,
            config: config.clone(),
            tasks: Arc::default(),
            line,
            receiver: Arc::new(Mutex::new(Some(receiver))),
        }
    }

    /// The shared context, for readers such as the web surface.
    pub fn shared(&self) -> &Arc<SharedChrono<C, D, L>> {
        &self.shared
    }

    /// Interrupt-side handle. Call [`InterruptLine::raise`] from the
    /// interrupt path whenever the edge register latches.
    pub fn interrupt_line(&self) -> InterruptLine {
        self.line.clone()
    }

    /// Starts the deferred handler, which services every
    /// [`raise`](InterruptLine::raise) by reading `buttons`.
    ///
    /// Only one handler can be attached.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_deferred_handler<B>(&self, mut buttons: B) -> Result<()>
    where
        B: ButtonInput + Send + 'static,
    {
        let mut receiver = lock(&self.receiver)
            .take()
            .ok_or(ChronoError::HandlerAttached)?;
        let this = self.clone();
        let task = async move {
            debug!("deferred handler attached");
            while receiver.wait().await {
                this.handle_edges(&mut buttons);
            }
            debug!("deferred handler detached");
        };
        self.tasks
            .handler
            .set(tokio::spawn(task.instrument(debug_span!("deferred_handler"))));
        Ok(())
    }

    /// Body of the deferred handler: reads the edge register, handles the
    /// decoded event, then acknowledges the register whatever the outcome.
    ///
    /// Returns the recognized event, if any.
    pub fn handle_edges<B: ButtonInput>(&self, buttons: &mut B) -> Option<ButtonEvent> {
        let edges = buttons.edges();
        let event = ButtonEvent::from_edges(edges);
        match event {
            Some(event) => {
                self.handle_event(event);
            }
            None if edges == 0 => debug!("spurious interrupt, no edges latched"),
            None => warn!(edges, "unrecognized key pattern"),
        }
        buttons.acknowledge();
        event
    }

    /// Applies one button event, including the tasks it starts or cancels.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime when the event can start a
    /// task.
    pub fn handle_event(&self, event: ButtonEvent) -> Effects {
        let fx = self.shared.handle_event(event);
        if fx.cancel_replay {
            self.tasks.replay.abort();
        }
        if let Some(session) = fx.start_replay {
            self.spawn_replay(session);
        }
        if fx.start_render_loop {
            self.spawn_render_loop();
        }
        if fx.start_blink {
            self.spawn_blink();
        }
        fx
    }

    // ------------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------------

    fn spawn_render_loop(&self) {
        let shared = Arc::clone(&self.shared);
        let period = millis(self.config.render_interval_ms);
        let task = async move {
            debug!("render worker started");
            loop {
                match shared.with_state_at(|state, now_ns| state.render_tick(now_ns)) {
                    RenderTick::Continue(Some(time)) => {
                        let shown = shared.render_if(&time, |state| {
                            state.is_running() && !state.is_replaying()
                        });
                        if shown {
                            trace!(time = %time, "render");
                        }
                    }
                    RenderTick::Continue(None) => {}
                    RenderTick::Stopped(fx) => {
                        shared.apply_io(&fx);
                        break;
                    }
                }
                tokio::time::sleep(period).await;
            }
            debug!("render worker exited");
        };
        self.tasks
            .render
            .set(tokio::spawn(task.instrument(debug_span!("render_worker"))));
    }

    fn spawn_replay(&self, session: u32) {
        let shared = Arc::clone(&self.shared);
        let period = millis(self.config.replay_interval_ms);
        let task = async move {
            debug!("replay stepper started");
            loop {
                match shared.with_state_at(|state, now_ns| state.replay_tick(session, now_ns)) {
                    ReplayStep::Show(time) => {
                        if !shared.show_replay_lap(session, &time) {
                            break;
                        }
                    }
                    ReplayStep::Finished(fx) => {
                        shared.apply_io(&fx);
                        break;
                    }
                    ReplayStep::Stale => break,
                }
                tokio::time::sleep(period).await;
            }
            debug!("replay stepper exited");
        };
        self.tasks
            .replay
            .set(tokio::spawn(task.instrument(debug_span!("replay", session))));
    }

    fn spawn_blink(&self) {
        let shared = Arc::clone(&self.shared);
        let period = millis(self.config.blink_interval_ms);
        let task = async move {
            loop {
                match shared.with_state(ChronoState::blink_tick) {
                    BlinkStep::Toggle(on) => shared.set_led(Indicator::Lap, on),
                    BlinkStep::Done => {
                        shared.set_led(Indicator::Lap, false);
                        break;
                    }
                }
                tokio::time::sleep(period).await;
            }
        };
        self.tasks
            .blink
            .set(tokio::spawn(task.instrument(debug_span!("lap_blink"))));
    }

    /// Which tasks are alive right now.
    pub fn task_status(&self) -> TaskStatus {
        TaskStatus {
            handler: self.tasks.handler.is_running(),
            render: self.tasks.render.is_running(),
            replay: self.tasks.replay.is_running(),
            blink: self.tasks.blink.is_running(),
        }
    }

    // ------------------------------------------------------------------------
    // Readers
    // ------------------------------------------------------------------------

    /// Snapshot of everything observable.
    pub fn snapshot(&self) -> ChronoSnapshot {
        self.shared.snapshot()
    }

    /// Sequential read into `buf` (exactly one record).
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.shared.read(buf)
    }

    /// Next sequential-read record.
    pub fn next_record(&self) -> ReadRecord {
        self.shared.next_record()
    }

    /// Reads one full pass of the lap stream.
    pub fn drain_pass(&self) -> StreamPass {
        self.shared.drain_pass()
    }

    /// `is_running` attribute.
    pub fn is_running_attr(&self) -> String {
        self.shared.is_running_attr()
    }

    /// `current_time` attribute.
    pub fn current_time_attr(&self) -> String {
        self.shared.current_time_attr()
    }

    /// `laps` attribute.
    pub fn laps_attr(&self) -> String {
        self.shared.laps_attr()
    }

    /// `laps_count` attribute.
    pub fn laps_count_attr(&self) -> String {
        self.shared.laps_count_attr()
    }

    /// `laps_mode` attribute.
    pub fn laps_mode_attr(&self) -> String {
        self.shared.laps_mode_attr()
    }

    /// Stores the `laps_mode` attribute.
    pub fn store_laps_mode(&self, input: &str) -> Result<usize> {
        self.shared.store_laps_mode(input)
    }

    // ------------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------------

    /// Stops everything.
    ///
    /// Detaches the deferred handler, then in order: force-stops the engine,
    /// cancels the render worker, the replay stepper and the blink, and
    /// clears the ledger. Finally blanks the display and switches every
    /// indicator off.
    #[instrument(skip_all)]
    pub async fn shutdown(&self) {
        info!("chronometer shutting down");
        self.tasks.handler.cancel().await;

        let was_running = self
            .shared
            .with_state_at(|state, now_ns| state.force_stop(now_ns));
        self.tasks.render.cancel().await;
        self.tasks.replay.cancel().await;
        self.tasks.blink.cancel().await;
        self.shared.with_state(ChronoState::teardown);

        self.shared.blank_display();
        self.shared.leds_off();
        info!(was_running, "chronometer shut down");
    }
}
