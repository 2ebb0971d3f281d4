//! Task-level tests for the Tokio service layer.
//!
//! All tests run on Tokio's paused clock, so render, replay and blink
//! periods advance deterministically with `sleep`.

use std::time::Duration;

use rs_chrono::config::ChronoConfig;
use rs_chrono::hal::{MockButtons, MockDisplay, MockLeds, TokioClock};
use rs_chrono::services::Chronometer;
use rs_chrono::{ButtonEvent, ChronoTime, Indicator, LapMode};

type TestChrono = Chronometer<TokioClock, MockDisplay, MockLeds>;

fn chrono_with(config: &ChronoConfig) -> TestChrono {
    Chronometer::start(config, TokioClock::new(), MockDisplay::new(), MockLeds::new())
}

fn chrono() -> TestChrono {
    chrono_with(&ChronoConfig::default())
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

fn secs(s: u8) -> ChronoTime {
    ChronoTime::new(0, s, 0).unwrap()
}

fn shown(chrono: &TestChrono) -> Option<ChronoTime> {
    chrono.shared().with_display(|d| d.shown())
}

fn led_on(chrono: &TestChrono, led: Indicator) -> bool {
    chrono.shared().with_leds(|l| l.is_on(led))
}

fn lap_led_changes(chrono: &TestChrono) -> usize {
    chrono.shared().with_leds(|l| l.changes(Indicator::Lap))
}

/// Laps at 10s and 25s, stopped at 30s.
async fn two_laps_stopped(chrono: &TestChrono) {
    chrono.handle_event(ButtonEvent::ToggleRun);
    sleep_ms(10_000).await;
    chrono.handle_event(ButtonEvent::CaptureLap);
    sleep_ms(15_000).await;
    chrono.handle_event(ButtonEvent::CaptureLap);
    sleep_ms(5_000).await;
    chrono.handle_event(ButtonEvent::ToggleRun);
}

// ============================================================================
// Startup Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn start_blanks_outputs() {
    let chrono = chrono();
    assert!(chrono.shared().with_display(|d| d.is_blank()));
    assert_eq!(chrono.shared().with_leds(|l| l.register), 0);
    assert_eq!(chrono.is_running_attr(), "0\n");
    chrono.shutdown().await;
}

// ============================================================================
// Render Worker Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn live_time_rendered_while_running() {
    let chrono = chrono();
    chrono.handle_event(ButtonEvent::ToggleRun);
    assert!(led_on(&chrono, Indicator::Running));

    sleep_ms(1_255).await;
    assert_eq!(shown(&chrono), ChronoTime::new(0, 1, 25));

    chrono.handle_event(ButtonEvent::ToggleRun);
    sleep_ms(50).await;
    assert!(!chrono.task_status().render);
    assert!(!led_on(&chrono, Indicator::Running));
    assert_eq!(shown(&chrono), ChronoTime::new(0, 1, 25));
    chrono.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn forced_stop_at_maximum() {
    let config = ChronoConfig::default().with_render_interval_ms(60_000);
    let chrono = chrono_with(&config);
    chrono.handle_event(ButtonEvent::ToggleRun);

    sleep_ms(6_001_000).await;
    assert_eq!(chrono.is_running_attr(), "0\n");
    assert_eq!(chrono.current_time_attr(), "99:59.99\n");
    assert_eq!(shown(&chrono), Some(ChronoTime::MAX));
    assert!(!led_on(&chrono, Indicator::Running));
    assert!(!chrono.task_status().render);
    chrono.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn restart_after_stop_spawns_new_worker() {
    let chrono = chrono();
    chrono.handle_event(ButtonEvent::ToggleRun);
    sleep_ms(1_000).await;
    chrono.handle_event(ButtonEvent::ToggleRun);
    sleep_ms(50).await;
    assert!(!chrono.task_status().render);

    chrono.handle_event(ButtonEvent::ToggleRun);
    assert!(chrono.task_status().render);
    sleep_ms(2_005).await;
    assert_eq!(shown(&chrono), ChronoTime::new(0, 3, 0));
    chrono.shutdown().await;
}

// ============================================================================
// Replay Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn replay_steps_every_three_seconds() {
    let chrono = chrono();
    two_laps_stopped(&chrono).await;

    chrono.handle_event(ButtonEvent::ToggleReplay);
    sleep_ms(1).await;
    assert_eq!(shown(&chrono), Some(secs(10)));
    assert!(led_on(&chrono, Indicator::Replay));

    sleep_ms(2_900).await;
    assert_eq!(shown(&chrono), Some(secs(10)));

    sleep_ms(100).await;
    assert_eq!(shown(&chrono), Some(secs(25)));

    sleep_ms(3_000).await;
    assert_eq!(shown(&chrono), Some(secs(30)));
    assert!(!led_on(&chrono, Indicator::Replay));
    assert!(!chrono.snapshot().replaying);
    assert!(!chrono.task_status().replay);
    chrono.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn replay_in_split_mode() {
    let chrono = chrono();
    chrono.store_laps_mode("1").unwrap();
    two_laps_stopped(&chrono).await;

    chrono.handle_event(ButtonEvent::ToggleReplay);
    sleep_ms(1).await;
    assert_eq!(shown(&chrono), Some(secs(10)));
    sleep_ms(3_000).await;
    assert_eq!(shown(&chrono), Some(secs(15)));
    assert_eq!(chrono.snapshot().mode, LapMode::Split);
    chrono.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn replay_early_exit_cancels_stepper() {
    let chrono = chrono();
    two_laps_stopped(&chrono).await;

    chrono.handle_event(ButtonEvent::ToggleReplay);
    sleep_ms(1_000).await;
    chrono.handle_event(ButtonEvent::ToggleReplay);

    assert_eq!(shown(&chrono), Some(secs(30)));
    assert!(!led_on(&chrono, Indicator::Replay));
    assert!(!chrono.task_status().replay);

    // No stale tick lands afterwards
    sleep_ms(10_000).await;
    assert_eq!(shown(&chrono), Some(secs(30)));
    chrono.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn render_worker_yields_during_replay() {
    let chrono = chrono();
    chrono.handle_event(ButtonEvent::ToggleRun);
    sleep_ms(10_000).await;
    chrono.handle_event(ButtonEvent::CaptureLap);

    chrono.handle_event(ButtonEvent::ToggleReplay);
    sleep_ms(1_000).await;
    assert_eq!(shown(&chrono), Some(secs(10)));
    assert!(chrono.task_status().render);

    sleep_ms(2_500).await;
    assert!(!chrono.snapshot().replaying);
    let live = shown(&chrono).unwrap();
    assert!(live >= ChronoTime::new(0, 13, 0).unwrap());
    chrono.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn reset_during_replay_clears_after_end() {
    let chrono = chrono();
    two_laps_stopped(&chrono).await;

    chrono.handle_event(ButtonEvent::ToggleReplay);
    sleep_ms(1).await;
    chrono.handle_event(ButtonEvent::Reset);
    assert_eq!(chrono.laps_count_attr(), "3\n");
    assert_eq!(chrono.current_time_attr(), "00:00.00\n");

    // Two more laps to show, then the end tick
    sleep_ms(6_000).await;
    assert_eq!(shown(&chrono), Some(secs(30)));
    assert_eq!(chrono.laps_count_attr(), "3\n");

    sleep_ms(3_000).await;
    assert_eq!(chrono.laps_count_attr(), "0\n");
    assert!(chrono.shared().with_display(|d| d.is_blank()));
    assert!(!chrono.snapshot().pending_clear);
    chrono.shutdown().await;
}

// ============================================================================
// Blink Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn lap_blinks_ten_toggles() {
    let chrono = chrono();
    // Startup switches every LED off once
    let baseline = lap_led_changes(&chrono);
    assert_eq!(baseline, 1);
    assert_eq!(chrono.shared().with_leds(|l| l.times_lit(Indicator::Lap)), 0);

    chrono.handle_event(ButtonEvent::ToggleRun);
    chrono.handle_event(ButtonEvent::CaptureLap);
    sleep_ms(1).await;
    assert!(led_on(&chrono, Indicator::Lap));

    sleep_ms(2_100).await;
    assert!(!led_on(&chrono, Indicator::Lap));
    assert!(!chrono.task_status().blink);
    let changes = lap_led_changes(&chrono) - baseline;
    let lit = chrono.shared().with_leds(|l| l.times_lit(Indicator::Lap));
    // Ten toggles plus the final switch-off
    assert_eq!(changes, 11);
    assert_eq!(lit, 5);
    chrono.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn capture_while_blinking_rearms() {
    let chrono = chrono();
    let baseline = lap_led_changes(&chrono);
    chrono.handle_event(ButtonEvent::ToggleRun);
    chrono.handle_event(ButtonEvent::CaptureLap);
    sleep_ms(900).await;

    chrono.handle_event(ButtonEvent::CaptureLap);
    assert_eq!(chrono.shared().with_state(|s| s.blink().remaining()), 10);

    sleep_ms(3_000).await;
    assert!(!chrono.task_status().blink);
    assert!(!led_on(&chrono, Indicator::Lap));
    // Five toggles, ten more after the re-arm, one switch-off
    assert_eq!(lap_led_changes(&chrono) - baseline, 16);
    chrono.shutdown().await;
}

// ============================================================================
// Interrupt Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn interrupt_line_drives_handler() {
    let chrono = chrono();
    let buttons = MockButtons::new();
    chrono.spawn_deferred_handler(buttons.clone()).unwrap();
    let line = chrono.interrupt_line();

    buttons.press(ButtonEvent::ToggleRun);
    assert!(line.raise());
    sleep_ms(1).await;
    assert_eq!(chrono.is_running_attr(), "1\n");
    assert_eq!(buttons.ack_count(), 1);

    sleep_ms(500).await;
    buttons.press(ButtonEvent::CaptureLap);
    line.raise();
    sleep_ms(1).await;
    assert_eq!(chrono.laps_count_attr(), "1\n");

    // Two keys at once are acknowledged and ignored
    buttons.latch(0x5);
    line.raise();
    sleep_ms(1).await;
    assert_eq!(buttons.ack_count(), 3);
    assert_eq!(chrono.is_running_attr(), "1\n");
    assert!(!chrono.snapshot().replaying);
    chrono.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn interrupt_queue_coalesces_when_full() {
    let config = ChronoConfig::default().with_irq_queue_depth(2);
    let chrono = chrono_with(&config);
    let line = chrono.interrupt_line();

    // No handler yet, so nothing drains the queue
    assert!(line.raise());
    assert!(line.raise());
    assert!(!line.raise());

    let buttons = MockButtons::new();
    buttons.press(ButtonEvent::ToggleRun);
    chrono.spawn_deferred_handler(buttons.clone()).unwrap();
    sleep_ms(1).await;

    // One edge, consumed by the first activation; the second finds nothing
    assert_eq!(chrono.is_running_attr(), "1\n");
    assert_eq!(buttons.ack_count(), 2);
    chrono.shutdown().await;
}

// ============================================================================
// Reader Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn drain_pass_reports_live_time() {
    let chrono = chrono();
    two_laps_stopped(&chrono).await;

    let pass = chrono.drain_pass();
    assert_eq!(pass.current, secs(30));
    assert_eq!(pass.laps, [secs(10), secs(25)]);
    assert_eq!(chrono.drain_pass(), pass);
    assert_eq!(chrono.laps_attr(), "00:10.00\n00:25.00\n");
    chrono.shutdown().await;
}

// ============================================================================
// Teardown Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn shutdown_closes_interrupt_line() {
    let chrono = chrono();
    chrono.spawn_deferred_handler(MockButtons::new()).unwrap();
    let line = chrono.interrupt_line();
    chrono.handle_event(ButtonEvent::ToggleRun);
    chrono.handle_event(ButtonEvent::CaptureLap);
    sleep_ms(100).await;

    chrono.shutdown().await;
    assert!(line.is_closed());
    assert!(!line.raise());
    assert_eq!(chrono.laps_count_attr(), "0\n");
    assert_eq!(chrono.shared().with_leds(|l| l.register), 0);
    assert!(chrono.shared().with_display(|d| d.is_blank()));
}
