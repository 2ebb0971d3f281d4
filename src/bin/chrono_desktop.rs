//! Desktop chronometer harness.
//!
//! Keys are typed on stdin and go through the same interrupt path as real
//! hardware: the key is latched into the edge register, the interrupt line
//! is raised and the deferred handler picks it up. Display and LED changes
//! are logged at `trace`.
//!
//! ```bash
//! RUST_LOG=rs_chrono=trace cargo run --features desktop --bin chrono_desktop
//! ```
//!
//! Commands:
//!
//! - `run`, `lap`, `replay`, `reset` - press a key
//! - `read` - drain one pass of the sequential reader
//! - `laps`, `count` - lap attributes
//! - `mode [0|1]` - show or set the lap display mode
//! - `quit` - shut down

use rs_chrono::config::Config;
use rs_chrono::hal::{SharedRegisterButtons, TokioClock, TracingDisplay, TracingLeds};
use rs_chrono::services::Chronometer;
use rs_chrono::ButtonEvent;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::default();
    info!(
        name = config.device.name.as_str(),
        id = config.device.id.as_str(),
        "starting desktop chronometer"
    );

    let chrono = Chronometer::start(
        &config.chrono,
        TokioClock::new(),
        TracingDisplay::new(),
        TracingLeds::new(),
    );

    let buttons = SharedRegisterButtons::new();
    chrono.spawn_deferred_handler(buttons.clone())?;
    let line = chrono.interrupt_line();

    #[cfg(feature = "web")]
    if config.web.enabled {
        use rs_chrono::services::{run_server, WebServerConfig};

        let shared = std::sync::Arc::clone(chrono.shared());
        let web = WebServerConfig::from_config(&config.web);
        tokio::spawn(async move {
            if let Err(err) = run_server(shared, web).await {
                warn!(%err, "web server stopped");
            }
        });
    }

    println!("commands: run, lap, replay, reset, read, laps, count, mode [0|1], quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(input) = lines.next_line().await? {
        let mut words = input.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };

        if let Some(event) = ButtonEvent::from_text(command) {
            buttons.press(event);
            line.raise();
            continue;
        }

        match command {
            "read" => {
                let pass = chrono.drain_pass();
                println!("Current time: {}", pass.current);
                for (i, lap) in pass.laps.iter().enumerate() {
                    println!("Lap {}: {lap}", i + 1);
                }
            }
            "laps" => print!("{}", chrono.laps_attr()),
            "count" => print!("{}", chrono.laps_count_attr()),
            "mode" => match words.next() {
                Some(value) => {
                    if let Err(err) = chrono.store_laps_mode(value) {
                        println!("{err}");
                    }
                }
                None => print!("{}", chrono.laps_mode_attr()),
            },
            "quit" | "exit" => break,
            other => warn!(command = other, "unknown command"),
        }
    }

    chrono.shutdown().await;
    Ok(())
}
