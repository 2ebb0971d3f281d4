//! Async service layer for the chronometer.
//!
//! This module runs the chronometer on Tokio:
//! - `shared`: the single lock-guarded state plus clock and sinks
//! - `irq`: bounded interrupt hand-off to the deferred handler
//! - `chronometer`: task ownership (deferred handler, render worker, replay
//!   stepper, lap blink) and ordered teardown
//! - `attributes`: text attributes (`is_running`, `current_time`, `laps`, ...)
//! - `web` feature: Axum-based HTTP surface serving the same data as JSON
//!
//! # Shared State Pattern
//!
//! Every task holds an `Arc<SharedChrono<C, D, L>>`:
//!
//! ```ignore
//! use rs_chrono::services::Chronometer;
//!
//! let chrono = Chronometer::start(&config, clock, display, leds);
//! chrono.spawn_deferred_handler(buttons)?;
//!
//! // Interrupt context
//! chrono.interrupt_line().raise();
//!
//! // Web reads the same state
//! let router = build_router(Arc::clone(chrono.shared()), &web_config);
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod attributes;
pub mod chronometer;
pub mod irq;
pub mod shared;

// API types are only needed by the HTTP surface
#[cfg(feature = "web")]
pub mod api;

#[cfg(feature = "web")]
pub mod web;

// Re-exports
pub use chronometer::*;
pub use irq::*;
pub use shared::*;

#[cfg(feature = "web")]
pub use api::*;

#[cfg(feature = "web")]
pub use web::*;

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
