//! Trait definitions for hardware abstraction.
//!
//! This module defines the collaborators the chronometer needs so it can
//! run on real hardware, in a desktop harness, or under test:
//!
//! - `hardware`: clock, indicator LEDs, key edge register
//! - `display`: six-digit seven-segment display

pub mod display;
pub mod hardware;

pub use display::*;
pub use hardware::*;
