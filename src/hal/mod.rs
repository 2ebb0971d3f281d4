//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `host`: std-backed clock, logging display/LEDs and a shared key register (requires `std` feature)

pub mod mock;

#[cfg(feature = "std")]
pub mod host;

pub use mock::*;

#[cfg(feature = "std")]
pub use host::*;
