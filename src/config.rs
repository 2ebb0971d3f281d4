//! Chronometer configuration.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use rs_chrono::config::{ChronoConfig, Config, WebConfig};
//! use rs_chrono::LapMode;
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.chrono.replay_interval_ms, 3000);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_chrono(ChronoConfig::default().with_lap_mode(LapMode::Split))
//!     .with_web(WebConfig::default().with_port(3000));
//! ```

use heapless::String as HString;

use crate::chrono::LapMode;

/// Maximum length for short config strings (device names and IDs)
pub const MAX_SHORT_STRING: usize = 64;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    // Cut on a char boundary at or below capacity
    let valid_end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= MAX_SHORT_STRING)
        .last()
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Timing and lap settings
    pub chrono: ChronoConfig,
    /// Device identification
    pub device: DeviceConfig,
    /// Web server configuration
    pub web: WebConfig,
}

impl Config {
    /// Set chronometer configuration
    pub fn with_chrono(mut self, chrono: ChronoConfig) -> Self {
        self.chrono = chrono;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }

    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }
}

// ============================================================================
// Chrono Config
// ============================================================================

/// Timing and lap behavior
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChronoConfig {
    /// Live display refresh period in milliseconds
    pub render_interval_ms: u32,
    /// Time each lap stays on the display during replay, in milliseconds
    pub replay_interval_ms: u32,
    /// Lap LED toggle period in milliseconds
    pub blink_interval_ms: u32,
    /// Number of lap LED toggles after a capture
    pub blink_toggles: u8,
    /// How laps are shown during replay
    pub lap_mode: LapMode,
    /// Pending button activations held between interrupt and handler
    pub irq_queue_depth: usize,
}

impl Default for ChronoConfig {
    fn default() -> Self {
        Self {
            render_interval_ms: 10,
            replay_interval_ms: 3000,
            blink_interval_ms: 200,
            blink_toggles: 10,
            lap_mode: LapMode::Absolute,
            irq_queue_depth: 8,
        }
    }
}

impl ChronoConfig {
    /// Set the render interval (minimum 1 ms)
    pub fn with_render_interval_ms(mut self, ms: u32) -> Self {
        self.render_interval_ms = ms.max(1);
        self
    }

    /// Set the replay step interval (minimum 1 ms)
    pub fn with_replay_interval_ms(mut self, ms: u32) -> Self {
        self.replay_interval_ms = ms.max(1);
        self
    }

    /// Set the blink interval (minimum 1 ms)
    pub fn with_blink_interval_ms(mut self, ms: u32) -> Self {
        self.blink_interval_ms = ms.max(1);
        self
    }

    /// Set the number of blink toggles
    pub fn with_blink_toggles(mut self, toggles: u8) -> Self {
        self.blink_toggles = toggles;
        self
    }

    /// Set the initial lap mode
    pub fn with_lap_mode(mut self, mode: LapMode) -> Self {
        self.lap_mode = mode;
        self
    }

    /// Set the interrupt queue depth (minimum 1)
    pub fn with_irq_queue_depth(mut self, depth: usize) -> Self {
        self.irq_queue_depth = depth.max(1);
        self
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
    /// Whether web server is enabled
    pub enabled: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_permissive: true,
            enabled: true,
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS mode
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Enable or disable web server
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
    /// Device ID
    pub id: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("rs-chrono"),
            id: short_string("chrono0"),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }

    /// Set the device ID
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = short_string(id);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
