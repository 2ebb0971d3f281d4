//! Button events and edge register decoding.
//!
//! Four keys drive the chronometer. The edge register latches one bit per
//! key; an activation is recognized only when exactly one known bit is set.
//!
//! ```rust
//! use rs_chrono::ButtonEvent;
//!
//! assert_eq!(ButtonEvent::from_edges(0x1), Some(ButtonEvent::ToggleRun));
//! assert_eq!(ButtonEvent::from_edges(0x8), Some(ButtonEvent::Reset));
//!
//! // Simultaneous presses are not recognized
//! assert_eq!(ButtonEvent::from_edges(0x3), None);
//! ```

use crate::traits::{KEY_LAP, KEY_REPLAY, KEY_RESET, KEY_RUN};

/// A logical button press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ButtonEvent {
    /// Start if stopped, stop if running.
    ToggleRun,
    /// Record the current elapsed time as a lap (only while running).
    CaptureLap,
    /// Enter or leave lap replay on the display.
    ToggleReplay,
    /// Zero the stopwatch and drop the laps (only while stopped).
    Reset,
}

impl ButtonEvent {
    /// All events in key order.
    pub const ALL: [ButtonEvent; 4] = [
        ButtonEvent::ToggleRun,
        ButtonEvent::CaptureLap,
        ButtonEvent::ToggleReplay,
        ButtonEvent::Reset,
    ];

    /// Decodes a latched edge register value.
    ///
    /// Returns `None` for zero, for unknown bits, and for more than one key
    /// at once.
    pub const fn from_edges(edges: u32) -> Option<Self> {
        match edges {
            KEY_RUN => Some(ButtonEvent::ToggleRun),
            KEY_LAP => Some(ButtonEvent::CaptureLap),
            KEY_REPLAY => Some(ButtonEvent::ToggleReplay),
            KEY_RESET => Some(ButtonEvent::Reset),
            _ => None,
        }
    }

    /// The key bit that produces this event.
    pub const fn key_bit(self) -> u32 {
        match self {
            ButtonEvent::ToggleRun => KEY_RUN,
            ButtonEvent::CaptureLap => KEY_LAP,
            ButtonEvent::ToggleReplay => KEY_REPLAY,
            ButtonEvent::Reset => KEY_RESET,
        }
    }

    /// Returns the event name as a lowercase string.
    pub const fn as_str(self) -> &'static str {
        match self {
            ButtonEvent::ToggleRun => "run",
            ButtonEvent::CaptureLap => "lap",
            ButtonEvent::ToggleReplay => "replay",
            ButtonEvent::Reset => "reset",
        }
    }

    /// Parse an event from text input.
    ///
    /// Accepts names, aliases and key numbers:
    /// - `"run"`, `"start"`, `"stop"`, `"1"`
    /// - `"lap"`, `"2"`
    /// - `"replay"`, `"list"`, `"3"`
    /// - `"reset"`, `"4"`
    ///
    /// Input is trimmed and case-insensitive.
    ///
    /// ```
    /// use rs_chrono::ButtonEvent;
    ///
    /// assert_eq!(ButtonEvent::from_text(" Start "), Some(ButtonEvent::ToggleRun));
    /// assert_eq!(ButtonEvent::from_text("3"), Some(ButtonEvent::ToggleReplay));
    /// assert_eq!(ButtonEvent::from_text("pause"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        let s = s.trim();
        let matches = |names: &[&str]| names.iter().any(|n| n.eq_ignore_ascii_case(s));
        if matches(&["run", "start", "stop", "1"]) {
            Some(ButtonEvent::ToggleRun)
        } else if matches(&["lap", "2"]) {
            Some(ButtonEvent::CaptureLap)
        } else if matches(&["replay", "list", "3"]) {
            Some(ButtonEvent::ToggleReplay)
        } else if matches(&["reset", "4"]) {
            Some(ButtonEvent::Reset)
        } else {
            None
        }
    }
}
