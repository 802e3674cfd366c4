//! Bedrock Clicker - hotkey-toggled auto-clicker
//!
//! This library provides components for:
//! - Repeat-click loops for the left and right mouse buttons
//! - Input simulation (sending synthetic clicks)
//! - Global keyboard listening and hotkey dispatch
//! - Persisted user preferences

pub mod app;
pub mod clicker;
pub mod config;
pub mod hotkeys;
pub mod input_listener;
pub mod input_simulator;
pub mod keys;
pub mod preferences;
pub mod shell;

pub use app::{App, AppEvent};
pub use clicker::{ClickRate, Clicker};
pub use config::{Backend, Config};
pub use hotkeys::{HotkeyAction, HotkeyDispatcher, KeyEvent};
pub use input_listener::InputListener;
pub use input_simulator::{create_emitter, ClickEmitter};
pub use preferences::{parse_rate, Preferences, PreferencesStore};
pub use shell::{Command, Console, Notify};

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Main error type for Bedrock Clicker
#[derive(Error, Debug)]
pub enum ClickerError {
    #[error("Failed to access input devices: {0}")]
    InputAccess(String),

    #[error("Failed to send input event: {0}")]
    SendEvent(String),

    #[error("Failed to connect to display: {0}")]
    Display(String),

    #[error("Invalid click rate '{0}': must be a number of at least 0.001")]
    InvalidRate(String),

    #[error("Unknown key '{0}'")]
    UnknownKey(String),

    #[error("Modifier key '{0}' cannot be a hotkey on its own")]
    ModifierKey(String),

    #[error("Unknown button '{0}': expected 'left' or 'right'")]
    UnknownButton(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("No hotkey bound for the {0} clicker")]
    NotBound(MouseButton),

    #[error("Key '{key}' is already bound to the {button} clicker")]
    KeyInUse { key: String, button: MouseButton },

    #[error("Failed to load preferences from '{path}': {reason}")]
    PreferencesLoad { path: String, reason: String },

    #[error("Failed to save preferences to '{path}': {reason}")]
    PreferencesSave { path: String, reason: String },

    #[error("Failed to install signal handler: {0}")]
    Signal(String),
}

/// Mouse button driven by one clicker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    pub const ALL: [MouseButton; 2] = [MouseButton::Left, MouseButton::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
        }
    }

    /// Capitalized name for notices
    pub fn label(self) -> &'static str {
        match self {
            MouseButton::Left => "Left",
            MouseButton::Right => "Right",
        }
    }

    /// The other clicker's button
    pub fn other(self) -> Self {
        match self {
            MouseButton::Left => MouseButton::Right,
            MouseButton::Right => MouseButton::Left,
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MouseButton {
    type Err = ClickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" | "l" => Ok(MouseButton::Left),
            "right" | "r" => Ok(MouseButton::Right),
            other => Err(ClickerError::UnknownButton(other.to_string())),
        }
    }
}
