//! Persisted user preferences
//!
//! A flat JSON record: click rate and hotkey per button plus the sound
//! toggle. Older files carry a single `cps` shared by both buttons; it is
//! still read, and per-button rates take precedence when both are present.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::keys::parse_key;
use crate::{ClickerError, MouseButton};

pub const DEFAULT_CPS: f64 = 10.0;
/// Slowest accepted rate, one click every 1000 seconds
pub const MIN_CPS: f64 = 0.001;
pub const DEFAULT_LEFT_HOTKEY: &str = "f6";
pub const DEFAULT_RIGHT_HOTKEY: &str = "f7";

pub fn default_hotkey(button: MouseButton) -> &'static str {
    match button {
        MouseButton::Left => DEFAULT_LEFT_HOTKEY,
        MouseButton::Right => DEFAULT_RIGHT_HOTKEY,
    }
}

/// User preferences
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preferences {
    pub left_cps: f64,
    pub right_cps: f64,
    pub left_hotkey: String,
    pub right_hotkey: String,
    pub sound_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            left_cps: DEFAULT_CPS,
            right_cps: DEFAULT_CPS,
            left_hotkey: default_hotkey(MouseButton::Left).to_string(),
            right_hotkey: default_hotkey(MouseButton::Right).to_string(),
            sound_enabled: true,
        }
    }
}

impl Preferences {
    pub fn rate(&self, button: MouseButton) -> f64 {
        match button {
            MouseButton::Left => self.left_cps,
            MouseButton::Right => self.right_cps,
        }
    }

    /// Callers validate with [`parse_rate`] first
    pub fn set_rate(&mut self, button: MouseButton, cps: f64) {
        match button {
            MouseButton::Left => self.left_cps = cps,
            MouseButton::Right => self.right_cps = cps,
        }
    }

    pub fn hotkey(&self, button: MouseButton) -> &str {
        match button {
            MouseButton::Left => &self.left_hotkey,
            MouseButton::Right => &self.right_hotkey,
        }
    }

    pub fn set_hotkey(&mut self, button: MouseButton, key: impl Into<String>) {
        match button {
            MouseButton::Left => self.left_hotkey = key.into(),
            MouseButton::Right => self.right_hotkey = key.into(),
        }
    }
}

/// On-disk shape. Every field is optional so absent ones keep their default.
#[derive(Deserialize)]
struct PreferencesFile {
    #[serde(default)]
    cps: Option<f64>,
    #[serde(default)]
    left_cps: Option<f64>,
    #[serde(default)]
    right_cps: Option<f64>,
    #[serde(default)]
    left_hotkey: Option<String>,
    #[serde(default)]
    right_hotkey: Option<String>,
    #[serde(default)]
    sound_enabled: Option<bool>,
}

impl PreferencesFile {
    /// Merge present fields over the defaults. Invalid fields are dropped
    /// and returned as warnings.
    fn into_preferences(self) -> (Preferences, Vec<ClickerError>) {
        let mut prefs = Preferences::default();
        let mut warnings = Vec::new();

        let rates = [
            (MouseButton::Left, self.left_cps.or(self.cps)),
            (MouseButton::Right, self.right_cps.or(self.cps)),
        ];
        for (button, cps) in rates {
            match cps {
                Some(cps) if is_valid_rate(cps) => prefs.set_rate(button, cps),
                Some(cps) => warnings.push(ClickerError::InvalidRate(cps.to_string())),
                None => {}
            }
        }

        let hotkeys = [
            (MouseButton::Left, self.left_hotkey),
            (MouseButton::Right, self.right_hotkey),
        ];
        for (button, hotkey) in hotkeys {
            if let Some(hotkey) = hotkey {
                match parse_key(&hotkey) {
                    Ok(_) => prefs.set_hotkey(button, hotkey.trim().to_lowercase()),
                    Err(e) => warnings.push(e),
                }
            }
        }

        if let Some(sound_enabled) = self.sound_enabled {
            prefs.sound_enabled = sound_enabled;
        }

        (prefs, warnings)
    }
}

fn is_valid_rate(cps: f64) -> bool {
    cps.is_finite() && cps >= MIN_CPS
}

/// Parse a user-entered click rate
///
/// Rejects anything that is not a finite number of at least [`MIN_CPS`].
pub fn parse_rate(input: &str) -> Result<f64, ClickerError> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(cps) if is_valid_rate(cps) => Ok(cps),
        _ => Err(ClickerError::InvalidRate(trimmed.to_string())),
    }
}

/// Result of loading the preferences file
#[derive(Debug)]
pub struct Loaded {
    pub preferences: Preferences,
    /// Fields that were present but invalid, reset to their default
    pub warnings: Vec<ClickerError>,
}

/// Reads and writes the preferences file
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences. A missing file yields the defaults.
    pub fn load(&self) -> Result<Loaded, ClickerError> {
        if !self.path.exists() {
            info!("No preferences at {:?}, using defaults", self.path);
            return Ok(Loaded {
                preferences: Preferences::default(),
                warnings: Vec::new(),
            });
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| self.load_error(e))?;
        let file: PreferencesFile =
            serde_json::from_str(&contents).map_err(|e| self.load_error(e))?;
        let (preferences, warnings) = file.into_preferences();

        for warning in &warnings {
            warn!("Ignoring preference: {}", warning);
        }
        debug!("Loaded preferences: {:?}", preferences);

        Ok(Loaded {
            preferences,
            warnings,
        })
    }

    /// Overwrite the file with the full record
    pub fn save(&self, preferences: &Preferences) -> Result<(), ClickerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.save_error(e))?;
            }
        }

        let json = serde_json::to_string_pretty(preferences).map_err(|e| self.save_error(e))?;
        fs::write(&self.path, json).map_err(|e| self.save_error(e))?;

        debug!("Saved preferences to {:?}", self.path);
        Ok(())
    }

    fn load_error(&self, reason: impl ToString) -> ClickerError {
        ClickerError::PreferencesLoad {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn save_error(&self, reason: impl ToString) -> ClickerError {
        ClickerError::PreferencesSave {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
