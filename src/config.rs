//! Runtime configuration for Bedrock Clicker

use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;

/// Default preferences file, resolved against the working directory
pub const DEFAULT_PREFERENCES_FILE: &str = "autoclicker_config.json";

/// Click injection backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// X11 XTest extension
    X11,
    /// ydotool via uinput (works on Wayland)
    Ydotool,
    /// rdev simulate
    Rdev,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::X11 => "x11",
            Backend::Ydotool => "ydotool",
            Backend::Rdev => "rdev",
        };
        f.write_str(name)
    }
}

/// Configuration for the auto-clicker process
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the JSON preferences file
    pub preferences_path: PathBuf,

    /// Backend used to inject clicks
    pub backend: Backend,

    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preferences_path: PathBuf::from(DEFAULT_PREFERENCES_FILE),
            backend: Backend::X11,
            verbose: false,
        }
    }
}

impl Config {
    /// Use a custom preferences file
    pub fn with_preferences_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.preferences_path = path.into();
        self
    }

    /// Use a different click backend
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Enable verbose logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_preferences_path("/tmp/prefs.json")
            .with_backend(Backend::Ydotool)
            .with_verbose(true);

        assert_eq!(config.preferences_path, PathBuf::from("/tmp/prefs.json"));
        assert_eq!(config.backend, Backend::Ydotool);
        assert!(config.verbose);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.preferences_path, PathBuf::from(DEFAULT_PREFERENCES_FILE));
        assert_eq!(config.backend, Backend::X11);
        assert!(!config.verbose);
    }
}
