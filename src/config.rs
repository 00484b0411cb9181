//! Configuration for wtconsole.
//!
//! Loaded from `~/.wtconsole/config.toml`; every field is optional:
//!
//! ```toml
//! # Standard stream to attach to: input, output, error
//! stream = "output"
//!
//! # Character used by --clear
//! fill_char = " "
//!
//! # Window title while the session is open (optional)
//! title = "wtconsole"
//!
//! [colors]
//! foreground = "light green"
//! background = "black"
//!
//! [cursor]
//! size = 100
//! visible = false
//!
//! [log]
//! level = "info"       # EnvFilter syntax, e.g. "wtconsole=debug"
//! file = "C:/temp/wtconsole.log"
//! ```
//!
//! Color names are checked when they are applied, so a bad name surfaces
//! as `UnknownColor` from the session rather than as a parse error here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::core::geometry::CursorState;
use crate::core::port::StreamKind;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not determine config path")]
    NoHome,
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Standard stream the session attaches to
    pub stream: StreamKind,
    /// Fill character for clearing the screen
    pub fill_char: char,
    /// Window title to set
    pub title: Option<String>,
    pub colors: ColorConfig,
    /// Cursor shape to apply; left alone when unset
    pub cursor: Option<CursorState>,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stream: StreamKind::Output,
            fill_char: ' ',
            title: None,
            colors: ColorConfig::default(),
            cursor: None,
            log: LogConfig::default(),
        }
    }
}

/// Text colors, by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub foreground: Option<String>,
    pub background: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// Log file; defaults to `~/.wtconsole/wtconsole.log`
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to
    /// defaults when the file is missing or malformed.
    pub fn load() -> Self {
        Self::load_or_default(Self::get_config_path().as_deref())
    }

    /// Like `load`, but reports a malformed or unreadable file.
    /// A missing file still yields the defaults.
    pub fn try_load() -> Result<Self, ConfigError> {
        Self::try_load_at(Self::get_config_path().as_deref())
    }

    fn try_load_at(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::load_from(path),
            _ => Ok(Self::default()),
        }
    }

    fn load_or_default(path: Option<&Path>) -> Self {
        Self::try_load_at(path).unwrap_or_else(|e| {
            warn!("Ignoring config file: {}", e);
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::get_config_path().ok_or(ConfigError::NoHome)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get config file path
    pub fn get_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Log file path, from the config or next to the config file
    pub fn log_path(&self) -> PathBuf {
        self.log
            .file
            .clone()
            .or_else(|| Self::config_dir().map(|dir| dir.join("wtconsole.log")))
            .unwrap_or_else(|| PathBuf::from("wtconsole.log"))
    }

    fn config_dir() -> Option<PathBuf> {
        let dir = home_dir()?.join(".wtconsole");
        if !dir.exists() {
            let _ = fs::create_dir_all(&dir);
        }
        Some(dir)
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.stream, StreamKind::Output);
        assert_eq!(config.fill_char, ' ');
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(
            r#"
            stream = "error"
            fill_char = "."
            title = "nightly build"

            [colors]
            foreground = "Light Green"
            background = "black"

            [cursor]
            size = 100
            visible = false

            [log]
            level = "wtconsole=debug"
            file = "console.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.stream, StreamKind::Error);
        assert_eq!(config.fill_char, '.');
        assert_eq!(config.title.as_deref(), Some("nightly build"));
        assert_eq!(config.colors.foreground.as_deref(), Some("Light Green"));
        assert_eq!(config.cursor, Some(CursorState::new(100, false)));
        assert_eq!(config.log.level, "wtconsole=debug");
        assert_eq!(config.log_path(), PathBuf::from("console.log"));
    }

    #[test]
    fn test_partial_tables_keep_defaults() {
        let config = Config::from_toml_str("[colors]\nbackground = \"blue\"\n").unwrap();
        assert_eq!(config.colors.foreground, None);
        assert_eq!(config.colors.background.as_deref(), Some("blue"));
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_bad_stream_is_parse_error() {
        let err = Config::from_toml_str("stream = \"console\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!("wtconsole-config-{}.toml", std::process::id()));
        let mut config = Config::default();
        config.title = Some("saved".to_string());
        config.cursor = Some(CursorState::new(50, true));

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("wtconsole-malformed-{}.toml", std::process::id()));
        fs::write(&path, "stream = [\n").unwrap();
        let malformed = Config::load_or_default(Some(&path));
        let strict = Config::try_load_at(Some(&path));
        let _ = fs::remove_file(&path);

        assert_eq!(malformed, Config::default());
        assert!(matches!(strict, Err(ConfigError::Parse(_))));

        let missing = std::env::temp_dir().join("wtconsole-does-not-exist.toml");
        assert_eq!(Config::load_or_default(Some(&missing)), Config::default());
        assert_eq!(Config::load_or_default(None), Config::default());
    }

    #[test]
    fn test_load_reads_existing_file() {
        let path = std::env::temp_dir().join(format!("wtconsole-load-{}.toml", std::process::id()));
        fs::write(&path, "fill_char = \"#\"\n").unwrap();
        let config = Config::load_or_default(Some(&path));
        let _ = fs::remove_file(&path);

        assert_eq!(config.fill_char, '#');
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let path = std::env::temp_dir().join("wtconsole-does-not-exist.toml");
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Read { .. })));
    }
}
