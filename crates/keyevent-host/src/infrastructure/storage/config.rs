//! TOML-based configuration for the key event host.
//!
//! Reads and writes `AppConfig` from an explicit path or from the
//! platform-appropriate config file:
//! - Windows:  `%APPDATA%\KeyEventHost\config.toml`
//! - Linux:    `~/.config/keyevent-host/config.toml`
//! - macOS:    `~/Library/Application Support/KeyEventHost/config.toml`
//!
//! ```toml
//! [channel]
//! name = "flutter/keyevent"
//! max_pending_events = 1000
//!
//! [logging]
//! level = "info"
//!
//! [responder]
//! handled_key_codes = [0x41, 0x0D]
//! ```
//!
//! Every section and field has a serde default, so a partial file (or no file
//! at all) still produces a complete configuration.

use std::path::{Path, PathBuf};

use keyevent_core::pending::DEFAULT_MAX_PENDING_EVENTS;
use keyevent_core::{KeyEventOptions, CHANNEL_NAME};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Failure while locating, reading or writing the host configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither an explicit path nor a platform config directory is available.
    #[error("no config path given and the platform config directory is unknown")]
    NoPlatformConfigDir,

    #[error("cannot access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot encode config as TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level host configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub responder: ResponderConfig,
}

/// Key event channel settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelConfig {
    /// Channel the key events are sent on.
    #[serde(default = "default_channel_name")]
    pub name: String,
    /// Outstanding-event count above which a backlog warning is logged.
    #[serde(default = "default_max_pending_events")]
    pub max_pending_events: usize,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset, e.g. `"debug"` or
    /// `"keyevent_core=trace,info"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Behaviour of the in-process framework stand-in used by replay.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponderConfig {
    /// Virtual-key codes whose key downs the stand-in reports as handled.
    #[serde(default)]
    pub handled_key_codes: Vec<i32>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_channel_name() -> String {
    CHANNEL_NAME.to_string()
}
fn default_max_pending_events() -> usize {
    DEFAULT_MAX_PENDING_EVENTS
}
fn default_log_level() -> String {
    String::from("info")
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: default_channel_name(),
            max_pending_events: default_max_pending_events(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl From<&ChannelConfig> for KeyEventOptions {
    fn from(channel: &ChannelConfig) -> Self {
        KeyEventOptions {
            channel_name: channel.name.clone(),
            max_pending_events: channel.max_pending_events,
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Default location of `config.toml` for the current user.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the environment does not
/// reveal a per-user config directory (e.g. `HOME` is unset).
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads `AppConfig` from `path`, or from the platform config file when
/// `path` is `None`.
///
/// A file that does not exist yields `AppConfig::default()`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read,
/// [`ConfigError::Parse`] for invalid TOML, and
/// [`ConfigError::NoPlatformConfigDir`] if no path is given and the platform
/// directory is unknown.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config_file_path()?,
    };
    load_config_from(&path)
}

fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found; using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Serialize`] if `config` has no TOML form and
/// [`ConfigError::Io`] if the directory or file cannot be written.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    let text = toml::to_string_pretty(config)?;
    let io_error = |at: &Path| {
        let at = at.to_path_buf();
        move |source: std::io::Error| ConfigError::Io { path: at, source }
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    std::fs::write(path, text).map_err(io_error(path))
}

/// Per-user config directory for this host, without the file name.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("KeyEventHost"))
    }

    #[cfg(target_os = "linux")]
    {
        let xdg = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
        let home = || std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"));
        xdg.or_else(home).map(|base| base.join("keyevent-host"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("KeyEventHost")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
