//! Shared configuration for wifiwatch tools.
//!
//! One TOML file layered under `WIFIWATCH_*` environment overrides, plus
//! translation of the `[location]` section into the core's
//! [`LocationPrompt`]. The CLI adds its `--config` override on top.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wifiwatch_core::{LocationPrompt, SignalLevel};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub signal: SignalSection,

    #[serde(default)]
    pub affinity: AffinitySection,

    #[serde(default)]
    pub log: LogSection,

    #[serde(default)]
    pub location: LocationSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SignalSection {
    /// Number of levels RSSI readings are classified into.
    #[serde(default = "default_levels")]
    pub levels: u32,
}

impl Default for SignalSection {
    fn default() -> Self {
        Self {
            levels: default_levels(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AffinitySection {
    /// Name of the thread listener teardown runs on.
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

impl Default for AffinitySection {
    fn default() -> Self {
        Self {
            thread_name: default_thread_name(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogSection {
    #[serde(default)]
    pub format: LogFormat,

    /// `tracing` filter directive, e.g. `"wifiwatch_core=debug"`.
    /// `RUST_LOG` still wins when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Text of the prompt shown when location is off.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocationSection {
    #[serde(default = "default_location_title")]
    pub title: String,

    #[serde(default = "default_location_message")]
    pub message: String,
}

impl Default for LocationSection {
    fn default() -> Self {
        let LocationPrompt { title, message } = LocationPrompt::default();
        Self { title, message }
    }
}

impl LocationSection {
    pub fn prompt(&self) -> LocationPrompt {
        LocationPrompt {
            title: self.title.clone(),
            message: self.message.clone(),
        }
    }
}

fn default_levels() -> u32 {
    SignalLevel::COUNT
}
fn default_thread_name() -> String {
    "wifiwatch-affinity".into()
}
fn default_location_title() -> String {
    LocationPrompt::default().title
}
fn default_location_message() -> String {
    LocationPrompt::default().message
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signal.levels == 0 {
            return Err(ConfigError::Validation {
                field: "signal.levels".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.affinity.thread_name.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "affinity.thread_name".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "wifiwatch", "wifiwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wifiwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load and validate the config from `path` + environment.
///
/// A missing file is not an error; defaults and `WIFIWATCH_*` overrides
/// still apply. Nested keys use a double underscore, e.g.
/// `WIFIWATCH_SIGNAL__LEVELS=4`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WIFIWATCH_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Load config, falling back to defaults if it is unreadable or invalid.
pub fn load_config_or_default(path: &Path) -> Config {
    load_config(path).unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
