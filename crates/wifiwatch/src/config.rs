//! CLI configuration: thin wrapper around `wifiwatch_config` shared types.
//!
//! Re-exports the shared types and adds the `--config` path override.

use std::path::PathBuf;

use crate::cli::GlobalOpts;

// ── Re-exports from shared crate ────────────────────────────────────

pub use wifiwatch_config::{
    Config, ConfigError, LogFormat, LogSection, config_path, load_config, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: `--config` / `WIFIWATCH_CONFIG`, else the
/// platform default.
pub fn active_config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}
