//! CLI error types with miette diagnostics.
//!
//! Maps `WifiError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use wifiwatch_config::ConfigError;
use wifiwatch_core::WifiError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const SCRIPT: i32 = 4;
    pub const UNAVAILABLE: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wifiwatch::validation))]
    Validation { field: String, reason: String },

    // ── Replay scripts ───────────────────────────────────────────────
    #[error("Could not read replay script {path}")]
    #[diagnostic(
        code(wifiwatch::script),
        help(
            "{reason}\n\
             Scripts are TOML: optional [radio] and [location] tables, then\n\
             one [[step]] per notification, e.g. notification = \"signal-changed\"."
        )
    )]
    Script { path: String, reason: String },

    // ── Runtime ──────────────────────────────────────────────────────
    #[error("WiFi capability unavailable: {reason}")]
    #[diagnostic(code(wifiwatch::unavailable))]
    Unavailable { reason: String },

    #[error("Affinity thread could not be started: {reason}")]
    #[diagnostic(
        code(wifiwatch::affinity),
        help("Check `affinity.thread_name` in your config and the process thread limits.")
    )]
    Affinity { reason: String },

    #[error("Replay failed: {message}")]
    #[diagnostic(code(wifiwatch::runtime))]
    Runtime { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(wifiwatch::config_exists),
        help("Use --force to overwrite it, or edit it directly.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(wifiwatch::config),
        help(
            "Check the config file (see: wifiwatch config path) and any\n\
             WIFIWATCH_* environment variables."
        )
    )]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not serialize output: {0}")]
    #[diagnostic(code(wifiwatch::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not serialize output: {0}")]
    #[diagnostic(code(wifiwatch::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => exit_code::USAGE,
            Self::Script { .. } => exit_code::SCRIPT,
            Self::ConfigExists { .. } | Self::Config(_) => exit_code::CONFIG,
            Self::Unavailable { .. } | Self::Affinity { .. } => exit_code::UNAVAILABLE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── WifiError → CliError mapping ─────────────────────────────────────

impl From<WifiError> for CliError {
    fn from(err: WifiError) -> Self {
        match err {
            WifiError::CapabilityUnavailable { reason } => CliError::Unavailable { reason },
            WifiError::AffinityUnavailable { reason } => CliError::Affinity { reason },
            other @ (WifiError::MalformedNotification { .. }
            | WifiError::TeardownFailure { .. }) => CliError::Runtime {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wifi_errors_map_to_exit_codes() {
        let unavailable = CliError::from(WifiError::CapabilityUnavailable {
            reason: "no radio".into(),
        });
        assert_eq!(unavailable.exit_code(), exit_code::UNAVAILABLE);

        let affinity = CliError::from(WifiError::AffinityUnavailable {
            reason: "spawn failed".into(),
        });
        assert!(matches!(affinity, CliError::Affinity { .. }));
    }

    #[test]
    fn config_errors_use_config_exit_code() {
        let err = CliError::from(ConfigError::Validation {
            field: "signal.levels".into(),
            reason: "must be at least 1".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONFIG);
        assert_eq!(err.to_string(), "invalid signal.levels: must be at least 1");
    }
}
