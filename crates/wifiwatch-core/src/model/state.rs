// ── Radio on/off state ──

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// Radio power state reported by "radio state changed" notifications.
///
/// Unmapped platform codes normalize to [`ConnectionState::Unknown`];
/// decoding never fails.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disabling,
    Disabled,
    Enabling,
    Enabled,
    #[default]
    Unknown,
}

/// `(variant, platform code, description)` mapping table.
const CODES: [(ConnectionState, i32, &str); 5] = [
    (ConnectionState::Disabling, 0, "disabling"),
    (ConnectionState::Disabled, 1, "disabled"),
    (ConnectionState::Enabling, 2, "enabling"),
    (ConnectionState::Enabled, 3, "enabled"),
    (ConnectionState::Unknown, 4, "unknown"),
];

impl ConnectionState {
    /// Platform code carried when a notification omits the state.
    pub const UNKNOWN_CODE: i32 = 4;

    /// Map a platform code; anything unmapped becomes `Unknown`.
    pub fn from_code(code: i32) -> Self {
        CODES
            .iter()
            .find(|(_, c, _)| *c == code)
            .map_or(Self::Unknown, |(variant, _, _)| *variant)
    }

    /// Platform code for this variant.
    pub fn code(self) -> i32 {
        CODES
            .iter()
            .find(|(variant, _, _)| *variant == self)
            .map_or(Self::UNKNOWN_CODE, |(_, code, _)| *code)
    }

    pub fn description(self) -> &'static str {
        CODES
            .iter()
            .find(|(variant, _, _)| *variant == self)
            .map_or("unknown", |(_, _, description)| *description)
    }

    /// Whether the radio is on or coming up.
    pub fn is_on(self) -> bool {
        matches!(self, Self::Enabled | Self::Enabling)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
