// ── Supplicant state ──
//
// Authentication / association phases of the WPA supplicant. Notifications
// carry the phase as an opaque token (its name); anything that does not
// decode into a known, valid phase is dropped by the streams.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// Phase of the supplicant state machine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplicantState {
    Disconnected,
    InterfaceDisabled,
    Inactive,
    Scanning,
    Authenticating,
    Associating,
    Associated,
    FourWayHandshake,
    GroupHandshake,
    Completed,
    Dormant,
    #[default]
    Uninitialized,
    Invalid,
}

/// `(variant, platform code, token, description)` mapping table.
const STATES: [(SupplicantState, i32, &str, &str); 13] = [
    (SupplicantState::Disconnected, 0, "DISCONNECTED", "disconnected"),
    (SupplicantState::InterfaceDisabled, 1, "INTERFACE_DISABLED", "interface disabled"),
    (SupplicantState::Inactive, 2, "INACTIVE", "inactive"),
    (SupplicantState::Scanning, 3, "SCANNING", "scanning"),
    (SupplicantState::Authenticating, 4, "AUTHENTICATING", "authenticating"),
    (SupplicantState::Associating, 5, "ASSOCIATING", "associating"),
    (SupplicantState::Associated, 6, "ASSOCIATED", "associated"),
    (SupplicantState::FourWayHandshake, 7, "FOUR_WAY_HANDSHAKE", "four-way handshake"),
    (SupplicantState::GroupHandshake, 8, "GROUP_HANDSHAKE", "group handshake"),
    (SupplicantState::Completed, 9, "COMPLETED", "completed"),
    (SupplicantState::Dormant, 10, "DORMANT", "dormant"),
    (SupplicantState::Uninitialized, 11, "UNINITIALIZED", "uninitialized"),
    (SupplicantState::Invalid, 12, "INVALID", "invalid"),
];

impl SupplicantState {
    fn entry(self) -> (SupplicantState, i32, &'static str, &'static str) {
        STATES
            .iter()
            .copied()
            .find(|(variant, _, _, _)| *variant == self)
            .unwrap_or((self, -1, "INVALID", "invalid"))
    }

    /// Platform integer code.
    pub fn code(self) -> i32 {
        self.entry().1
    }

    /// Token as carried by notifications, e.g. `"FOUR_WAY_HANDSHAKE"`.
    pub fn token(self) -> &'static str {
        self.entry().2
    }

    /// Human-readable label.
    pub fn description(self) -> &'static str {
        self.entry().3
    }

    /// Decode a notification token (ASCII case-insensitive, surrounding
    /// whitespace ignored).
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        STATES
            .iter()
            .find(|(_, _, t, _)| t.eq_ignore_ascii_case(token))
            .map(|(variant, _, _, _)| *variant)
    }

    /// Look up a variant by its platform code.
    pub fn from_code(code: i32) -> Option<Self> {
        STATES
            .iter()
            .find(|(_, c, _, _)| *c == code)
            .map(|(variant, _, _, _)| *variant)
    }

    /// Whether this phase may be forwarded from a notification.
    ///
    /// `Uninitialized` and `Invalid` are placeholders, never real reports.
    pub fn is_valid(self) -> bool {
        !matches!(self, Self::Uninitialized | Self::Invalid)
    }

    /// Whether the supplicant is mid-handshake with an access point.
    pub fn is_handshake(self) -> bool {
        matches!(
            self,
            Self::Authenticating
                | Self::Associating
                | Self::Associated
                | Self::FourWayHandshake
                | Self::GroupHandshake
        )
    }
}

impl fmt::Display for SupplicantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_variant_has_a_table_entry() {
        for state in SupplicantState::iter() {
            assert!(state.code() >= 0, "{state:?} missing from table");
            assert_eq!(SupplicantState::from_code(state.code()), Some(state));
            assert_eq!(SupplicantState::from_token(state.token()), Some(state));
        }
    }

    #[test]
    fn tokens_decode_case_insensitively() {
        assert_eq!(
            SupplicantState::from_token("completed"),
            Some(SupplicantState::Completed)
        );
        assert_eq!(
            SupplicantState::from_token(" Four_Way_Handshake "),
            Some(SupplicantState::FourWayHandshake)
        );
    }

    #[test]
    fn unknown_tokens_and_codes_do_not_decode() {
        assert_eq!(SupplicantState::from_token("ROAMING"), None);
        assert_eq!(SupplicantState::from_token(""), None);
        assert_eq!(SupplicantState::from_code(42), None);
    }

    #[test]
    fn placeholders_are_not_valid() {
        assert!(!SupplicantState::Uninitialized.is_valid());
        assert!(!SupplicantState::Invalid.is_valid());
        assert!(SupplicantState::Completed.is_valid());
        assert!(SupplicantState::Disconnected.is_valid());
    }

    #[test]
    fn handshake_phases() {
        assert!(SupplicantState::FourWayHandshake.is_handshake());
        assert!(!SupplicantState::Completed.is_handshake());
        assert!(!SupplicantState::Scanning.is_handshake());
    }

    #[test]
    fn serializes_as_token() {
        let json = serde_json::to_string(&SupplicantState::FourWayHandshake).unwrap();
        assert_eq!(json, "\"FOUR_WAY_HANDSHAKE\"");
    }
}
