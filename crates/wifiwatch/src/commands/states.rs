//! State table command handler.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use wifiwatch_core::model::{MAX_RSSI, MIN_RSSI};
use wifiwatch_core::{ConnectionState, SignalLevel, SupplicantState, classify};

use crate::cli::{GlobalOpts, StateTable, StatesArgs};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Serialize, Tabled)]
struct SupplicantRow {
    #[tabled(rename = "Code")]
    code: i32,
    #[tabled(rename = "Token")]
    token: &'static str,
    #[tabled(rename = "State")]
    description: &'static str,
    #[tabled(rename = "Forwarded")]
    valid: bool,
    #[tabled(rename = "Handshake")]
    handshake: bool,
}

impl From<SupplicantState> for SupplicantRow {
    fn from(s: SupplicantState) -> Self {
        Self {
            code: s.code(),
            token: s.token(),
            description: s.description(),
            valid: s.is_valid(),
            handshake: s.is_handshake(),
        }
    }
}

#[derive(Clone, Copy, Serialize, Tabled)]
struct ConnectionRow {
    #[tabled(rename = "Code")]
    code: i32,
    #[tabled(rename = "State")]
    description: &'static str,
    #[tabled(rename = "Radio On")]
    on: bool,
}

impl From<ConnectionState> for ConnectionRow {
    fn from(s: ConnectionState) -> Self {
        Self {
            code: s.code(),
            description: s.description(),
            on: s.is_on(),
        }
    }
}

#[derive(Clone, Copy, Serialize, Tabled)]
struct SignalRow {
    #[tabled(rename = "Level")]
    level: u32,
    #[tabled(rename = "Label")]
    label: &'static str,
    /// `None` for the bottom level, which has no lower bound.
    #[tabled(rename = "From dBm", display_with = "display_bound")]
    from_rssi: Option<i32>,
}

impl From<SignalLevel> for SignalRow {
    fn from(l: SignalLevel) -> Self {
        Self {
            level: l.level(),
            label: l.description(),
            from_rssi: lowest_rssi(l.level()),
        }
    }
}

/// Weakest reading that still classifies at `level` on the default scale.
fn lowest_rssi(level: u32) -> Option<i32> {
    if level == 0 {
        return None;
    }
    (MIN_RSSI..=MAX_RSSI).find(|&rssi| classify(rssi, SignalLevel::COUNT) >= level)
}

#[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)]
fn display_bound(bound: &Option<i32>) -> String {
    bound.map_or_else(|| "-".into(), |rssi| rssi.to_string())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &StatesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let out = match args.table {
        StateTable::Supplicant => {
            let rows: Vec<SupplicantRow> = SupplicantState::iter().map(SupplicantRow::from).collect();
            output::render_list(
                &global.output,
                &rows,
                |r| *r,
                |r| format!("{}\t{}", r.code, r.token),
            )?
        }
        StateTable::Connection => {
            let rows: Vec<ConnectionRow> = ConnectionState::iter().map(ConnectionRow::from).collect();
            output::render_list(
                &global.output,
                &rows,
                |r| *r,
                |r| format!("{}\t{}", r.code, r.description),
            )?
        }
        StateTable::Signal => {
            let rows: Vec<SignalRow> = SignalLevel::iter().map(SignalRow::from).collect();
            output::render_list(
                &global.output,
                &rows,
                |r| *r,
                |r| format!("{}\t{}", r.level, r.label),
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_rows_start_at_documented_bounds() {
        let rows: Vec<SignalRow> = SignalLevel::iter().map(SignalRow::from).collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].from_rssi, None);
        assert_eq!(rows[1].from_rssi, Some(-88));
        assert_eq!(rows[4].from_rssi, Some(MAX_RSSI));
        assert!(rows[1..].windows(2).all(|w| w[0].from_rssi < w[1].from_rssi));
    }

    #[test]
    fn only_placeholders_are_not_forwarded() {
        let hidden: Vec<&str> = SupplicantState::iter()
            .map(SupplicantRow::from)
            .filter(|r| !r.valid)
            .map(|r| r.token)
            .collect();
        assert_eq!(hidden, vec!["UNINITIALIZED", "INVALID"]);
    }
}
