//! Integration tests for the `wifiwatch` CLI binary.
//!
//! Every test runs against a config path inside a temp dir and scripts
//! from `demos/`, so nothing touches the user's real configuration.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `wifiwatch` binary with env isolation.
fn wifiwatch_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("wifiwatch");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env_remove("WIFIWATCH_CONFIG")
        .env_remove("WIFIWATCH_OUTPUT")
        .env_remove("WIFIWATCH_SIGNAL__LEVELS")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(home.join("config.toml"));
    cmd
}

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Rows of a replay for one stream, as `(step, value)`.
fn stream_rows<'a>(rows: &'a Value, stream: &str) -> Vec<(u64, &'a Value)> {
    rows.as_array()
        .unwrap()
        .iter()
        .filter(|row| row["stream"] == stream)
        .map(|row| (row["step"].as_u64().unwrap(), &row["value"]))
        .collect()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_missing_subcommand_shows_usage() {
    let home = TempDir::new().unwrap();
    let output = wifiwatch_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    wifiwatch_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("classify")
                .and(predicate::str::contains("replay"))
                .and(predicate::str::contains("states")),
        );
}

// ── Classify ────────────────────────────────────────────────────────

#[test]
fn test_classify_json() {
    let home = TempDir::new().unwrap();
    let output = wifiwatch_cmd(home.path())
        .args(["classify", "-67", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["level"], 2);
    assert_eq!(json["levels"], 5);
    assert_eq!(json["label"], "fair");
}

#[test]
fn test_classify_custom_levels_plain() {
    let home = TempDir::new().unwrap();
    wifiwatch_cmd(home.path())
        .args(["classify", "-50", "--levels", "10", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("9\n"));
}

#[test]
fn test_classify_zero_levels_is_usage_error() {
    let home = TempDir::new().unwrap();
    wifiwatch_cmd(home.path())
        .args(["classify", "-67", "--levels", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("levels"));
}

// ── States ──────────────────────────────────────────────────────────

#[test]
fn test_states_supplicant_plain() {
    let home = TempDir::new().unwrap();
    wifiwatch_cmd(home.path())
        .args(["states", "supplicant", "-o", "plain"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("COMPLETED")
                .and(predicate::str::contains("FOUR_WAY_HANDSHAKE")),
        );
}

// ── Replay ──────────────────────────────────────────────────────────

#[test]
fn test_replay_office_script() {
    let home = TempDir::new().unwrap();
    let output = wifiwatch_cmd(home.path())
        .arg("replay")
        .arg(demo("office.toml"))
        .args(["-o", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let rows = stdout_json(&output);

    let supplicant = stream_rows(&rows, "supplicant_state");
    assert_eq!(supplicant[0], (0, &Value::from("UNINITIALIZED")));
    assert!(supplicant.contains(&(4, &Value::from("COMPLETED"))));

    let info = stream_rows(&rows, "connection_info");
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].0, 4);
    assert_eq!(info[0].1["ssid"], "office");

    let on_off = stream_rows(&rows, "wifi_on_off");
    assert_eq!(on_off, vec![(5, &Value::Bool(true))]);
}

#[test]
fn test_replay_selected_stream_only() {
    let home = TempDir::new().unwrap();
    let output = wifiwatch_cmd(home.path())
        .arg("replay")
        .arg(demo("office.toml"))
        .args(["-s", "wifi-on-off", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows = stdout_json(&output);
    assert!(
        rows.as_array()
            .unwrap()
            .iter()
            .all(|row| row["stream"] == "wifi_on_off")
    );
}

#[test]
fn test_replay_without_radio_reports_unavailable_scans() {
    let home = TempDir::new().unwrap();
    let output = wifiwatch_cmd(home.path())
        .arg("replay")
        .arg(demo("no-radio.toml"))
        .args(["-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows = stdout_json(&output);
    let scans = stream_rows(&rows, "access_points");
    assert!(!scans.is_empty());
    assert!(scans.iter().all(|(_, value)| value.get("error").is_some()));
}

#[test]
fn test_replay_missing_script() {
    let home = TempDir::new().unwrap();
    wifiwatch_cmd(home.path())
        .args(["replay", "/nonexistent/script.toml"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("script.toml"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_show_and_refuse_overwrite() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("config.toml");

    wifiwatch_cmd(home.path())
        .args(["config", "init", "-y"])
        .assert()
        .success();
    assert!(path.exists());

    wifiwatch_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    let output = wifiwatch_cmd(home.path())
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["signal"]["levels"], 5);

    wifiwatch_cmd(home.path())
        .args(["config", "init", "-y"])
        .assert()
        .code(3);

    wifiwatch_cmd(home.path())
        .args(["config", "init", "-y", "--force"])
        .assert()
        .success();
}

#[test]
fn test_invalid_config_is_config_error() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("config.toml"), "[signal]\nlevels = 0\n").unwrap();

    wifiwatch_cmd(home.path())
        .args(["classify", "-60"])
        .assert()
        .code(3);

    // The path is still reported for a broken file.
    wifiwatch_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success();
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    wifiwatch_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}
