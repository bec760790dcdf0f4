//! Integration tests for the `availabilities` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the compute and
//! expand subcommands through the actual binary, including stdin/stdout piping,
//! file I/O, configuration files, and error handling.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};

/// Helper: path to the events.json fixture.
fn events_json_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/events.json")
}

/// Helper: path to the config.toml fixture.
fn config_toml_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/config.toml")
}

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("availabilities").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Run a successful command and parse its stdout as JSON.
fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout must be valid JSON")
}

const SINGLE_DAY_INPUT: &str = r#"[
    {"kind": "opening", "starts_at": "2024-01-01T09:00:00Z", "ends_at": "2024-01-01T10:00:00Z", "weekly_recurring": false},
    {"kind": "appointment", "starts_at": "2024-01-01T09:30:00Z", "ends_at": "2024-01-01T10:00:00Z", "weekly_recurring": false}
]"#;

// ─────────────────────────────────────────────────────────────────────────────
// Compute subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn compute_stdin_to_stdout() {
    let value = stdout_json(
        cmd()
            .args(["compute", "--date", "2024-01-01", "--days", "1"])
            .write_stdin(SINGLE_DAY_INPUT),
    );

    assert_eq!(value, json!([{"date": "2024-01-01", "slots": ["9:00"]}]));
}

#[test]
fn compute_defaults_to_seven_days() {
    let value = stdout_json(
        cmd()
            .args(["compute", "--date", "2024-01-01"])
            .write_stdin(SINGLE_DAY_INPUT),
    );

    let days = value.as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["date"], "2024-01-01");
    assert_eq!(days[6]["date"], "2024-01-07");
    assert_eq!(days[1]["slots"], json!([]));
}

#[test]
fn compute_from_file_applies_later_recurring_opening_everywhere() {
    let value = stdout_json(cmd().args([
        "compute",
        "--date",
        "2024-01-01",
        "-i",
        events_json_path(),
    ]));

    let days = value.as_array().unwrap();
    assert_eq!(days.len(), 7);
    // The recurring opening comes after the day-0 opening, so it wins on day 0 too.
    assert_eq!(days[0]["slots"], json!(["14:00", "14:30"]));
    assert_eq!(days[1]["slots"], json!(["14:00", "14:30"]));
    // Appointment at 14:30 on the third day.
    assert_eq!(days[2]["slots"], json!(["14:00"]));
    for day in &days[3..] {
        assert_eq!(day["slots"], json!(["14:00", "14:30"]));
    }
}

#[test]
fn compute_accepts_timestamp_reference() {
    let value = stdout_json(
        cmd()
            .args(["compute", "--date", "2024-01-01T12:00:00Z", "--days", "1"])
            .write_stdin(SINGLE_DAY_INPUT),
    );
    assert_eq!(value[0]["date"], "2024-01-01");
}

#[test]
fn compute_with_timezone_flag() {
    let value = stdout_json(
        cmd()
            .args([
                "compute",
                "--date",
                "2024-01-01",
                "--days",
                "1",
                "--timezone",
                "Europe/Paris",
            ])
            .write_stdin(SINGLE_DAY_INPUT),
    );
    assert_eq!(value, json!([{"date": "2024-01-01", "slots": ["10:00"]}]));
}

#[test]
fn compute_file_to_file() {
    let output_path = std::env::temp_dir().join(format!(
        "availabilities-test-output-{}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&output_path);

    cmd()
        .args(["compute", "--date", "2024-01-01", "--days", "2", "-i", events_json_path(), "-o"])
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = std::fs::read_to_string(&output_path).expect("output file must exist");
    let value: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);

    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn compute_reads_config_file() {
    let value = stdout_json(cmd().args([
        "--config",
        config_toml_path(),
        "compute",
        "--date",
        "2024-01-01",
        "-i",
        events_json_path(),
    ]));

    // Two days, read in Paris (UTC+1): the 14:00Z recurring opening is 15:00 local.
    assert_eq!(
        value,
        json!([
            {"date": "2024-01-01", "slots": ["15:00", "15:30"]},
            {"date": "2024-01-02", "slots": ["15:00", "15:30"]}
        ])
    );
}

#[test]
fn flags_override_config_file() {
    let value = stdout_json(cmd().args([
        "--config",
        config_toml_path(),
        "compute",
        "--date",
        "2024-01-01",
        "--days",
        "1",
        "--timezone",
        "UTC",
        "-i",
        events_json_path(),
    ]));

    assert_eq!(value, json!([{"date": "2024-01-01", "slots": ["14:00", "14:30"]}]));
}

#[test]
fn malformed_rows_are_skipped() {
    let input = r#"[
        {"kind": "meeting", "starts_at": "2024-01-01T08:00:00Z", "ends_at": "2024-01-01T09:00:00Z"},
        {"kind": "opening", "starts_at": "2024-01-01T09:00:00Z"},
        {"kind": "opening", "starts_at": "2024-01-01T11:00:00Z", "ends_at": "2024-01-01T10:00:00Z", "weekly_recurring": true},
        {"kind": "opening", "starts_at": "2024-01-01T09:00:00Z", "ends_at": "2024-01-01T09:30:00Z"}
    ]"#;

    let value = stdout_json(
        cmd()
            .args(["compute", "--date", "2024-01-01", "--days", "1"])
            .write_stdin(input),
    );
    assert_eq!(value, json!([{"date": "2024-01-01", "slots": ["9:00"]}]));
}

// ─────────────────────────────────────────────────────────────────────────────
// Expand subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn expand_prints_one_label_per_line() {
    cmd()
        .args([
            "expand",
            "--start",
            "2024-01-01T09:00:00Z",
            "--end",
            "2024-01-01T10:00:00Z",
        ])
        .assert()
        .success()
        .stdout("9:00\n9:30\n");
}

#[test]
fn expand_in_timezone() {
    cmd()
        .args([
            "expand",
            "--start",
            "2024-01-01T09:00:00Z",
            "--end",
            "2024-01-01T10:00:00Z",
            "--timezone",
            "Europe/Paris",
        ])
        .assert()
        .success()
        .stdout("10:00\n10:30\n");
}

#[test]
fn expand_inverted_interval_prints_nothing() {
    cmd()
        .args([
            "expand",
            "--start",
            "2024-01-01T10:00:00Z",
            "--end",
            "2024-01-01T09:00:00Z",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn zero_days_fails() {
    cmd()
        .args(["compute", "--date", "2024-01-01", "--days", "0"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --days"));
}

#[test]
fn unparseable_date_fails() {
    cmd()
        .args(["compute", "--date", "yesterday"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --date"));
}

#[test]
fn unknown_timezone_fails() {
    cmd()
        .args(["compute", "--date", "2024-01-01", "--timezone", "Mars/Olympus"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown timezone"));
}

#[test]
fn invalid_json_fails() {
    cmd()
        .args(["compute", "--date", "2024-01-01"])
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse event rows"));
}

#[test]
fn missing_input_file_fails() {
    cmd()
        .args(["compute", "--date", "2024-01-01", "-i", "/nonexistent/events.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to compute availability"));
}

#[test]
fn missing_config_file_fails() {
    cmd()
        .args(["--config", "/nonexistent/config.toml", "compute", "--date", "2024-01-01"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn invalid_expand_timestamp_fails() {
    cmd()
        .args(["expand", "--start", "9am", "--end", "2024-01-01T10:00:00Z"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --start"));
}

#[test]
fn no_subcommand_shows_usage() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
