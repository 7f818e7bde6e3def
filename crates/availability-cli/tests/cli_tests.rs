//! Integration tests for the `slots` CLI binary.
//!
//! These use `assert_cmd` and `predicates` to drive the subcommands through the
//! actual binary with fixture busy data and a fixture settings file (UTC, every
//! day 09:00-17:00, no buffer).

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use chrono::{DateTime, Utc};
use predicates::prelude::*;
use serde_json::Value;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// `slots` with the fixture settings file and no inherited SLOTS_* overrides.
fn slots() -> Command {
    let mut cmd = Command::cargo_bin("slots").unwrap();
    cmd.arg("--config").arg(fixture("slots.toml"));
    for key in [
        "SLOTS_TIMEZONE",
        "SLOTS_WORK_START",
        "SLOTS_WORK_END",
        "SLOTS_WORK_DAYS",
        "SLOTS_DEFAULT_DURATION",
        "SLOTS_BUFFER_MINUTES",
        "SLOTS_MAX_SLOTS",
        "SLOTS_MAX_ALTERNATIVES",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout must be JSON")
}

fn instant(value: &Value) -> DateTime<Utc> {
    value
        .as_str()
        .expect("timestamp must be a string")
        .parse()
        .expect("timestamp must be RFC 3339")
}

fn utc(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

/// (start, end) pairs of the `slots` array in a `free` report.
fn slot_spans(report: &Value) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    report["slots"]
        .as_array()
        .expect("slots must be an array")
        .iter()
        .map(|s| (instant(&s["start"]), instant(&s["end"])))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// free
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn free_splits_day_around_busy_hour() {
    let report = stdout_json(slots().args([
        "free",
        "--busy",
        &fixture("busy.json"),
        "--from",
        "2026-03-16",
        "--to",
        "2026-03-17",
        "--duration",
        "30",
    ]));

    assert_eq!(
        slot_spans(&report),
        vec![
            (utc("2026-03-16T09:00:00Z"), utc("2026-03-16T10:00:00Z")),
            (utc("2026-03-16T11:00:00Z"), utc("2026-03-16T17:00:00Z")),
        ]
    );
    assert_eq!(report["timezone"], "UTC");
    assert_eq!(report["duration_requested"], 30);
    assert_eq!(report["slots"][0]["start_local"], "Monday, March 16 at 09:00 AM");
}

#[test]
fn free_reads_busy_from_stdin() {
    let input = r#"[{"start": "2026-03-16T09:00:00Z", "end": "2026-03-16T17:00:00Z"}]"#;
    let report = stdout_json(
        slots()
            .args(["free", "--from", "2026-03-16", "--to", "2026-03-17", "-d", "15"])
            .write_stdin(input),
    );
    assert!(slot_spans(&report).is_empty());
}

#[test]
fn free_merges_overlapping_busy() {
    let report = stdout_json(slots().args([
        "free",
        "--busy",
        &fixture("overlapping.json"),
        "--from",
        "2026-03-16",
        "--to",
        "2026-03-17",
        "--duration",
        "1",
    ]));
    assert_eq!(
        slot_spans(&report),
        vec![
            (utc("2026-03-16T09:00:00Z"), utc("2026-03-16T10:00:00Z")),
            (utc("2026-03-16T12:00:00Z"), utc("2026-03-16T17:00:00Z")),
        ]
    );
}

#[test]
fn free_uses_default_duration_and_buffer_flag() {
    let report = stdout_json(slots().args([
        "free",
        "--busy",
        &fixture("busy.json"),
        "--from",
        "2026-03-16",
        "--to",
        "2026-03-17",
        "--buffer",
        "15",
    ]));
    assert_eq!(report["duration_requested"], 30);
    assert_eq!(report["buffer_minutes"], 15);
    assert_eq!(
        slot_spans(&report),
        vec![
            (utc("2026-03-16T09:00:00Z"), utc("2026-03-16T09:45:00Z")),
            (utc("2026-03-16T11:15:00Z"), utc("2026-03-16T17:00:00Z")),
        ]
    );
}

#[test]
fn free_limit_caps_slots() {
    let report = stdout_json(
        slots()
            .args(["free", "--from", "2026-03-16", "--to", "2026-03-23", "--limit", "2"])
            .write_stdin(""),
    );
    assert_eq!(slot_spans(&report).len(), 2);
}

#[test]
fn free_understands_google_events() {
    let report = stdout_json(slots().args([
        "free",
        "--busy",
        &fixture("google_events.json"),
        "--busy-format",
        "google-events",
        "--from",
        "2026-03-16",
        "--to",
        "2026-03-17",
    ]));
    // Standup 09:00-09:30 and review 14:00-17:00 block time; lunch is marked
    // free and the cancelled meeting is ignored.
    assert_eq!(
        slot_spans(&report),
        vec![(utc("2026-03-16T09:30:00Z"), utc("2026-03-16T14:00:00Z"))]
    );
}

#[test]
fn free_understands_google_freebusy() {
    let report = stdout_json(slots().args([
        "free",
        "--busy",
        &fixture("freebusy.json"),
        "--busy-format",
        "google-freebusy",
        "--from",
        "2026-03-16",
        "--to",
        "2026-03-17",
    ]));
    assert_eq!(
        slot_spans(&report),
        vec![(utc("2026-03-16T12:00:00Z"), utc("2026-03-16T13:00:00Z"))]
    );
}

#[test]
fn free_rejects_unrepresentable_duration() {
    slots()
        .args([
            "free",
            "--from",
            "2026-03-16",
            "--to",
            "2026-03-17",
            "--duration",
            "9223372036854775807",
        ])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn free_rejects_empty_range() {
    slots()
        .args(["free", "--from", "2026-03-16T10:00", "--to", "2026-03-16T10:00"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid range"));
}

#[test]
fn free_rejects_bad_datetime() {
    slots()
        .args(["free", "--from", "soon", "--to", "2026-03-17"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --from 'soon'"));
}

#[test]
fn free_rejects_malformed_busy_json() {
    slots()
        .args(["free", "--from", "2026-03-16", "--to", "2026-03-17"])
        .write_stdin("[{\"start\": 1}]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid busy intervals JSON"));
}

#[test]
fn missing_busy_file_fails() {
    slots()
        .args(["free", "--busy", "/nonexistent/busy.json", "--from", "2026-03-16"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// conflict / suggest
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn conflict_detects_overlap() {
    let report = stdout_json(slots().args([
        "conflict",
        "--busy",
        &fixture("busy.json"),
        "--start",
        "2026-03-16T10:30",
        "--end",
        "2026-03-16T11:30",
    ]));
    assert_eq!(report["conflict"], true);
    assert_eq!(report["conflicts"][0]["overlap_minutes"], 30);
}

#[test]
fn conflict_ignores_touching_meeting() {
    let report = stdout_json(slots().args([
        "conflict",
        "--busy",
        &fixture("busy.json"),
        "--start",
        "2026-03-16T11:00",
        "--end",
        "2026-03-16T12:00",
    ]));
    assert_eq!(report["conflict"], false);
    assert_eq!(report["conflicts"].as_array().unwrap().len(), 0);
}

#[test]
fn conflict_rejects_inverted_meeting() {
    slots()
        .args([
            "conflict",
            "--busy",
            &fixture("busy.json"),
            "--start",
            "2026-03-16T12:00",
            "--end",
            "2026-03-16T11:00",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid meeting time"));
}

#[test]
fn suggest_returns_alternatives_of_same_length() {
    let report = stdout_json(slots().args([
        "suggest",
        "--busy",
        &fixture("busy.json"),
        "--start",
        "2026-03-16T10:00",
        "--end",
        "2026-03-16T11:00",
        "-n",
        "2",
    ]));

    let alternatives = report["alternatives"].as_array().unwrap();
    assert_eq!(alternatives.len(), 2);
    assert_eq!(instant(&alternatives[0]["start"]), utc("2026-03-16T09:00:00Z"));
    assert_eq!(instant(&alternatives[1]["start"]), utc("2026-03-16T11:00:00Z"));
    for alt in alternatives {
        assert_eq!(alt["duration_minutes"], 60);
    }
    assert_eq!(instant(&report["original"]["start"]), utc("2026-03-16T10:00:00Z"));
}

// ─────────────────────────────────────────────────────────────────────────────
// expand / overlap / config
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn expand_prints_busy_intervals() {
    let busy = stdout_json(slots().args([
        "expand",
        "--rrule",
        "FREQ=DAILY",
        "--dtstart",
        "2026-03-16T09:30:00",
        "--duration",
        "15",
        "--from",
        "2026-03-16",
        "--to",
        "2026-03-18",
    ]));
    let busy = busy.as_array().unwrap();
    assert_eq!(busy.len(), 2);
    assert_eq!(instant(&busy[0]["start"]), utc("2026-03-16T09:30:00Z"));
    assert_eq!(instant(&busy[0]["end"]), utc("2026-03-16T09:45:00Z"));
}

#[test]
fn expand_output_feeds_free() {
    let output = slots()
        .args([
            "expand",
            "--rrule",
            "FREQ=DAILY",
            "--dtstart",
            "2026-03-16T09:00:00",
            "--duration",
            "480",
            "--from",
            "2026-03-16",
            "--to",
            "2026-03-17",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report = stdout_json(
        slots()
            .args(["free", "--from", "2026-03-16", "--to", "2026-03-17"])
            .write_stdin(output),
    );
    assert!(slot_spans(&report).is_empty());
}

#[test]
fn expand_rejects_bad_rule() {
    slots()
        .args([
            "expand",
            "--rrule",
            "FREQ=SOMETIMES",
            "--dtstart",
            "2026-03-16T09:30:00",
            "--duration",
            "15",
            "--from",
            "2026-03-16",
            "--to",
            "2026-03-18",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid RRULE"));
}

#[test]
fn overlap_lists_shared_hours() {
    let shared = stdout_json(slots().args([
        "overlap",
        "--tz",
        "Europe/London",
        "--tz",
        "Asia/Kolkata",
        "--date",
        "2026-03-16",
    ]));
    let hours: Vec<u64> = shared
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["utc_hour"].as_u64().unwrap())
        .collect();
    assert_eq!(hours, vec![9, 10, 11]);
}

#[test]
fn overlap_requires_a_timezone() {
    slots()
        .args(["overlap", "--date", "2026-03-16"])
        .assert()
        .failure();
}

#[test]
fn config_prints_effective_settings() {
    let report = stdout_json(slots().arg("config"));
    assert_eq!(report["working_hours"]["timezone"], "UTC");
    assert_eq!(report["working_hours"]["start_hour"], 9);
    assert_eq!(report["working_hours"]["working_days"].as_array().unwrap().len(), 7);
    assert_eq!(report["buffer_minutes"], 0);
}

#[test]
fn env_overrides_config_file() {
    let report = stdout_json(
        slots()
            .env("SLOTS_BUFFER_MINUTES", "20")
            .env("SLOTS_WORK_DAYS", "Mon,Tue")
            .arg("config"),
    );
    assert_eq!(report["buffer_minutes"], 20);
    assert_eq!(
        report["working_hours"]["working_days"],
        serde_json::json!(["Mon", "Tue"])
    );
}

#[test]
fn missing_config_file_fails() {
    Command::cargo_bin("slots")
        .unwrap()
        .args(["--config", "/nonexistent/slots.toml", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn no_subcommand_prints_usage() {
    Command::cargo_bin("slots")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
