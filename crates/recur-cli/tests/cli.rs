//! End-to-end tests for the `recur` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const WEEKLY_EVENT: &str = r#"{
    "_id": "evt1",
    "title": "Planning",
    "startDate": "2024-01-01T10:00:00Z",
    "endDate": "2024-01-01T11:00:00Z",
    "recurrence": ["RRULE:FREQ=WEEKLY;COUNT=3"]
}"#;

const SINGLE_RANGE: &str = r#"{
    "startDate": "2024-01-01T10:00:00Z",
    "endDate": "2024-01-01T11:00:00Z"
}"#;

/// A `recur` command isolated from the user's config directory.
fn recur(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("recur").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("RUST_LOG");
    cmd
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "recur failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn starts(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["startDate"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_expand_weekly_event() {
    let home = TempDir::new().unwrap();
    let value = json_output(recur(&home).arg("expand").write_stdin(WEEKLY_EVENT));

    let ids: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["_id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec!["evt1_1704103200000", "evt1_1704708000000", "evt1_1705312800000"]
    );
}

#[test]
fn test_expand_limit_bounds_infinite_series() {
    let home = TempDir::new().unwrap();
    let daily = WEEKLY_EVENT.replace("FREQ=WEEKLY;COUNT=3", "FREQ=DAILY");
    let value = json_output(recur(&home).args(["expand", "--limit", "5"]).write_stdin(daily));
    assert_eq!(value.as_array().unwrap().len(), 5);
}

#[test]
fn test_range_window() {
    let home = TempDir::new().unwrap();
    let value = json_output(
        recur(&home)
            .args([
                "range",
                "--from",
                "2024-01-01T10:00:00Z",
                "--to",
                "2024-01-10T00:00:00Z",
            ])
            .write_stdin(WEEKLY_EVENT),
    );
    assert_eq!(starts(&value).len(), 2);
}

#[test]
fn test_until_with_tight_end() {
    let home = TempDir::new().unwrap();
    let value = json_output(
        recur(&home)
            .args([
                "until",
                "--start",
                "2024-01-08T10:30:00Z",
                "--end",
                "2024-01-08T10:45:00Z",
            ])
            .write_stdin(WEEKLY_EVENT),
    );
    assert_eq!(starts(&value).len(), 1);
}

#[test]
fn test_after_snaps_to_next_occurrence() {
    let home = TempDir::new().unwrap();
    let value = json_output(
        recur(&home)
            .args(["after", "--date", "2024-01-09T00:00:00Z"])
            .write_stdin(WEEKLY_EVENT),
    );
    assert_eq!(value["_id"], "evt1_1705312800000");
}

#[test]
fn test_find_by_timestamp_exact_and_off_by_one() {
    let home = TempDir::new().unwrap();
    let hit = json_output(
        recur(&home)
            .args(["find", "--timestamp", "1704708000000"])
            .write_stdin(WEEKLY_EVENT),
    );
    assert_eq!(hit["_id"], "evt1_1704708000000");

    let miss = json_output(
        recur(&home)
            .args(["find", "--timestamp", "1704708000001"])
            .write_stdin(WEEKLY_EVENT),
    );
    assert!(miss.is_null());
}

#[test]
fn test_find_by_id() {
    let home = TempDir::new().unwrap();
    let hit = json_output(
        recur(&home)
            .args(["find", "--id", "evt1_1705312800000"])
            .write_stdin(WEEKLY_EVENT),
    );
    assert_eq!(hit["title"], "Planning");

    let foreign = json_output(
        recur(&home)
            .args(["find", "--id", "evt2_1705312800000"])
            .write_stdin(WEEKLY_EVENT),
    );
    assert!(foreign.is_null());
}

#[test]
fn test_find_by_id_rejected_for_range() {
    let home = TempDir::new().unwrap();
    recur(&home)
        .args(["find", "--id", "x_1"])
        .write_stdin(SINGLE_RANGE)
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires an event source"));
}

#[test]
fn test_info_for_single_range() {
    let home = TempDir::new().unwrap();
    let value = json_output(recur(&home).arg("info").write_stdin(SINGLE_RANGE));
    assert_eq!(value["recurrent"], false);
    assert_eq!(value["durationMs"], 3_600_000);
    assert_eq!(value["startDate"], "2024-01-01T10:00:00.000Z");
}

#[test]
fn test_expand_keeps_fractional_second_start() {
    let home = TempDir::new().unwrap();
    let event = WEEKLY_EVENT
        .replace("2024-01-01T10:00:00Z", "2024-01-01T10:00:00.250Z")
        .replace("2024-01-01T11:00:00Z", "2024-01-01T11:00:00.250Z");
    let value = json_output(recur(&home).arg("expand").write_stdin(event));
    assert_eq!(
        starts(&value),
        vec![
            "2024-01-01T10:00:00.250Z",
            "2024-01-08T10:00:00.250Z",
            "2024-01-15T10:00:00.250Z",
        ]
    );
}

#[test]
fn test_input_file() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("event.json");
    std::fs::write(&path, WEEKLY_EVENT).unwrap();

    let value = json_output(recur(&home).arg("expand").arg("--input").arg(&path));
    assert_eq!(value.as_array().unwrap().len(), 3);
}

#[test]
fn test_invalid_rule_fails() {
    let home = TempDir::new().unwrap();
    let bad = WEEKLY_EVENT.replace("FREQ=WEEKLY;COUNT=3", "FREQ=SOMETIMES");
    recur(&home)
        .arg("expand")
        .write_stdin(bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid recurrence rule"));
}

#[test]
fn test_config_file_controls_limit_and_format() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("recur.toml");
    std::fs::write(&config, "default_limit = 2\npretty = false\n").unwrap();
    let daily = WEEKLY_EVENT.replace("FREQ=WEEKLY;COUNT=3", "FREQ=DAILY");

    recur(&home)
        .arg("--config")
        .arg(&config)
        .arg("expand")
        .write_stdin(daily)
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("[{")
                .and(predicate::str::contains("evt1_1704189600000")),
        );
}

#[test]
fn test_env_overrides_config() {
    let home = TempDir::new().unwrap();
    let daily = WEEKLY_EVENT.replace("FREQ=WEEKLY;COUNT=3", "FREQ=DAILY");
    let value = json_output(
        recur(&home)
            .env("RECUR_DEFAULT_LIMIT", "3")
            .arg("expand")
            .write_stdin(daily),
    );
    assert_eq!(value.as_array().unwrap().len(), 3);
}
