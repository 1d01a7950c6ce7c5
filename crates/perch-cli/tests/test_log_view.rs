//! Integration tests for the `perch log` viewer.
//!
//! Uses `assert_cmd` against the built `perch` binary with the log path
//! pointed into a temp directory for isolation.

use assert_cmd::Command;
use predicates::prelude::*;

fn perch() -> Command {
    Command::cargo_bin("perch").expect("perch binary should build")
}

#[test]
fn log_without_file_prints_placeholder() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log = dir.path().join("log.txt");

    perch()
        .args(["log", "--log"])
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("No logs found."));
}

#[test]
fn log_prints_trimmed_lines() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log = dir.path().join("log.txt");
    std::fs::write(&log, "\n2024-01-01 12:34:56\n\nName: Ada  \n").expect("write log");

    perch()
        .args(["log", "--log"])
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-01 12:34:56"))
        .stdout(predicate::str::contains("Name: Ada\n"));
}

#[test]
fn log_does_not_create_the_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log = dir.path().join("log.txt");

    perch().args(["log", "--log"]).arg(&log).assert().success();
    assert!(!log.exists(), "viewer must not create the log file");
}

#[test]
fn scrape_with_empty_url_reports_error_and_appends_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log = dir.path().join("log.txt");

    perch()
        .args(["scrape", "", "--log"])
        .arg(&log)
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: "));
    assert!(!log.exists(), "failed scrape must not append a log entry");
}
