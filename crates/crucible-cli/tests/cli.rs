//! End-to-end checks for the demo driver binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn writes_the_report_file_and_the_summary() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.txt");

    Command::cargo_bin("crucible")
        .unwrap()
        .arg("--no-color")
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Unit Test Report:"))
        .stdout(predicate::str::contains("Failed Tests: 0"))
        .stdout(predicate::str::contains("Passed Tests: 3"));

    let text = std::fs::read_to_string(&report).unwrap();
    assert!(text.contains("[Factorial Test]"));
    assert!(text.contains("[Fibonacci Test]"));
    assert!(text.contains("[Timing Test]"));
    assert!(text.contains("passed"));
    assert!(!text.contains('\x1b'), "report file must stay plain text");
}

#[test]
fn no_color_env_accepts_any_conventional_value() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.txt");

    Command::cargo_bin("crucible")
        .unwrap()
        .env("NO_COLOR", "1")
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b").not());
}

#[test]
fn sequential_and_strict_modes_still_pass() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.txt");

    Command::cargo_bin("crucible")
        .unwrap()
        .args(["--no-color", "--sequential", "--strict", "--report"])
        .arg(&report)
        .assert()
        .success();
}
