//! # jumprs CLI Doctor Integration Tests
//!
//! File: cli/tests/doctor.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! Integration tests for the `jumprs doctor` subcommand. Doctor results
//! depend on the machine (container runtime, attached devices), so these
//! tests assert the report's shape and the deterministic checks rather
//! than a specific overall exit status.
//!

mod common;
use common::*;
use predicates::prelude::*;
use tempfile::tempdir;

/// # Test Doctor Help (`test_doctor_help`)
#[test]
fn test_doctor_help() {
    jumprs_cmd()
        .args(["doctor", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--required"))
        .stdout(predicate::str::contains("--json"));
}

/// # Test Doctor Report Shape (`test_doctor_report_shape`)
///
/// The text report opens with a bracketed level tag and covers every probe
/// by name. Details may span lines for failing external commands, so only
/// the check names and the leading tag are asserted.
#[test]
fn test_doctor_report_shape() {
    let dir = tempdir().unwrap();
    let assert = jumprs_cmd_in(dir.path()).arg("doctor").assert();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.starts_with('['), "report must open with a level tag");
    for name in [
        "Config files",
        "Configured HTTP port",
        "Host interfaces",
        "Host ports",
        "Container runtime",
        "Device bridge",
    ] {
        assert!(stdout.contains(name), "missing check: {name}");
    }
}

/// # Test Doctor JSON Output (`test_doctor_json_output`)
///
/// `--json` must emit a parseable report with the expected fields.
#[test]
fn test_doctor_json_output() {
    let dir = tempdir().unwrap();
    let assert = jumprs_cmd_in(dir.path()).args(["doctor", "--json"]).assert();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let report: serde_json::Value =
        serde_json::from_str(&stdout).expect("doctor --json emitted invalid JSON");
    assert!(report["checks"].is_array());
    assert!(report["failures"].is_u64());
}

/// # Test Doctor Flags Invalid Configured Port (`test_doctor_flags_invalid_configured_port`)
///
/// A malformed `JUMP_HTTP_PORT` is a deterministic failure independent of
/// the machine's runtime state.
#[test]
fn test_doctor_flags_invalid_configured_port() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(".env"), "JUMP_HTTP_PORT=not-a-port\n").unwrap();
    jumprs_cmd_in(dir.path())
        .arg("doctor")
        .assert()
        .failure()
        .stdout(predicate::str::contains("[FAIL] Configured HTTP port"));
}

/// # Test Doctor Warns On Duplicate Keys (`test_doctor_warns_on_duplicate_keys`)
#[test]
fn test_doctor_warns_on_duplicate_keys() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "JUMP_HOST_IP=10.0.0.1\nJUMP_HOST_IP=10.0.0.2\n",
    )
    .unwrap();
    jumprs_cmd_in(dir.path())
        .arg("doctor")
        .assert()
        .stdout(predicate::str::contains("[WARN] Config files"));
}
