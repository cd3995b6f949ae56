//! # jumprs Doctor Command Group
//!
//! File: cli/src/commands/doctor/mod.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! This module implements `jumprs doctor`, the read-only environment
//! diagnostic. It runs the same probes the session pipeline relies on
//! (configuration files, host interfaces, the port range, the container
//! runtime, and the device bridge) but reports findings instead of acting
//! on them. Nothing is started, patched, or tunnelled.
//!
//! Each probe yields one `CheckResult` at a `PASS`, `WARN`, or `FAIL` level.
//! The command succeeds unless at least one check fails (`WARN` counts as a
//! failure under `--required`).
//!
//! ## Examples
//!
//! ```bash
//! # Human-readable report
//! jumprs doctor
//!
//! # Treat warnings as failures (CI gate)
//! jumprs doctor --required
//!
//! # Machine-readable report
//! jumprs doctor --json
//! ```
//!
use crate::common::adb::{self, AdbBridge, DeviceStatus};
use crate::common::compose::{Compose, BRIDGE_SERVICE};
use crate::common::network::discovery::{self, JUMP_PORT_RANGE};
use crate::common::process::{ExecMode, Runner};
use crate::core::config::{ConfigStore, KEY_HTTP_PORT};
use crate::core::error::{JumprsError, Result};
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

/// # Doctor Command Arguments (`DoctorArgs`)
#[derive(Parser, Debug)]
#[command(about = "Diagnose the environment a bridge session depends on")]
pub struct DoctorArgs {
    /// Treat warnings as failures.
    #[arg(long)]
    required: bool,

    /// Emit the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

/// Severity of a single diagnostic finding.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum CheckLevel {
    Pass,
    Warn,
    Fail,
}

impl CheckLevel {
    fn label(self) -> &'static str {
        match self {
            CheckLevel::Pass => "PASS",
            CheckLevel::Warn => "WARN",
            CheckLevel::Fail => "FAIL",
        }
    }
}

/// One named probe outcome.
#[derive(Serialize, Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub level: CheckLevel,
    pub details: String,
}

impl CheckResult {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        CheckResult {
            name,
            level: CheckLevel::Pass,
            details: details.into(),
        }
    }

    fn warn(name: &'static str, details: impl Into<String>) -> Self {
        CheckResult {
            name,
            level: CheckLevel::Warn,
            details: details.into(),
        }
    }

    fn fail(name: &'static str, details: impl Into<String>) -> Self {
        CheckResult {
            name,
            level: CheckLevel::Fail,
            details: details.into(),
        }
    }
}

/// Full diagnostic report, serialized as-is under `--json`.
#[derive(Serialize, Debug)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
    pub failures: usize,
}

/// # Handle Doctor Command (`handle_doctor`)
///
/// Runs every probe, prints the report, and fails the process when any
/// check is at `FAIL` level after `--required` escalation.
pub async fn handle_doctor(args: DoctorArgs) -> Result<()> {
    info!("Handling doctor command...");
    debug!("Doctor args: {:?}", args);

    let root_dir = std::env::current_dir().context("Failed to get current directory")?;
    let runner = Runner::new(ExecMode::Real, &root_dir);

    let mut checks = Vec::new();
    // One config snapshot feeds both config checks.
    match ConfigStore::load(&root_dir) {
        Ok(config) => {
            checks.push(check_config_files(&config));
            checks.push(check_configured_http_port(&config));
        }
        Err(err) => checks.push(CheckResult::fail(
            "Config files",
            format!("failed to read .env files: {err:#}"),
        )),
    }
    checks.push(check_host_interfaces());
    checks.push(check_host_ports());
    checks.extend(check_container_runtime(&runner).await);
    checks.push(check_device_bridge(&runner).await);

    let report = build_report(checks, args.required);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize doctor report")?
        );
    } else {
        for check in &report.checks {
            println!("{}", format_check(check));
        }
    }

    if report.failures > 0 {
        return Err(JumprsError::Config(format!(
            "doctor found {} failing check(s)",
            report.failures
        ))
        .into());
    }
    Ok(())
}

/// Applies `--required` escalation and counts failures.
fn build_report(mut checks: Vec<CheckResult>, required: bool) -> DoctorReport {
    if required {
        for check in &mut checks {
            if check.level == CheckLevel::Warn {
                check.level = CheckLevel::Fail;
            }
        }
    }
    let failures = checks
        .iter()
        .filter(|check| check.level == CheckLevel::Fail)
        .count();
    DoctorReport { checks, failures }
}

fn format_check(check: &CheckResult) -> String {
    format!("[{}] {}: {}", check.level.label(), check.name, check.details)
}

/// Configuration files carry no conflicting duplicate keys.
fn check_config_files(config: &ConfigStore) -> CheckResult {
    const NAME: &str = "Config files";
    let warnings = config.duplicate_warnings();
    if warnings.is_empty() {
        CheckResult::pass(NAME, "no duplicate keys in .env files")
    } else {
        CheckResult::warn(NAME, warnings.join("; "))
    }
}

/// A configured `JUMP_HTTP_PORT` must be a valid port number.
fn check_configured_http_port(config: &ConfigStore) -> CheckResult {
    const NAME: &str = "Configured HTTP port";
    match config.get(KEY_HTTP_PORT) {
        None => CheckResult::pass(
            NAME,
            format!(
                "{KEY_HTTP_PORT} not set; sessions scan {}-{}",
                JUMP_PORT_RANGE.start(),
                JUMP_PORT_RANGE.end()
            ),
        ),
        Some(value) => match discovery::parse_port(value) {
            Ok(port) => CheckResult::pass(NAME, format!("{KEY_HTTP_PORT}={port}")),
            Err(_) => CheckResult::fail(NAME, format!("{KEY_HTTP_PORT} is invalid: '{value}'")),
        },
    }
}

/// At least one usable interface, ideally exactly one private candidate.
fn check_host_interfaces() -> CheckResult {
    const NAME: &str = "Host interfaces";
    let candidates = match discovery::list_candidates() {
        Ok(candidates) => candidates,
        Err(err) => return CheckResult::fail(NAME, format!("enumeration failed: {err:#}")),
    };
    if candidates.is_empty() {
        return CheckResult::fail(NAME, "no non-loopback IPv4 interface found");
    }
    let top = &candidates[0];
    let private_scored = candidates
        .iter()
        .filter(|candidate| candidate.is_private && candidate.score > 0)
        .count();
    if private_scored >= 2 {
        let listing = candidates
            .iter()
            .filter(|candidate| candidate.is_private && candidate.score > 0)
            .map(|candidate| format!("{}:{}", candidate.interface_name, candidate.address))
            .collect::<Vec<_>>()
            .join(", ");
        CheckResult::warn(
            NAME,
            format!("multiple private candidates ({listing}); top-ranked is {}", top.address),
        )
    } else {
        CheckResult::pass(
            NAME,
            format!(
                "top-ranked candidate {} on {} (score {})",
                top.address, top.interface_name, top.score
            ),
        )
    }
}

/// The session port range must contain at least one free host port.
fn check_host_ports() -> CheckResult {
    const NAME: &str = "Host ports";
    let free: Vec<u16> = JUMP_PORT_RANGE
        .filter(|&port| discovery::host_port_is_free(port))
        .collect();
    let total = JUMP_PORT_RANGE.count();
    match free.first() {
        None => CheckResult::fail(
            NAME,
            format!(
                "all ports {}-{} are occupied on the host",
                JUMP_PORT_RANGE.start(),
                JUMP_PORT_RANGE.end()
            ),
        ),
        Some(first) => CheckResult::pass(
            NAME,
            format!("first free port {first} ({} of {total} free)", free.len()),
        ),
    }
}

/// Container runtime availability and the bridge service state.
async fn check_container_runtime(runner: &Runner) -> Vec<CheckResult> {
    const NAME_RUNTIME: &str = "Container runtime";
    const NAME_SERVICE: &str = "Bridge service";

    let version = match runner
        .run_capture("docker", &["compose", "version", "--short"])
        .await
    {
        Ok(output) if output.success => output.stdout,
        Ok(output) => {
            return vec![CheckResult::fail(
                NAME_RUNTIME,
                format!("'docker compose version' failed: {}", output.stderr),
            )]
        }
        Err(err) => {
            return vec![CheckResult::fail(
                NAME_RUNTIME,
                format!("docker is not available: {err:#}"),
            )]
        }
    };
    let mut checks = vec![CheckResult::pass(
        NAME_RUNTIME,
        format!("docker compose {version}"),
    )];

    let compose = Compose::new(runner.clone());
    match compose.verify_bridge_running().await {
        Ok(()) => checks.push(CheckResult::pass(
            NAME_SERVICE,
            format!("service '{BRIDGE_SERVICE}' is running"),
        )),
        Err(err) => checks.push(CheckResult::warn(
            NAME_SERVICE,
            format!("{err:#}; run 'jumprs jump' to start the stack"),
        )),
    }
    checks
}

/// Device-bridge tool and attached devices. Only a warning when absent:
/// the tool is required for `--usb` sessions alone.
async fn check_device_bridge(runner: &Runner) -> CheckResult {
    const NAME: &str = "Device bridge";
    let adb_bridge = AdbBridge::new(runner.clone());
    if let Err(err) = adb_bridge.ensure_available().await {
        return CheckResult::warn(NAME, format!("{err:#} (needed for --usb sessions only)"));
    }
    let devices = match adb_bridge.list_devices().await {
        Ok(devices) => devices,
        Err(err) => return CheckResult::fail(NAME, format!("device listing failed: {err:#}")),
    };
    summarize_devices(&devices)
}

/// Pure device-list triage shared with tests.
fn summarize_devices(devices: &[adb::DeviceRecord]) -> CheckResult {
    const NAME: &str = "Device bridge";
    let unauthorized: Vec<&str> = devices
        .iter()
        .filter(|device| device.status == DeviceStatus::Unauthorized)
        .map(|device| device.serial.as_str())
        .collect();
    if !unauthorized.is_empty() {
        return CheckResult::fail(
            NAME,
            format!(
                "unauthorized device(s): {}; accept the debugging prompt on the device",
                unauthorized.join(", ")
            ),
        );
    }
    let ready = devices
        .iter()
        .filter(|device| device.status == DeviceStatus::Device)
        .count();
    if ready == 0 {
        CheckResult::warn(NAME, "adb available, no device attached")
    } else {
        CheckResult::pass(NAME, format!("{ready} device(s) ready"))
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::adb::DeviceRecord;
    use crate::core::config::EnvFileSnapshot;
    use std::collections::HashMap;

    fn device(serial: &str, status: DeviceStatus) -> DeviceRecord {
        DeviceRecord {
            serial: serial.to_string(),
            status,
        }
    }

    fn config_from(root: &str) -> ConfigStore {
        ConfigStore::with_process_env(
            HashMap::new(),
            EnvFileSnapshot::parse(root),
            EnvFileSnapshot::parse(""),
        )
    }

    #[test]
    fn test_parses_doctor_flags() {
        let args = DoctorArgs::try_parse_from(["doctor", "--required", "--json"]).unwrap();
        assert!(args.required);
        assert!(args.json);
        let defaults = DoctorArgs::try_parse_from(["doctor"]).unwrap();
        assert!(!defaults.required);
        assert!(!defaults.json);
    }

    #[test]
    fn test_required_escalates_warnings_to_failures() {
        let checks = vec![
            CheckResult::pass("A", "ok"),
            CheckResult::warn("B", "shaky"),
            CheckResult::fail("C", "broken"),
        ];
        let relaxed = build_report(checks.clone(), false);
        assert_eq!(relaxed.failures, 1);
        let strict = build_report(checks, true);
        assert_eq!(strict.failures, 2);
        assert_eq!(strict.checks[1].level, CheckLevel::Fail);
    }

    #[test]
    fn test_check_line_format() {
        let line = format_check(&CheckResult::warn("Host ports", "nearly full"));
        assert_eq!(line, "[WARN] Host ports: nearly full");
    }

    #[test]
    fn test_report_serializes_with_lowercase_levels() {
        let report = build_report(vec![CheckResult::pass("A", "ok")], false);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"level\":\"pass\""));
        assert!(json.contains("\"failures\":0"));
    }

    #[test]
    fn test_config_checks_share_one_snapshot() {
        // Both config checks consume the same injected store; duplicates
        // warn, a clean file passes.
        let clean = config_from("JUMP_HTTP_PORT=3004\n");
        assert_eq!(check_config_files(&clean).level, CheckLevel::Pass);
        assert_eq!(check_configured_http_port(&clean).level, CheckLevel::Pass);

        let duplicated = config_from("JUMP_HOST_IP=10.0.0.1\nJUMP_HOST_IP=10.0.0.2\n");
        assert_eq!(check_config_files(&duplicated).level, CheckLevel::Warn);
    }

    #[test]
    fn test_invalid_configured_port_fails() {
        let result = check_configured_http_port(&config_from("JUMP_HTTP_PORT=0\n"));
        assert_eq!(result.level, CheckLevel::Fail);
        assert!(result.details.contains("JUMP_HTTP_PORT"));
        let absent = check_configured_http_port(&config_from(""));
        assert_eq!(absent.level, CheckLevel::Pass);
    }

    #[test]
    fn test_unauthorized_device_fails_the_check() {
        let result = summarize_devices(&[
            device("A1", DeviceStatus::Device),
            device("B2", DeviceStatus::Unauthorized),
        ]);
        assert_eq!(result.level, CheckLevel::Fail);
        assert!(result.details.contains("B2"));
    }

    #[test]
    fn test_no_device_is_a_warning() {
        let result = summarize_devices(&[]);
        assert_eq!(result.level, CheckLevel::Warn);
    }

    #[test]
    fn test_ready_devices_pass() {
        let result = summarize_devices(&[
            device("A1", DeviceStatus::Device),
            device("C3", DeviceStatus::Offline),
        ]);
        assert_eq!(result.level, CheckLevel::Pass);
        assert!(result.details.contains("1 device(s) ready"));
    }
}
