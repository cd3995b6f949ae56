//! # jumprs Device Bridge (`common::adb`)
//!
//! File: cli/src/common/adb/mod.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! USB fallback transport: enumerates attached Android devices through the
//! `adb` device-bridge tool and establishes reverse port forwards so a
//! USB-connected device can reach the bridge on `127.0.0.1`.
//!
//! ## Architecture
//!
//! The stage runs only when USB mode is requested (and only for the Android
//! platform; the caller rejects the iOS/USB combination before any
//! resolution starts). Ordering inside the stage:
//!
//! 1. Verify `adb` is reachable at all (remediation hint otherwise).
//! 2. Enumerate attached devices fresh (`DeviceRecord` is ephemeral).
//! 3. If **any** device is unauthorized, fail before issuing a single
//!    reverse-mapping command; partial tunnel state is worse than none.
//! 4. If zero devices are ready, fail.
//! 5. For every ready device, establish two reverse mappings (HTTP and WS),
//!    host-port equal to device-port by convention: 2×N commands total.
//!
//! Dry-run sessions print the intended reverse mappings without touching a
//! device.
//!
use crate::common::process::Runner;
use crate::core::error::{JumprsError, Result};
use tracing::{debug, info};

/// Connection state reported by the device bridge for one attached device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceStatus {
    /// Ready for commands.
    Device,
    /// Attached but the USB debugging prompt was not accepted.
    Unauthorized,
    /// Attached but not responding.
    Offline,
    /// Any other state string the tool reports.
    Other(String),
}

/// One attached device, queried fresh each USB-mode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub serial: String,
    pub status: DeviceStatus,
}

/// Wrapper over the `adb` executable, dry-run aware via the shared runner.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    runner: Runner,
}

impl AdbBridge {
    pub fn new(runner: Runner) -> Self {
        Self { runner }
    }

    /// # Ensure Available (`ensure_available`)
    ///
    /// Confirms the device-bridge executable can be launched at all. Failing
    /// here produces a tooling error with a remediation hint rather than a
    /// confusing enumeration failure later.
    pub async fn ensure_available(&self) -> Result<()> {
        if self.runner.is_dry_run() {
            return Ok(());
        }
        let probe = self.runner.run_capture("adb", &["version"]).await;
        match probe {
            Ok(output) if output.success => Ok(()),
            Ok(output) => Err(JumprsError::Tooling {
                tool: "adb".to_string(),
                hint: format!(
                    "`adb version` failed: {}. Install Android platform-tools and re-run.",
                    if output.stderr.is_empty() {
                        output.stdout
                    } else {
                        output.stderr
                    }
                ),
            }
            .into()),
            Err(_) => Err(JumprsError::Tooling {
                tool: "adb".to_string(),
                hint: "Install Android platform-tools and ensure `adb` is on PATH.".to_string(),
            }
            .into()),
        }
    }

    /// # List Devices (`list_devices`)
    ///
    /// Runs `adb devices` and parses the attached-device table.
    pub async fn list_devices(&self) -> Result<Vec<DeviceRecord>> {
        let output = self.runner.run_capture("adb", &["devices"]).await?;
        if !output.success {
            return Err(JumprsError::Tooling {
                tool: "adb".to_string(),
                hint: format!("`adb devices` failed: {}", output.stderr),
            }
            .into());
        }
        Ok(parse_devices_output(&output.stdout))
    }

    /// # Set Up Reverse Tunnels (`setup_reverse_tunnels`)
    ///
    /// Establishes `adb reverse tcp:<port> tcp:<port>` for the HTTP and WS
    /// ports on every ready device. An unauthorized device anywhere in the
    /// list aborts the stage before the first mapping is issued.
    pub async fn setup_reverse_tunnels(&self, http_port: u16, ws_port: u16) -> Result<()> {
        if self.runner.is_dry_run() {
            // No device to enumerate; print the intended per-device mappings.
            for port in [http_port, ws_port] {
                println!("[dry-run] adb -s <serial> reverse tcp:{port} tcp:{port}");
            }
            return Ok(());
        }

        let devices = self.list_devices().await?;
        debug!("Device bridge reported {} attached device(s)", devices.len());
        let ready = select_ready_devices(&devices)?;

        for record in ready {
            for port in [http_port, ws_port] {
                let spec = format!("tcp:{port}");
                info!("Reverse mapping {spec} on device {}", record.serial);
                let output = self
                    .runner
                    .run_capture("adb", &["-s", &record.serial, "reverse", &spec, &spec])
                    .await?;
                if !output.success {
                    return Err(JumprsError::ExternalCommand {
                        cmd: format!("adb -s {} reverse {spec} {spec}", record.serial),
                        status: output.code.map_or("?".to_string(), |c| c.to_string()),
                        output: output.stderr,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// # Select Ready Devices (`select_ready_devices`)
///
/// Gatekeeper for the tunnel stage: an unauthorized device anywhere in the
/// list fails the whole stage (no tunnels for any device), and an empty
/// ready set fails too. Returns the devices eligible for reverse mappings.
pub fn select_ready_devices(devices: &[DeviceRecord]) -> Result<Vec<&DeviceRecord>> {
    if let Some(unauthorized) = devices
        .iter()
        .find(|record| record.status == DeviceStatus::Unauthorized)
    {
        return Err(JumprsError::DeviceUnauthorized {
            serial: unauthorized.serial.clone(),
        }
        .into());
    }
    let ready: Vec<&DeviceRecord> = devices
        .iter()
        .filter(|record| record.status == DeviceStatus::Device)
        .collect();
    if ready.is_empty() {
        return Err(JumprsError::NoReadyDevice.into());
    }
    Ok(ready)
}

/// Parses `adb devices` output: a banner line, then one `<serial>\t<status>`
/// row per device.
pub fn parse_devices_output(output: &str) -> Vec<DeviceRecord> {
    output
        .lines()
        .skip(1) // "List of devices attached"
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let serial = fields.next()?.to_string();
            let status = match fields.next()? {
                "device" => DeviceStatus::Device,
                "unauthorized" => DeviceStatus::Unauthorized,
                "offline" => DeviceStatus::Offline,
                other => DeviceStatus::Other(other.to_string()),
            };
            Some(DeviceRecord { serial, status })
        })
        .collect()
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::process::ExecMode;
    use std::path::Path;

    #[test]
    fn test_parse_devices_output() {
        let output = "List of devices attached\nemulator-5554\tdevice\nR58M123ABC\tunauthorized\nXY99\toffline\n";
        let devices = parse_devices_output(output);
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].serial, "emulator-5554");
        assert_eq!(devices[0].status, DeviceStatus::Device);
        assert_eq!(devices[1].status, DeviceStatus::Unauthorized);
        assert_eq!(devices[2].status, DeviceStatus::Offline);
    }

    #[test]
    fn test_parse_devices_output_empty_table() {
        let output = "List of devices attached\n\n";
        assert!(parse_devices_output(output).is_empty());
    }

    #[test]
    fn test_parse_devices_output_unknown_status() {
        let devices = parse_devices_output("List of devices attached\nserial1\trecovery\n");
        assert_eq!(devices[0].status, DeviceStatus::Other("recovery".into()));
    }

    #[test]
    fn test_unauthorized_device_blocks_all_tunnels() {
        // Even with a ready device present, one unauthorized device fails
        // the stage before any reverse mapping would be issued.
        let devices = vec![
            DeviceRecord {
                serial: "ready-1".into(),
                status: DeviceStatus::Device,
            },
            DeviceRecord {
                serial: "locked-2".into(),
                status: DeviceStatus::Unauthorized,
            },
        ];
        let err = select_ready_devices(&devices).unwrap_err();
        let jumprs_err = err.downcast_ref::<JumprsError>().unwrap();
        assert!(matches!(
            jumprs_err,
            JumprsError::DeviceUnauthorized { serial } if serial == "locked-2"
        ));
    }

    #[test]
    fn test_no_ready_device_fails() {
        let devices = vec![DeviceRecord {
            serial: "sleepy".into(),
            status: DeviceStatus::Offline,
        }];
        let err = select_ready_devices(&devices).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JumprsError>().unwrap(),
            JumprsError::NoReadyDevice
        ));
    }

    #[test]
    fn test_ready_devices_are_all_selected() {
        let devices = vec![
            DeviceRecord {
                serial: "a".into(),
                status: DeviceStatus::Device,
            },
            DeviceRecord {
                serial: "b".into(),
                status: DeviceStatus::Device,
            },
        ];
        assert_eq!(select_ready_devices(&devices).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dry_run_never_touches_a_device() {
        let bridge = AdbBridge::new(Runner::new(ExecMode::DryRun, Path::new(".")));
        assert!(bridge.ensure_available().await.is_ok());
        assert!(bridge.setup_reverse_tunnels(3000, 3031).await.is_ok());
    }
}
