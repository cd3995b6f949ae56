//! # jumprs Jump Command Group
//!
//! File: cli/src/commands/jump/mod.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! This module implements `jumprs jump`, the end-to-end session: it
//! reconciles host network interfaces, layered configuration, per-platform
//! default-route detection, host and container port availability, and the
//! device-bridge tool into one consistent, side-effect-producing bridge
//! launch. The pipeline is safe to simulate (`--dry-run`) and idempotent to
//! re-run.
//!
//! ## Architecture
//!
//! Stages run strictly sequentially, each depending on the previous stage's
//! resolved value; data flows strictly downward:
//!
//! 1. Argument validation (configuration errors fail before any effect)
//! 2. Config snapshot load + duplicate-key warnings
//! 3. Host-IP resolution (`hostip`)
//! 4. Host-scope port selection (`common::network::discovery`)
//! 5. Container orchestration: up, verify, patch, verify-patch
//!    (`common::compose`)
//! 6. Container-scope port negotiation (scans upward from the host pick)
//! 7. `SessionConfig` assembly (`session`), only after full resolution
//! 8. USB reverse tunnels when requested (`common::adb`)
//! 9. Connection summary + bridge hand-off (`launch`)
//!
//! ## Examples
//!
//! ```bash
//! # LAN session for an Android device, auto-detected host IP
//! jumprs jump android
//!
//! # Pin the address and port explicitly
//! jumprs jump android --ip 192.168.1.50 --http-port 3000
//!
//! # Choose the adapter interactively
//! jumprs jump ios --ip-mode manual
//!
//! # USB fallback transport (android only)
//! jumprs jump android --usb
//!
//! # Simulate without touching the container runtime or a device
//! jumprs jump android --dry-run
//! ```
//!
use crate::common::adb::AdbBridge;
use crate::common::compose::Compose;
use crate::common::network::discovery::{self, JUMP_PORT_RANGE};
use crate::common::process::{ExecMode, Runner};
use crate::core::config::ConfigStore;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};

/// Implements host-IP resolution (strategy chain over flag/config/usb/manual/auto).
pub mod hostip;
/// Implements the connection summary and the final bridge hand-off.
mod launch;
/// Defines the `SessionConfig` aggregate and pre-flight validation.
pub mod session;

use hostip::{IpMode, ResolveRequest};
use session::{Platform, SessionConfig};

/// # Jump Command Arguments (`JumpArgs`)
///
/// Invocation surface of the session: a platform selector plus the
/// connectivity options. Unrecognized options are a hard clap parse error.
#[derive(Parser, Debug)]
#[command(about = "Resolve connectivity and launch a bridge session for a mobile device")]
pub struct JumpArgs {
    /// Target mobile platform.
    #[arg(value_enum)]
    platform: Platform,

    /// Explicit host IP to hand to the device (skips detection).
    #[arg(long)]
    ip: Option<String>,

    /// How to pick the host IP when nothing pins it.
    #[arg(long, value_enum, default_value_t = IpMode::Auto)]
    ip_mode: IpMode,

    /// Explicit bridge HTTP port. Fails loudly if busy; no fallback.
    /// Port 0 is rejected at parse time: binding it always succeeds with an
    /// OS-assigned ephemeral port, which would defeat the busy check.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    http_port: Option<u16>,

    /// Use the USB reverse-tunnel transport (android only).
    #[arg(long)]
    usb: bool,

    /// Simulate the session: print intended commands, no side effects.
    #[arg(long)]
    dry_run: bool,
}

/// # Handle Jump Command (`handle_jump`)
///
/// The top-level driver of the resolver pipeline. All resolution must
/// succeed before the first side effect; afterwards failures surface
/// unchanged (no rollback, no automatic retry).
pub async fn handle_jump(args: JumpArgs) -> Result<()> {
    info!("Handling jump command...");
    debug!("Jump args: {:?}", args);

    // 1. Pure configuration checks, before any resolution or effect.
    session::validate_usb_platform(args.platform, args.usb)?;

    // 2. Configuration snapshot. Duplicate keys are warnings by design.
    let root_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = ConfigStore::load(&root_dir)?;
    for warning in config.duplicate_warnings() {
        warn!("{warning}");
    }

    // 3. Host IP.
    let host_ip = hostip::resolve(
        ResolveRequest {
            explicit_ip: args.ip.as_deref(),
            mode: args.ip_mode,
            usb: args.usb,
            dry_run: args.dry_run,
        },
        &config,
    )?;
    println!("Using host IP: {} ({})", host_ip.address, host_ip.source);

    // 4. Host-scope port selection. The explicit request (flag or config)
    //    is validated once; only the automatic scan may advance.
    let requested = session::requested_http_port(args.http_port, &config)?;
    let host_http_port = discovery::find_free_host_port(JUMP_PORT_RANGE, requested)?;
    let ws_port = session::resolve_ws_port(&config)?;
    println!("Using HTTP port: {host_http_port} (host), WS port: {ws_port}");

    // 5. Side effects begin: bring up and verify the stack.
    let mode = if args.dry_run {
        ExecMode::DryRun
    } else {
        ExecMode::Real
    };
    let runner = Runner::new(mode, &root_dir);
    let compose = Compose::new(runner.clone());
    compose.up(host_http_port, ws_port).await?;
    compose.verify_bridge_running().await?;
    compose.patch_router().await?;
    compose.verify_router_patch().await?;

    // 6. Container-scope negotiation: the host pick is the default goal and
    //    only advances on conflict inside the service.
    let container_http_port = compose
        .find_free_container_port(host_http_port, requested)
        .await?;
    if container_http_port != host_http_port {
        warn!(
            "Host port {host_http_port} is occupied inside the bridge service; \
             using {container_http_port} instead"
        );
    }

    // 7. Fully resolved session, read-only from here on.
    let session = SessionConfig {
        platform: args.platform,
        host_ip,
        host_http_port,
        container_http_port,
        ws_port,
        usb: args.usb,
        dry_run: args.dry_run,
    };

    // 8. USB fallback transport.
    if session.usb {
        let adb = AdbBridge::new(runner.clone());
        adb.ensure_available().await?;
        adb.setup_reverse_tunnels(session.container_http_port, session.ws_port)
            .await?;
    }

    // 9. Summary and hand-off to the long-running bridge.
    launch::launch(&compose, &session).await
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    /// Test parsing of the platform selector and defaults.
    #[test]
    fn test_parses_minimal_invocation() {
        let args = JumpArgs::try_parse_from(["jump", "android"]).unwrap();
        assert_eq!(args.platform, Platform::Android);
        assert_eq!(args.ip_mode, IpMode::Auto);
        assert!(!args.usb);
        assert!(!args.dry_run);
        assert!(args.ip.is_none());
        assert!(args.http_port.is_none());
    }

    #[test]
    fn test_parses_full_option_set() {
        let args = JumpArgs::try_parse_from([
            "jump",
            "ios",
            "--ip",
            "192.168.1.50",
            "--ip-mode",
            "manual",
            "--http-port",
            "3004",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.platform, Platform::Ios);
        assert_eq!(args.ip.as_deref(), Some("192.168.1.50"));
        assert_eq!(args.ip_mode, IpMode::Manual);
        assert_eq!(args.http_port, Some(3004));
        assert!(args.dry_run);
    }

    #[test]
    fn test_rejects_unknown_platform() {
        assert!(JumpArgs::try_parse_from(["jump", "windows-phone"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_option() {
        assert!(JumpArgs::try_parse_from(["jump", "android", "--turbo"]).is_err());
    }

    #[test]
    fn test_rejects_malformed_port() {
        assert!(JumpArgs::try_parse_from(["jump", "android", "--http-port", "eighty"]).is_err());
        assert!(JumpArgs::try_parse_from(["jump", "android", "--http-port", "70000"]).is_err());
        // Port 0 would bind an OS-assigned ephemeral port instead of failing
        // the busy check, so it must not survive argument parsing.
        assert!(JumpArgs::try_parse_from(["jump", "android", "--http-port", "0"]).is_err());
        assert!(JumpArgs::try_parse_from(["jump", "android", "--http-port", "1"]).is_ok());
    }
}
