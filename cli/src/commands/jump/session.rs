//! # jumprs Session Configuration
//!
//! File: cli/src/commands/jump/session.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! The `SessionConfig` aggregate: platform, resolved host IP, negotiated
//! ports, and transport flags. Built exactly once per invocation, consumed
//! read-only by every downstream stage, never mutated mid-session, and never
//! persisted across invocations.
//!
//! A `SessionConfig` is only constructed after **all** upstream resolution
//! succeeded; the pipeline aborts before any side effect otherwise, so the
//! container orchestrator never sees a partially resolved session.
//!
use crate::commands::jump::hostip::ResolvedHostIp;
use crate::common::network::discovery::parse_port;
use crate::core::config::{ConfigStore, KEY_HTTP_PORT, KEY_WS_PORT};
use crate::core::error::{JumprsError, Result};
use clap::ValueEnum;

/// WebSocket port used when no `JUMP_WS_PORT` override is configured. Host
/// and container sides share the same number by convention.
pub const DEFAULT_WS_PORT: u16 = 3031;

/// Mobile platform the bridge session targets.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// Only Android supports the USB reverse-tunnel transport.
    pub fn supports_usb(self) -> bool {
        matches!(self, Platform::Android)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Android => write!(f, "android"),
            Platform::Ios => write!(f, "ios"),
        }
    }
}

/// Fully resolved connectivity parameters for one bridge session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub platform: Platform,
    pub host_ip: ResolvedHostIp,
    /// HTTP port chosen on the host, before container negotiation.
    pub host_http_port: u16,
    /// Final HTTP port, validated free inside the bridge service. May differ
    /// from `host_http_port` when that port is occupied in the container.
    pub container_http_port: u16,
    /// WebSocket port; host and container share the number by convention.
    pub ws_port: u16,
    pub usb: bool,
    pub dry_run: bool,
}

/// # Validate Platform/USB Combination (`validate_usb_platform`)
///
/// USB mode on a platform without reverse-tunnel support is a configuration
/// error, rejected before any resolution begins.
pub fn validate_usb_platform(platform: Platform, usb: bool) -> Result<()> {
    if usb && !platform.supports_usb() {
        return Err(JumprsError::Config(format!(
            "--usb is not supported for platform '{platform}'; only android devices \
             support reverse tunnels"
        ))
        .into());
    }
    Ok(())
}

/// # Requested HTTP Port (`requested_http_port`)
///
/// An explicit `--http-port` flag outranks a configured `JUMP_HTTP_PORT`.
/// Either counts as an explicit request: the allocators validate it once and
/// fail loudly instead of falling back. `None` means "scan the range".
pub fn requested_http_port(flag: Option<u16>, config: &ConfigStore) -> Result<Option<u16>> {
    if let Some(port) = flag {
        return Ok(Some(port));
    }
    match config.get(KEY_HTTP_PORT) {
        Some(value) => parse_port(value)
            .map(Some)
            .map_err(|_| JumprsError::Config(format!("{KEY_HTTP_PORT} is invalid: '{value}'")).into()),
        None => Ok(None),
    }
}

/// # Resolve WS Port (`resolve_ws_port`)
///
/// Configured override or the fixed default. Not scanned: the WS port is a
/// convention shared with the in-container bridge configuration.
pub fn resolve_ws_port(config: &ConfigStore) -> Result<u16> {
    match config.get(KEY_WS_PORT) {
        Some(value) => parse_port(value)
            .map_err(|_| JumprsError::Config(format!("{KEY_WS_PORT} is invalid: '{value}'")).into()),
        None => Ok(DEFAULT_WS_PORT),
    }
}
