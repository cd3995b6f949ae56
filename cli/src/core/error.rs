//! # jumprs Error Types
//!
//! File: cli/src/core/error.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! This module defines the error types and error handling mechanisms used
//! throughout the jumprs application. It provides a consistent approach to
//! error management with detailed error information and context.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `JumprsError`: A custom error enum using `thiserror` for specific error types
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! The error taxonomy follows the resolver pipeline:
//! - Configuration errors (invalid mode, unsupported platform/USB combination,
//!   malformed port): detected before any external effect.
//! - Environment/tooling errors (missing `adb`, missing container runtime,
//!   no usable interface): reported with a remediation hint.
//! - Resource-contention errors (explicitly requested port busy on the host or
//!   inside the container): reported with the exact value and scope.
//! - Authorization errors (unauthorized attached device): abort the whole
//!   tunnel stage, no partial state.
//! - Integrity errors (router file missing, patch verification failed):
//!   distinct from "service not running" because the bring-up succeeded but
//!   proxy behavior is still broken.
//!
//! No error is retried automatically; every stage surfaces failures to the
//! top-level driver, which prints the message (augmenting known substrings
//! with a longer remediation hint) and exits non-zero.
//!
use thiserror::Error;

/// Which TCP port namespace a port check ran against.
///
/// The host and the bridge service do not share a network namespace, so
/// "port 3000 is busy" is meaningless without saying where it was tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortScope {
    /// Checked by binding a listener on the host (`0.0.0.0:<port>`).
    Host,
    /// Checked by a one-shot probe executed inside the running bridge service.
    Container,
}

impl std::fmt::Display for PortScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortScope::Host => write!(f, "host"),
            PortScope::Container => write!(f, "container"),
        }
    }
}

/// Custom error type for the jumprs application.
#[derive(Error, Debug)]
pub enum JumprsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Required tool '{tool}' is not available. {hint}")]
    Tooling { tool: String, hint: String },

    #[error("Port {port} is already in use ({scope} scope). It was explicitly requested, so no fallback is attempted.")]
    PortBusy { port: u16, scope: PortScope },

    #[error("No free port found in range {start}-{end} ({scope} scope).")]
    NoFreePort {
        start: u16,
        end: u16,
        scope: PortScope,
    },

    #[error("No usable IPv4 network interface found. Set JUMP_HOST_IP in .env or pass --ip.")]
    NoUsableInterface,

    #[error("Device '{serial}' is unauthorized. Accept the USB debugging prompt on the device and re-run. No tunnels were established.")]
    DeviceUnauthorized { serial: String },

    #[error("No ready device attached. Connect a device or start an emulator, then re-run.")]
    NoReadyDevice,

    #[error("Service '{name}' is not reported running by the container runtime.")]
    ServiceNotRunning { name: String },

    #[error("Bridge router file '{path}' is missing inside the bridge service.")]
    RouterFileMissing { path: String },

    #[error("Bridge router at '{path}' still strips the 'host' header after patching; device requests would break same-origin checks.")]
    RouterPatchFailed { path: String },

    #[error("External command failed: {cmd}, Status: {status}, Output:\n{output}")]
    ExternalCommand {
        cmd: String,
        status: String,
        output: String,
    },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
/// Anyhow allows for easy context addition and flexible error handling.
pub type Result<T> = anyhow::Result<T>;

/// # Remediation Hint (`remediation_hint`)
///
/// Maps known failure substrings to a longer operator-facing hint. The
/// top-level driver prints the hint on stderr before the error itself, so a
/// bare "Command failed (docker compose ps ...)" becomes actionable.
///
/// Returns `None` when no hint applies.
pub fn remediation_hint(err: &anyhow::Error) -> Option<&'static str> {
    let message = format!("{err:#}");
    if message.contains("docker compose ps") {
        return Some(
            "The container runtime is unavailable or the bridge service is not running. \
             Start Docker, then bring the stack up with: docker compose up -d",
        );
    }
    if message.contains("'adb' is not available")
        || message.contains("Failed to execute command 'adb'")
    {
        return Some(
            "The Android device bridge was not found on PATH. Install Android platform-tools \
             and ensure `adb` is reachable, then re-run.",
        );
    }
    None
}
