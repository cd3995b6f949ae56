//! # jumprs Host-IP Resolver
//!
//! File: cli/src/commands/jump/hostip.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! Resolves the single IP address handed to the mobile device, as a strategy
//! chain where the first matching source wins:
//!
//! 1. Explicit `--ip` literal → `explicit-flag`
//! 2. Non-empty `JUMP_HOST_IP` configuration value → `configured-env`
//! 3. USB mode → `127.0.0.1`, `usb-forced` (skips enumeration entirely)
//! 4. `--ip-mode manual` → interactive pick over ranked private candidates
//!    (all candidates when none are private); unattended terminals and
//!    dry-run silently take the top pick with a warning → `manual-select`
//! 5. Automatic → top-ranked private candidate, with an ambiguity advisory
//!    when several private candidates exist; highest-scored candidate of any
//!    kind when no private one exists → `auto-detect`
//!
//! Resolution fails only when the candidate list is empty. Exactly one
//! `ResolvedHostIp` exists per session; it is immutable after resolution.
//!
use crate::common::network::discovery::{self, InterfaceCandidate};
use crate::common::ui::prompts;
use crate::core::config::{ConfigStore, KEY_HOST_IP};
use crate::core::error::{JumprsError, Result};
use clap::ValueEnum;
use std::net::Ipv4Addr;
use std::str::FromStr;
use tracing::{info, warn};

/// How the device-facing address should be chosen when nothing pins it.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IpMode {
    /// Take the top-ranked candidate without asking.
    #[default]
    Auto,
    /// Present the ranked candidates for interactive selection.
    Manual,
}

/// Where the resolved address came from. Printed in the session summary so
/// the operator can tell a pinned address from a detected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpSource {
    ExplicitFlag,
    ConfiguredEnv,
    UsbForced,
    ManualSelect,
    AutoDetect,
}

impl std::fmt::Display for IpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            IpSource::ExplicitFlag => "explicit-flag",
            IpSource::ConfiguredEnv => "configured-env",
            IpSource::UsbForced => "usb-forced",
            IpSource::ManualSelect => "manual-select",
            IpSource::AutoDetect => "auto-detect",
        };
        write!(f, "{label}")
    }
}

/// The one address/source pair a session resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedHostIp {
    pub address: Ipv4Addr,
    pub source: IpSource,
}

/// Inputs to resolution, extracted from the invocation options.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub explicit_ip: Option<&'a str>,
    pub mode: IpMode,
    pub usb: bool,
    pub dry_run: bool,
}

/// # Resolve Host IP (`resolve`)
///
/// Walks the strategy chain described in the module docs. Interface
/// enumeration only happens once the explicit/configured/USB strategies
/// have all declined.
pub fn resolve(request: ResolveRequest<'_>, config: &ConfigStore) -> Result<ResolvedHostIp> {
    // 1. Explicit flag.
    if let Some(literal) = request.explicit_ip {
        let address = parse_ipv4(literal, "--ip")?;
        return Ok(ResolvedHostIp {
            address,
            source: IpSource::ExplicitFlag,
        });
    }

    // 2. Configured override (non-empty by ConfigStore contract).
    if let Some(configured) = config.get(KEY_HOST_IP) {
        let address = parse_ipv4(configured, KEY_HOST_IP)?;
        return Ok(ResolvedHostIp {
            address,
            source: IpSource::ConfiguredEnv,
        });
    }

    // 3. USB transport talks to the host through the reverse tunnel.
    if request.usb {
        return Ok(ResolvedHostIp {
            address: Ipv4Addr::LOCALHOST,
            source: IpSource::UsbForced,
        });
    }

    let candidates = discovery::list_candidates()?;

    // 4. Manual selection.
    if request.mode == IpMode::Manual {
        let address = select_manually(&candidates, request.dry_run)?;
        return Ok(ResolvedHostIp {
            address,
            source: IpSource::ManualSelect,
        });
    }

    // 5. Automatic pick.
    let chosen = pick_automatic(&candidates)?;
    if let Some(advisory) = ambiguity_advisory(&candidates) {
        warn!("{advisory}");
    }
    info!(
        "Auto-detected host IP {} on interface {} (score {})",
        chosen.address, chosen.interface_name, chosen.score
    );
    Ok(ResolvedHostIp {
        address: chosen.address,
        source: IpSource::AutoDetect,
    })
}

/// # Automatic Pick (`pick_automatic`)
///
/// Top-ranked private candidate, falling back to the top-ranked candidate of
/// any kind. Fails only on an empty candidate list.
pub fn pick_automatic(candidates: &[InterfaceCandidate]) -> Result<&InterfaceCandidate> {
    candidates
        .iter()
        .find(|candidate| candidate.is_private)
        .or_else(|| candidates.first())
        .ok_or_else(|| JumprsError::NoUsableInterface.into())
}

/// # Ambiguity Advisory (`ambiguity_advisory`)
///
/// When several private candidates scored, the top pick may still be the
/// wrong adapter for the device's network. Advisory only, never fatal.
pub fn ambiguity_advisory(candidates: &[InterfaceCandidate]) -> Option<String> {
    let private: Vec<&InterfaceCandidate> = candidates
        .iter()
        .filter(|candidate| candidate.is_private && candidate.score > 0)
        .collect();
    if private.len() < 2 {
        return None;
    }
    let listing = private
        .iter()
        .map(|candidate| {
            format!(
                "{}:{} (score {})",
                candidate.interface_name, candidate.address, candidate.score
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "Multiple private interfaces detected ({listing}). Proceeding with the top-ranked one; \
         set {KEY_HOST_IP} to pin a specific adapter."
    ))
}

/// Interactive pick over the ranked private candidates, with the documented
/// unattended/dry-run fallback to the top-ranked one.
fn select_manually(candidates: &[InterfaceCandidate], dry_run: bool) -> Result<Ipv4Addr> {
    let private: Vec<&InterfaceCandidate> = candidates
        .iter()
        .filter(|candidate| candidate.is_private)
        .collect();
    let pool: Vec<&InterfaceCandidate> = if private.is_empty() {
        candidates.iter().collect()
    } else {
        private
    };
    let top = pool
        .first()
        .ok_or_else(|| anyhow::Error::from(JumprsError::NoUsableInterface))?;

    if dry_run || !prompts::is_attended() {
        warn!(
            "Manual IP selection requested but no interactive prompt is possible; \
             using top-ranked candidate {} ({})",
            top.address, top.interface_name
        );
        return Ok(top.address);
    }

    let items: Vec<String> = pool
        .iter()
        .map(|candidate| {
            format!(
                "{} ({}) [score {}]",
                candidate.interface_name, candidate.address, candidate.score
            )
        })
        .collect();
    let index = prompts::select_index("Select the host IP to hand to the device", &items)?;
    Ok(pool[index].address)
}

fn parse_ipv4(value: &str, origin: &str) -> Result<Ipv4Addr> {
    Ipv4Addr::from_str(value.trim()).map_err(|_| {
        JumprsError::Config(format!("invalid IPv4 address '{value}' from {origin}")).into()
    })
}
