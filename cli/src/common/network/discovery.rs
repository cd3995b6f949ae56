//! # jumprs Network Discovery (`common::network::discovery`)
//!
//! File: cli/src/common/network/discovery.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! This module implements the two host-local discovery tasks of the
//! resolver: ranking candidate IPv4 interfaces for the address handed to the
//! device, and finding a free TCP port on the host.
//!
//! ## Architecture
//!
//! - **Candidate enumeration** walks the OS interface table once (via
//!   `systemstat`), keeping every non-loopback IPv4 address. The sequence is
//!   derived fresh per run; it is not restartable across topology changes.
//! - **Scoring** applies fixed heuristics: default-route interface match
//!   (+100), private-range membership (+40), non-virtual adapter name (+20),
//!   and a private-subnet bonus (192.168.* +10, 10.* +8, 172.16-31.* +6).
//!   The point values are frozen for behavioral compatibility; they are an
//!   empirically tuned heuristic, not a derived formula. A failed
//!   default-route probe degrades the score gracefully, it never errors.
//! - **Ordering** is a deterministic total order: score descending, then
//!   interface name ascending.
//! - **Host port probing** binds a listener on `0.0.0.0:<port>` and releases
//!   it immediately, scanning the range ascending so the lowest free port
//!   wins. Probes run strictly sequentially; the freedom guarantee is "free
//!   at time of probe", not "free at time of use" (accepted TOCTOU gap).
//!
use crate::common::network::route;
use crate::core::error::{JumprsError, PortScope, Result};
use std::net::{Ipv4Addr, TcpListener};
use std::ops::RangeInclusive;
use systemstat::{Platform, System};
use tracing::debug;

/// Inclusive port range scanned for the bridge HTTP port.
pub const JUMP_PORT_RANGE: RangeInclusive<u16> = 3000..=3010;

/// Case-insensitive name fragments identifying virtualization/VPN adapters.
const VIRTUAL_NAME_PATTERNS: &[&str] = &[
    "virtual",
    "vmware",
    "vbox",
    "virtualbox",
    "hyper-v",
    "vethernet",
    "wsl",
    "docker",
    "loopback",
    "tailscale",
    "zerotier",
    "hamachi",
    "vpn",
];

/// One scored IPv4 address on a local interface, derived fresh per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCandidate {
    pub interface_name: String,
    pub address: Ipv4Addr,
    pub is_private: bool,
    pub is_virtual: bool,
    pub score: u32,
}

/// Whether `address` falls in 10.0.0.0/8, 172.16.0.0/12, or 192.168.0.0/16.
pub fn is_private_ipv4(address: Ipv4Addr) -> bool {
    let octets = address.octets();
    octets[0] == 10
        || (octets[0] == 172 && (16..=31).contains(&octets[1]))
        || (octets[0] == 192 && octets[1] == 168)
}

/// Whether the interface name matches a known virtual-adapter pattern.
pub fn is_virtual_interface(name: &str) -> bool {
    let lowered = name.to_lowercase();
    VIRTUAL_NAME_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
}

/// Private-subnet-specific score bonus: 192.168.* > 10.* > 172.16-31.*.
fn subnet_bonus(address: Ipv4Addr) -> u32 {
    let octets = address.octets();
    if octets[0] == 192 && octets[1] == 168 {
        10
    } else if octets[0] == 10 {
        8
    } else if octets[0] == 172 && (16..=31).contains(&octets[1]) {
        6
    } else {
        0
    }
}

/// # Rank Candidates (`rank_candidates`)
///
/// Scores and orders raw `(interface, address)` pairs. Pure so the scoring
/// table stays testable without a live interface table.
pub fn rank_candidates(
    addresses: Vec<(String, Ipv4Addr)>,
    default_route: Option<&str>,
) -> Vec<InterfaceCandidate> {
    let mut candidates: Vec<InterfaceCandidate> = addresses
        .into_iter()
        .map(|(interface_name, address)| {
            let is_private = is_private_ipv4(address);
            let is_virtual = is_virtual_interface(&interface_name);
            let mut score = 0u32;
            if default_route
                .map(|route_name| route_name.eq_ignore_ascii_case(&interface_name))
                .unwrap_or(false)
            {
                score += 100;
            }
            if is_private {
                score += 40;
            }
            if !is_virtual {
                score += 20;
            }
            score += subnet_bonus(address);
            InterfaceCandidate {
                interface_name,
                address,
                is_private,
                is_virtual,
                score,
            }
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.interface_name.cmp(&b.interface_name))
    });
    candidates
}

/// # List Candidates (`list_candidates`)
///
/// Enumerates every non-loopback IPv4 address on every local interface and
/// returns them ranked. Runs the default-route probe exactly once.
pub fn list_candidates() -> Result<Vec<InterfaceCandidate>> {
    let system = System::new();
    let networks = system
        .networks()
        .map_err(|e| anyhow::anyhow!("Failed to enumerate network interfaces: {e}"))?;

    let mut addresses = Vec::new();
    for network in networks.values() {
        for entry in &network.addrs {
            if let systemstat::IpAddr::V4(address) = entry.addr {
                if address.is_loopback() {
                    continue;
                }
                addresses.push((network.name.clone(), address));
            }
        }
    }
    debug!("Found {} non-loopback IPv4 addresses", addresses.len());

    let default_route = route::default_route_interface();
    Ok(rank_candidates(addresses, default_route.as_deref()))
}

/// # Find Free Host Port (`find_free_host_port`)
///
/// Host-side port allocation. An explicitly requested port is tested once
/// and fails loudly if occupied; no fallback, the operator asked for that
/// exact port. Otherwise the range is scanned ascending and the first port
/// that accepts a bind wins; the listener is released immediately.
pub fn find_free_host_port(range: RangeInclusive<u16>, explicit: Option<u16>) -> Result<u16> {
    if let Some(port) = explicit {
        return if host_port_is_free(port) {
            Ok(port)
        } else {
            Err(JumprsError::PortBusy {
                port,
                scope: PortScope::Host,
            }
            .into())
        };
    }

    let (start, end) = (*range.start(), *range.end());
    for port in range {
        if host_port_is_free(port) {
            debug!("Host port {port} is free");
            return Ok(port);
        }
        debug!("Host port {port} is in use, advancing");
    }
    Err(JumprsError::NoFreePort {
        start,
        end,
        scope: PortScope::Host,
    }
    .into())
}

/// Bind-and-release freedom check on the wildcard address.
pub fn host_port_is_free(port: u16) -> bool {
    TcpListener::bind(("0.0.0.0", port)).is_ok()
}

/// Parses a user-supplied port value, rejecting anything outside 1-65535.
pub fn parse_port(value: &str) -> Result<u16> {
    value
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|port| *port >= 1)
        .ok_or_else(|| {
            JumprsError::Config(format!(
                "invalid port value '{value}' (expected an integer in 1-65535)"
            ))
            .into()
        })
}
