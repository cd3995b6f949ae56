//! # jumprs Default-Route Probe (`common::network::route`)
//!
//! File: cli/src/common/network/route.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! Determines which network interface the operating system would use for
//! general outbound traffic. The interface ranker uses this as a scoring
//! signal only; it is not a guarantee that a device on the LAN can reach
//! that interface.
//!
//! ## Architecture
//!
//! One platform-specific routing-table query is selected at runtime from the
//! compile-time target: `ip route show default` on Linux, `route -n get
//! default` on macOS, and a `Get-NetRoute` PowerShell query on Windows. The
//! raw output is handed to a pure per-platform parser so the parsing logic
//! stays testable on every host.
//!
//! Any failure (missing tool, non-zero exit, unparseable output) degrades
//! to `None`. The ranker then simply skips the default-route bonus; probing
//! never fails the session.
//!
use std::process::Command;
use tracing::debug;

/// # Current Default-Route Interface (`default_route_interface`)
///
/// Runs the platform's routing-table query once and returns the name of the
/// interface carrying the default route, or `None` when it cannot be
/// determined. Comparison against candidate interfaces is done
/// case-insensitively by the caller.
pub fn default_route_interface() -> Option<String> {
    let (program, args): (&str, &[&str]) = if cfg!(target_os = "linux") {
        ("ip", &["-4", "route", "show", "default"])
    } else if cfg!(target_os = "macos") {
        ("route", &["-n", "get", "default"])
    } else if cfg!(target_os = "windows") {
        (
            "powershell",
            &[
                "-NoProfile",
                "-Command",
                "(Get-NetRoute -DestinationPrefix '0.0.0.0/0' | Sort-Object -Property RouteMetric | Select-Object -First 1).InterfaceAlias",
            ],
        )
    } else {
        debug!("No default-route probe for this platform; skipping bonus.");
        return None;
    };

    let output = match Command::new(program).args(args).output() {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            debug!(
                "Default-route probe '{}' exited with {:?}; skipping bonus.",
                program,
                output.status.code()
            );
            return None;
        }
        Err(e) => {
            debug!("Default-route probe '{}' failed to launch: {e}", program);
            return None;
        }
    };

    let text = String::from_utf8_lossy(&output.stdout);
    let name = if cfg!(target_os = "linux") {
        parse_linux_default_route(&text)
    } else if cfg!(target_os = "macos") {
        parse_macos_default_route(&text)
    } else {
        parse_windows_default_route(&text)
    };
    debug!("Default-route interface: {:?}", name);
    name
}

/// Extracts the token after `dev` from `ip route show default` output, e.g.
/// `default via 192.168.1.1 dev eth0 proto dhcp metric 100`.
pub fn parse_linux_default_route(output: &str) -> Option<String> {
    let first_line = output.lines().next()?;
    let mut tokens = first_line.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "dev" {
            return tokens.next().map(str::to_string);
        }
    }
    None
}

/// Extracts the `interface:` field from `route -n get default` output.
pub fn parse_macos_default_route(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        line.trim()
            .strip_prefix("interface:")
            .map(|rest| rest.trim().to_string())
            .filter(|name| !name.is_empty())
    })
}

/// The PowerShell query already prints just the alias; take the first
/// non-empty line.
pub fn parse_windows_default_route(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_linux_default_route() {
        let output = "default via 192.168.1.1 dev eth0 proto dhcp metric 100\n";
        assert_eq!(parse_linux_default_route(output), Some("eth0".to_string()));
    }

    #[test]
    fn test_parse_linux_no_dev_token() {
        assert_eq!(parse_linux_default_route("unreachable default\n"), None);
        assert_eq!(parse_linux_default_route(""), None);
    }

    #[test]
    fn test_parse_macos_default_route() {
        let output = "   route to: default\ndestination: default\n       mask: default\n    gateway: 192.168.1.1\n  interface: en0\n      flags: <UP,GATEWAY,DONE,STATIC,PRCLONING>\n";
        assert_eq!(parse_macos_default_route(output), Some("en0".to_string()));
    }

    #[test]
    fn test_parse_windows_default_route() {
        assert_eq!(
            parse_windows_default_route("\r\nEthernet 2\r\n"),
            Some("Ethernet 2".to_string())
        );
        assert_eq!(parse_windows_default_route("\r\n\r\n"), None);
    }
}
