//! # jumprs Session Launcher
//!
//! File: cli/src/commands/jump/launch.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! The terminal stage of the pipeline: pure aggregation of the fully
//! resolved `SessionConfig` into a human-readable connection summary,
//! followed by the hand-off to the long-running in-container bridge command.
//! No decision logic lives here.
//!
//! The summary is deterministic for a given session so dry-run output has
//! the exact same shape as a live run under identical inputs.
//!
use crate::commands::jump::session::SessionConfig;
use crate::common::compose::{Compose, PROXY_PORT};
use crate::core::error::Result;

/// # Render Summary (`render_summary`)
///
/// Builds the multi-line connection summary: resolved IP and its source,
/// ports, transport mode, and three ready-to-use URLs (local QR/info page,
/// device connectivity test, device download test).
pub fn render_summary(session: &SessionConfig) -> String {
    let ip = session.host_ip.address;
    let http = session.container_http_port;
    let transport = if session.usb {
        "usb (reverse tunnel)"
    } else {
        "lan"
    };
    let rule = "──────────────────────────────────────────────────";
    let lines = vec![
        rule.to_string(),
        " jumprs session ready".to_string(),
        rule.to_string(),
        format!(" Platform:       {}", session.platform),
        format!(" Host IP:        {ip} ({})", session.host_ip.source),
        format!(
            " HTTP port:      {} (host) -> {http} (container)",
            session.host_http_port
        ),
        format!(" WS port:        {}", session.ws_port),
        format!(" Proxy port:     {PROXY_PORT}"),
        format!(" Transport:      {transport}"),
        format!(" QR / info:      http://127.0.0.1:{http}/_bridge/qr"),
        format!(" Device ping:    http://{ip}:{http}/_bridge/ping"),
        format!(" Download test:  http://{ip}:{http}/_bridge/download-check"),
        rule.to_string(),
    ];
    lines.join("\n")
}

/// # Launch Session (`launch`)
///
/// Prints the summary, then hands the terminal to the bridge process with
/// the resolved platform, IP, and ports as arguments.
pub async fn launch(compose: &Compose, session: &SessionConfig) -> Result<()> {
    println!("{}", render_summary(session));
    compose
        .launch_bridge(
            &session.platform.to_string(),
            &session.host_ip.address.to_string(),
            session.container_http_port,
            session.ws_port,
        )
        .await
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::jump::hostip::{IpSource, ResolvedHostIp};
    use crate::commands::jump::session::Platform;
    use std::net::Ipv4Addr;

    fn session() -> SessionConfig {
        SessionConfig {
            platform: Platform::Android,
            host_ip: ResolvedHostIp {
                address: Ipv4Addr::new(192, 168, 1, 5),
                source: IpSource::AutoDetect,
            },
            host_http_port: 3000,
            container_http_port: 3002,
            ws_port: 3031,
            usb: false,
            dry_run: false,
        }
    }

    #[test]
    fn test_summary_contains_all_connection_facts() {
        let summary = render_summary(&session());
        assert!(summary.contains("android"));
        assert!(summary.contains("192.168.1.5 (auto-detect)"));
        assert!(summary.contains("3000 (host) -> 3002 (container)"));
        assert!(summary.contains("WS port:        3031"));
        assert!(summary.contains("Proxy port:     8080"));
        assert!(summary.contains("Transport:      lan"));
        assert!(summary.contains("http://127.0.0.1:3002/_bridge/qr"));
        assert!(summary.contains("http://192.168.1.5:3002/_bridge/ping"));
        assert!(summary.contains("http://192.168.1.5:3002/_bridge/download-check"));
    }

    #[test]
    fn test_summary_is_deterministic() {
        assert_eq!(render_summary(&session()), render_summary(&session()));
    }

    #[test]
    fn test_usb_session_reports_reverse_tunnel_transport() {
        let mut usb_session = session();
        usb_session.usb = true;
        usb_session.host_ip = ResolvedHostIp {
            address: Ipv4Addr::LOCALHOST,
            source: IpSource::UsbForced,
        };
        let summary = render_summary(&usb_session);
        assert!(summary.contains("usb (reverse tunnel)"));
        assert!(summary.contains("127.0.0.1 (usb-forced)"));
    }

    #[test]
    fn test_dry_run_summary_shape_matches_live_run() {
        // Identical inputs must print identically whether or not side
        // effects were simulated.
        let mut dry = session();
        dry.dry_run = true;
        assert_eq!(render_summary(&dry), render_summary(&session()));
    }
}
