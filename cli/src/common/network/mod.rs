//! # jumprs Network Utilities Module (`common::network`)
//!
//! File: cli/src/common/network/mod.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! Host-local network discovery for the connectivity resolver.
//!
//! ## Architecture
//!
//! - **`discovery`**: enumerates and ranks local IPv4 interface candidates,
//!   and scans for a free host TCP port in the bridge range.
//! - **`route`**: the platform-specific default-route probe used as a
//!   ranking signal by `discovery`.
//!
//! Container-side port probing lives with the orchestrator in
//! `common::compose`, since it runs inside the bridge service rather than on
//! the host network namespace.
//!

/// Interface candidate ranking and host port scanning.
pub mod discovery;
/// Platform-specific default-route interface detection.
pub mod route;
