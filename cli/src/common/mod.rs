//! # jumprs Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! This module serves as the root and organizational entry point for the
//! shared utility modules used throughout the jumprs CLI. It aggregates the
//! cross-cutting concerns of the connectivity resolver: external process
//! execution, network discovery, container orchestration, device-bridge
//! interaction, and terminal UI.
//!
//! By centralizing these under the `common::` namespace, jumprs keeps a
//! clear separation between command-specific logic (`commands::`) and core
//! infrastructure (`core::`).
//!
//! ## Architecture
//!
//! - **`adb`**: Android device-bridge wrapper (device enumeration, reverse
//!   port mappings for the USB fallback transport).
//! - **`compose`**: container lifecycle orchestration (`docker compose` up,
//!   running-state verification, router patching, in-container port probe,
//!   bridge launch).
//! - **`network`**: host-local discovery (interface candidate ranking,
//!   default-route probe, host port scanning).
//! - **`process`**: the dry-run-aware effect executor every side-effecting
//!   stage runs its external commands through.
//! - **`ui`**: terminal prompts for interactive selection.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::{compose::Compose, process::{ExecMode, Runner}};
//! use crate::core::error::Result;
//! use std::path::Path;
//!
//! # async fn run_example() -> Result<()> {
//! let runner = Runner::new(ExecMode::DryRun, Path::new("."));
//! let compose = Compose::new(runner);
//! compose.verify_bridge_running().await?;
//! # Ok(())
//! # }
//! ```
//!

/// Android device-bridge interaction (enumeration, reverse tunnels).
pub mod adb;
/// Container lifecycle orchestration and in-container probes.
pub mod compose;
/// Network discovery (interface ranking, route probe, host ports).
pub mod network;
/// Dry-run-aware external process execution.
pub mod process;
/// Terminal user-interface elements (prompts).
pub mod ui;
