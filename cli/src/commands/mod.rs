//! # jumprs Commands Module (`commands`)
//!
//! File: cli/src/commands/mod.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! Organizational root for the CLI's command groups. Each subcommand lives
//! in its own submodule with its clap argument struct and `handle_*` entry
//! point; `main.rs` only parses and dispatches.
//!
//! ## Architecture
//!
//! - **`jump`**: the end-to-end connectivity resolver and bridge session
//!   launcher.
//! - **`doctor`**: the read-only environment diagnostic built from the same
//!   probes.
//!

/// Environment diagnostic (`jumprs doctor`).
pub mod doctor;
/// Connectivity resolution and bridge session launch (`jumprs jump`).
pub mod jump;
