//! # jumprs UI Utilities Module (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! Terminal user-interface helpers shared across commands.
//!
//! ## Architecture
//!
//! - **`prompts`**: interactive selection built on `dialoguer`, plus the
//!   attended-terminal check used to decide whether prompting is possible at
//!   all. Manual host-IP selection is the only consumer today.
//!

/// Interactive terminal prompts (selection lists, attended check).
pub mod prompts;
