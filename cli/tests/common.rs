//! # jumprs CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! This module provides shared utility functions and re-exports common crates
//! used across multiple integration test files (`jump.rs`, `doctor.rs`, etc.).
//! This avoids code duplication in the test suite.
//!
//! Integration tests are located in the `cli/tests/` directory and each `.rs`
//! file in that directory (that isn't a module like this one) is compiled as
//! a separate test crate linked against the main `jumprs` binary crate.
//!

// Allow potentially unused code in this common module, as different test files might use different helpers.
#![allow(dead_code)]

// Re-export common crates/modules needed by multiple test files
pub use assert_cmd::Command;

/// # Get jumprs Command (`jumprs_cmd`)
///
/// Helper function to create an `assert_cmd::Command` instance pointing to
/// the compiled `jumprs` binary target for the current test run.
///
/// ## Panics
/// Panics if the `jumprs` binary cannot be found via `Command::cargo_bin`.
///
/// ## Returns
/// * `Command` - An `assert_cmd::Command` ready to have arguments added and assertions run.
pub fn jumprs_cmd() -> Command {
    Command::cargo_bin("jumprs").expect("Failed to find jumprs binary for testing")
}

/// # Get jumprs Command In Dir (`jumprs_cmd_in`)
///
/// Same as [`jumprs_cmd`] but with the working directory pinned, so a test
/// controls exactly which `.env` files the layered configuration sees.
pub fn jumprs_cmd_in(dir: &std::path::Path) -> Command {
    let mut cmd = jumprs_cmd();
    cmd.current_dir(dir);
    cmd
}
