//! # jumprs Interactive Prompts (`common::ui::prompts`)
//!
//! File: cli/src/common/ui/prompts.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! Thin wrappers around `dialoguer` so command code never talks to the
//! terminal library directly. Callers are expected to check `is_attended`
//! first: prompting an unattended terminal (CI, piped stdin) would hang, so
//! the host-IP resolver silently falls back to its top-ranked candidate in
//! that case.
//!
use crate::core::error::Result;
use anyhow::Context;
use dialoguer::Select;

/// Whether an interactive terminal is attached to this process.
pub fn is_attended() -> bool {
    dialoguer::console::user_attended()
}

/// # Select From List (`select_index`)
///
/// Presents a selection list and returns the chosen index. The first item
/// is the default so pressing Enter accepts the top-ranked option.
pub fn select_index(prompt: &str, items: &[String]) -> Result<usize> {
    Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
        .context("Interactive selection failed")
}
