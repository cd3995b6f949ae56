//! # jumprs Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! This module provides the single choke point through which every external
//! command in the pipeline runs: container lifecycle commands, device-bridge
//! commands, and remote probes. It wraps `tokio::process::Command` behind a
//! `Runner` that is constructed once per session and injected into every
//! side-effecting stage.
//!
//! ## Architecture
//!
//! - **`Runner`**: carries the execution mode and the working directory.
//!   In `Real` mode commands are performed; in `DryRun` mode the intended
//!   invocation is printed (`[dry-run] ...`) and a synthetic success is
//!   returned. Stages never branch between real and simulated code paths
//!   themselves; they always call the same method.
//! - **`run_streamed`**: for interactive/long-running commands; inherits the
//!   caller's stdio so the user sees output live. Non-zero exit is an error.
//! - **`run_capture`**: for probing commands; captures stdout/stderr for
//!   parsing and reports the exit status without treating non-zero as fatal
//!   (probes interpret the status themselves).
//!
//! No command has a timeout: a hung external tool blocks the session. This
//! is a known limitation of the design, accepted for a human-triggered,
//! low-frequency operation.
//!
use crate::core::error::{JumprsError, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, info};

/// Execution mode selected once at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Perform external commands and return their actual results.
    Real,
    /// Print the intended invocation and return a synthetic success.
    DryRun,
}

/// Captured result of a probing command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Raw exit code when one was reported.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Synthetic success used by dry-run mode. Stdout is empty, so probe
    /// call sites that need parsed output must short-circuit before calling.
    fn synthetic() -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Dry-run aware executor for external commands.
#[derive(Debug, Clone)]
pub struct Runner {
    mode: ExecMode,
    cwd: PathBuf,
}

impl Runner {
    pub fn new(mode: ExecMode, cwd: &Path) -> Self {
        Self {
            mode,
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.mode == ExecMode::DryRun
    }

    /// # Run Streamed Command (`run_streamed`)
    ///
    /// Executes an external command with inherited stdio, optionally with
    /// extra environment variables. Fails if the command cannot be launched
    /// or exits non-zero.
    pub async fn run_streamed(
        &self,
        program: &str,
        args: &[&str],
        envs: &[(&str, String)],
    ) -> Result<()> {
        if self.is_dry_run() {
            println!("[dry-run] cwd={}", self.cwd.display());
            println!("[dry-run] {} {}", program, args.join(" "));
            return Ok(());
        }

        info!("Executing command: {} {:?}", program, args);
        let mut command = tokio::process::Command::new(program);
        command.args(args);
        command.current_dir(&self.cwd);
        for (key, value) in envs {
            command.env(key, value);
        }

        // Inherit stdio so the user sees output (e.g., compose progress, the
        // long-running bridge session itself).
        command.stdout(Stdio::inherit());
        command.stderr(Stdio::inherit());
        command.stdin(Stdio::inherit());

        let status = command.status().await.with_context(|| {
            format!(
                "Failed to execute command '{}'. Is it installed and in PATH?",
                program
            )
        })?;

        if !status.success() {
            let exit_code = status.code().map_or("?".to_string(), |c| c.to_string());
            return Err(JumprsError::ExternalCommand {
                cmd: format!("{} {}", program, args.join(" ")),
                status: exit_code,
                output: "Command failed. See terminal output above for details.".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// # Run Capturing Command (`run_capture`)
    ///
    /// Executes a probing command with stdout/stderr captured for parsing.
    /// A non-zero exit is *not* an error here; callers inspect `success`.
    /// Launch failure (e.g., binary not found) is an error.
    pub async fn run_capture(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        if self.is_dry_run() {
            println!("[dry-run] {} {}", program, args.join(" "));
            return Ok(CommandOutput::synthetic());
        }

        debug!("Probing command: {} {:?}", program, args);
        let output = tokio::process::Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| {
                format!(
                    "Failed to execute command '{}'. Is it installed and in PATH?",
                    program
                )
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
