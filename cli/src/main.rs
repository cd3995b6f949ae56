//! # jumprs Main Entry Point
//!
//! File: cli/src/main.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the jumprs CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//!
//! ## Architecture
//!
//! The application follows a modular command structure:
//! - Each top-level command (`jump`, `doctor`) is a variant in the
//!   `Commands` enum, handled in its own module under `commands::`
//! - All errors propagate to this level for consistent handling; known
//!   failure shapes add a remediation hint before the error line
//!
//! ## Examples
//!
//! Basic jumprs usage:
//!
//! ```bash
//! # Get help
//! jumprs --help
//!
//! # Launch an Android session with increased verbosity
//! jumprs -vv jump android
//!
//! # Diagnose the environment
//! jumprs doctor
//! ```
//!
//! Command processing flow:
//! 1. Parse command-line args via Clap
//! 2. Configure logging based on verbosity level
//! 3. Route to the appropriate command handler
//! 4. Format and display any errors that occur
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

// Declare the top-level modules of the CLI crate.
mod commands; // Command logic (jump, doctor)
mod common; // Shared utilities (process, network, compose, adb, ui)
mod core; // Core infrastructure (errors, layered config)

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "jumprs",
    about = "Host-to-device connectivity resolver for containerized mobile development",
    long_about = "Resolves the host IP, negotiates HTTP/WS ports on both sides of the \n\
                  container boundary, patches the bridge router, and launches a device \n\
                  bridge session over LAN or USB.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Enum defining all available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    #[command(alias = "j")]
    Jump(commands::jump::JumpArgs),
    #[command(alias = "d")]
    Doctor(commands::doctor::DoctorArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Jump(args) => commands::jump::handle_jump(args).await,
        Commands::Doctor(args) => commands::doctor::handle_doctor(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        if let Some(hint) = core::error::remediation_hint(&e) {
            eprintln!("Hint: {hint}");
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

// --- Basic Integration Tests ---
#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    fn jumprs_cmd() -> Command {
        Command::cargo_bin("jumprs").expect("Failed to find jumprs binary for testing")
    }
    #[test]
    fn test_main_help_flag() {
        jumprs_cmd().arg("--help").assert().success();
    }
    #[test]
    fn test_main_version_flag() {
        jumprs_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}
