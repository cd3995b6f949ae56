//! # jumprs Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure components that provide
//! foundational functionality for the jumprs application. These components
//! handle configuration and error management.
//!
//! ## Architecture
//!
//! The core infrastructure consists of two key components:
//! - `config`: Layered `.env` configuration loading with duplicate-key reporting
//! - `error`: Error types, `Result` alias, and remediation hints
//!
//! ## Usage
//!
//! Core infrastructure is imported by command handlers:
//!
//! ```rust
//! use crate::core::config::ConfigStore; // For the layered config snapshot
//! use crate::core::error::{JumprsError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
