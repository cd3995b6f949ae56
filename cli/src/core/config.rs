//! # jumprs Configuration System
//!
//! File: cli/src/core/config.rs
//! Repository: https://github.com/jumprs/jumprs
//!
//! ## Overview
//!
//! This module implements the configuration system for jumprs, handling
//! loading, layering, and access to `KEY=VALUE` environment-file data. It is
//! the **only** component of the application allowed to read the ambient
//! process environment; every other stage receives a read-only snapshot.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Process environment variables (snapshot taken once at load)
//! 2. Project root `.env`
//! 3. `mobile-app/.env` inside the project
//!
//! Lookups return the first **non-empty** value across that chain, so an
//! empty `JUMP_HOST_IP=` in the root file does not shadow a usable value in
//! the sub-project file.
//!
//! File parsing is line-oriented: blank lines and `#` comments are skipped,
//! lines split on the first `=` only (values may contain `=`), key and value
//! are trimmed, and one matching pair of enclosing single or double quotes is
//! stripped from the value. No further escape processing is performed.
//!
//! Every occurrence of a key is tracked with its 1-based line number. A key
//! that appears more than once produces a `DuplicateRecord`: the last
//! occurrence wins, and the specific footgun of an empty final value
//! overriding an earlier non-empty one is flagged so callers can warn about
//! it. Duplicates are warnings by design, never errors.
//!
//! ## Examples
//!
//! ```text
//! let store = ConfigStore::load(&project_root)?;
//! for warning in store.duplicate_warnings() {
//!     warn!("{warning}");
//! }
//! if let Some(ip) = store.get(KEY_HOST_IP) { /* pinned host IP */ }
//! ```
//!
//! The snapshot is immutable once built, rebuilt on each invocation, and
//! never persisted.
//!
use crate::core::error::Result;
use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration key pinning the host IP handed to the device.
pub const KEY_HOST_IP: &str = "JUMP_HOST_IP";
/// Configuration key requesting a specific bridge HTTP port.
pub const KEY_HTTP_PORT: &str = "JUMP_HTTP_PORT";
/// Configuration key overriding the bridge WebSocket port.
pub const KEY_WS_PORT: &str = "JUMP_WS_PORT";

/// Sub-project directory whose `.env` participates in the lookup chain.
pub const MOBILE_APP_DIR: &str = "mobile-app";

/// One `KEY=VALUE` assignment at a specific line of an env file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// 1-based physical line number.
    pub line: usize,
    /// Value after trimming and quote stripping. May be empty.
    pub value: String,
}

/// Report for a key assigned more than once in a single file.
///
/// `final_occurrence` is the textually last assignment (last-write-wins).
/// `empty_overrides_non_empty` flags the case where that final value is empty
/// while an earlier occurrence carried a non-empty value, almost always a
/// stale-edit mistake worth surfacing.
#[derive(Debug, Clone)]
pub struct DuplicateRecord {
    pub key: String,
    pub occurrences: Vec<Occurrence>,
    pub final_occurrence: Occurrence,
    pub empty_overrides_non_empty: bool,
    /// Closest earlier non-empty occurrence, when one exists.
    pub overridden_non_empty: Option<Occurrence>,
}

/// Parsed view of a single env file.
///
/// A missing file yields an empty snapshot with `exists == false` rather
/// than an error; only an unreadable existing file fails.
#[derive(Debug, Clone)]
pub struct EnvFileSnapshot {
    pub path: PathBuf,
    pub exists: bool,
    vars: HashMap<String, String>,
    pub duplicates: Vec<DuplicateRecord>,
}

impl EnvFileSnapshot {
    /// Loads and parses the env file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Env file not found (treated as empty): {}", path.display());
            return Ok(Self {
                path: path.to_path_buf(),
                exists: false,
                vars: HashMap::new(),
                duplicates: Vec::new(),
            });
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read env file: {}", path.display()))?;
        let mut snapshot = Self::parse(&content);
        snapshot.path = path.to_path_buf();
        Ok(snapshot)
    }

    /// Parses env-file text into a snapshot. CRLF and LF line endings are
    /// both accepted; line numbers are 1-based and count every physical line.
    pub fn parse(content: &str) -> Self {
        let mut vars = HashMap::new();
        // Insertion-ordered key list so duplicate reports are deterministic.
        let mut key_order: Vec<String> = Vec::new();
        let mut occurrences_by_key: HashMap<String, Vec<Occurrence>> = HashMap::new();

        for (index, raw_line) in content.split('\n').enumerate() {
            let trimmed = raw_line.trim_end_matches('\r').trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some(eq_index) = trimmed.find('=') else {
                continue;
            };
            let key = trimmed[..eq_index].trim().to_string();
            let value = strip_matching_quotes(trimmed[eq_index + 1..].trim()).to_string();

            if !occurrences_by_key.contains_key(&key) {
                key_order.push(key.clone());
            }
            occurrences_by_key.entry(key.clone()).or_default().push(Occurrence {
                line: index + 1,
                value: value.clone(),
            });
            vars.insert(key, value);
        }

        let mut duplicates = Vec::new();
        for key in key_order {
            let occurrences = &occurrences_by_key[&key];
            if occurrences.len() < 2 {
                continue;
            }
            let final_occurrence = occurrences
                .last()
                .expect("duplicate key has at least two occurrences")
                .clone();
            let overridden_non_empty = occurrences[..occurrences.len() - 1]
                .iter()
                .rev()
                .find(|entry| !entry.value.is_empty())
                .cloned();
            duplicates.push(DuplicateRecord {
                empty_overrides_non_empty: final_occurrence.value.is_empty()
                    && overridden_non_empty.is_some(),
                key,
                occurrences: occurrences.clone(),
                final_occurrence,
                overridden_non_empty,
            });
        }

        Self {
            path: PathBuf::new(),
            exists: true,
            vars,
            duplicates,
        }
    }

    /// Returns the last-write-wins value for `key`, if assigned at all.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Renders one warning line per duplicated key, prefixed with `label`.
    pub fn duplicate_warnings(&self, label: &str) -> Vec<String> {
        self.duplicates
            .iter()
            .map(|duplicate| {
                let lines = duplicate
                    .occurrences
                    .iter()
                    .map(|entry| entry.line.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut message = format!(
                    "{label}: duplicate key `{}` at lines {lines}. Final value is {}.",
                    duplicate.key,
                    format_value(&duplicate.final_occurrence.value),
                );
                if let Some(overridden) = duplicate
                    .overridden_non_empty
                    .as_ref()
                    .filter(|_| duplicate.empty_overrides_non_empty)
                {
                    message.push_str(&format!(
                        " Empty value on line {} overrides non-empty value from line {}.",
                        duplicate.final_occurrence.line, overridden.line
                    ));
                }
                message
            })
            .collect()
    }
}

/// Layered configuration handed read-only into every pipeline stage.
///
/// Precedence: process environment > root `.env` > `mobile-app/.env`.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    process_env: HashMap<String, String>,
    pub root: EnvFileSnapshot,
    pub mobile_app: EnvFileSnapshot,
}

impl ConfigStore {
    /// Builds the full configuration snapshot for a project rooted at
    /// `root_dir`. The ambient process environment is captured here, once.
    pub fn load(root_dir: &Path) -> Result<Self> {
        let root = EnvFileSnapshot::load(&root_dir.join(".env"))?;
        let mobile_app = EnvFileSnapshot::load(&root_dir.join(MOBILE_APP_DIR).join(".env"))?;
        Ok(Self {
            process_env: std::env::vars().collect(),
            root,
            mobile_app,
        })
    }

    /// Test/seam constructor with an explicit process-environment snapshot.
    pub fn with_process_env(
        process_env: HashMap<String, String>,
        root: EnvFileSnapshot,
        mobile_app: EnvFileSnapshot,
    ) -> Self {
        Self {
            process_env,
            root,
            mobile_app,
        }
    }

    /// Returns the first **non-empty** value for `key` across the layers, or
    /// `None` when the key is absent (or only ever assigned empty values).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.process_env
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .or_else(|| self.root.get(key).filter(|value| !value.is_empty()))
            .or_else(|| self.mobile_app.get(key).filter(|value| !value.is_empty()))
    }

    /// Duplicate-key warnings across both files, labeled by source.
    pub fn duplicate_warnings(&self) -> Vec<String> {
        let mut warnings = self.root.duplicate_warnings("Root .env");
        warnings.extend(self.mobile_app.duplicate_warnings("mobile-app/.env"));
        warnings
    }
}

/// Strips one matching pair of enclosing single or double quotes.
fn strip_matching_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn format_value(value: &str) -> String {
    if value.is_empty() {
        "<empty>".to_string()
    } else {
        value.to_string()
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let snapshot = EnvFileSnapshot::parse("# comment\n\nJUMP_HOST_IP=192.168.1.9\n");
        assert_eq!(snapshot.get(KEY_HOST_IP), Some("192.168.1.9"));
        assert!(snapshot.duplicates.is_empty());
    }

    #[test]
    fn test_parse_splits_on_first_equals_only() {
        let snapshot = EnvFileSnapshot::parse("TOKEN=abc=def==\n");
        assert_eq!(snapshot.get("TOKEN"), Some("abc=def=="));
    }

    #[test]
    fn test_parse_strips_one_matching_quote_pair() {
        let snapshot = EnvFileSnapshot::parse("A=\"quoted\"\nB='single'\nC=\"mismatch'\nD=''\n");
        assert_eq!(snapshot.get("A"), Some("quoted"));
        assert_eq!(snapshot.get("B"), Some("single"));
        assert_eq!(snapshot.get("C"), Some("\"mismatch'"));
        assert_eq!(snapshot.get("D"), Some(""));
    }

    #[test]
    fn test_parse_tolerates_crlf() {
        let snapshot = EnvFileSnapshot::parse("A=1\r\nB=2\r\n");
        assert_eq!(snapshot.get("A"), Some("1"));
        assert_eq!(snapshot.get("B"), Some("2"));
    }

    #[test]
    fn test_duplicate_last_write_wins() {
        let snapshot = EnvFileSnapshot::parse("PORT=3000\nPORT=3001\nPORT=3002\n");
        assert_eq!(snapshot.get("PORT"), Some("3002"));
        assert_eq!(snapshot.duplicates.len(), 1);
        let record = &snapshot.duplicates[0];
        assert_eq!(record.key, "PORT");
        assert_eq!(record.final_occurrence, Occurrence { line: 3, value: "3002".into() });
        assert_eq!(record.occurrences.len(), 3);
        assert!(!record.empty_overrides_non_empty);
    }

    #[test]
    fn test_duplicate_empty_overrides_non_empty() {
        let snapshot = EnvFileSnapshot::parse("JUMP_HOST_IP=192.168.1.5\nJUMP_HOST_IP=\n");
        let record = &snapshot.duplicates[0];
        assert!(record.empty_overrides_non_empty);
        assert_eq!(
            record.overridden_non_empty,
            Some(Occurrence { line: 1, value: "192.168.1.5".into() })
        );
        // The warning names both line numbers so the operator can fix the file.
        let warnings = snapshot.duplicate_warnings("Root .env");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Empty value on line 2 overrides non-empty value from line 1"));
        assert!(warnings[0].contains("<empty>"));
    }

    #[test]
    fn test_duplicate_final_empty_without_earlier_non_empty() {
        let snapshot = EnvFileSnapshot::parse("K=\nK=\n");
        let record = &snapshot.duplicates[0];
        assert!(!record.empty_overrides_non_empty);
        assert!(record.overridden_non_empty.is_none());
    }

    #[test]
    fn test_missing_file_yields_empty_snapshot() {
        let dir = tempdir().unwrap();
        let snapshot = EnvFileSnapshot::load(&dir.path().join("nope.env")).unwrap();
        assert!(!snapshot.exists);
        assert!(snapshot.get("ANYTHING").is_none());
    }

    #[test]
    fn test_store_precedence_process_over_files() {
        let root = EnvFileSnapshot::parse("JUMP_HOST_IP=10.0.0.2\n");
        let mobile = EnvFileSnapshot::parse("JUMP_HOST_IP=10.0.0.3\n");
        let mut process_env = HashMap::new();
        process_env.insert(KEY_HOST_IP.to_string(), "10.0.0.1".to_string());
        let store = ConfigStore::with_process_env(process_env, root, mobile);
        assert_eq!(store.get(KEY_HOST_IP), Some("10.0.0.1"));
    }

    #[test]
    fn test_store_skips_empty_layers() {
        let root = EnvFileSnapshot::parse("JUMP_HTTP_PORT=\n");
        let mobile = EnvFileSnapshot::parse("JUMP_HTTP_PORT=3005\n");
        let store = ConfigStore::with_process_env(HashMap::new(), root, mobile);
        // Empty root value must not shadow the sub-project file.
        assert_eq!(store.get(KEY_HTTP_PORT), Some("3005"));
        assert_eq!(store.get("ABSENT"), None);
    }

    #[test]
    fn test_store_loads_layered_files_from_disk() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".env"), "JUMP_WS_PORT=3031\n").unwrap();
        fs::create_dir(dir.path().join(MOBILE_APP_DIR)).unwrap();
        fs::write(
            dir.path().join(MOBILE_APP_DIR).join(".env"),
            "JUMP_WS_PORT=4000\nJUMP_HTTP_PORT=3002\n",
        )
        .unwrap();
        let store = ConfigStore::load(dir.path()).unwrap();
        assert_eq!(store.get(KEY_WS_PORT), Some("3031"));
        assert_eq!(store.get(KEY_HTTP_PORT), Some("3002"));
    }
}
