// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Agent configuration (spec.md §2 NEW): compiled-in defaults, overridden by
//! an optional TOML file, then by `OSCONFIG_*` environment variables.
//! Reloaded on every poll-loop tick (spec.md §4.7 step 1); a bad reload logs
//! and keeps the last good value rather than crashing the loop.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("parsing {path}: {source}")]
    Parse { path: PathBuf, #[source] source: toml::de::Error },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub poll_interval_secs: u64,
    pub inventory_enabled: bool,
    pub guest_policies_enabled: bool,
    pub task_notification_enabled: bool,
    pub recipe_db_path: Option<PathBuf>,
    pub live_state_path: Option<PathBuf>,
    pub lock_path: Option<PathBuf>,
    pub log_level: String,
    /// Base URL of the control-plane RPC endpoint (progress/completion
    /// reporting). `None` until the operator supplies one — the agent
    /// still runs its local loop (resuming persisted patch runs, inventory
    /// collection) without it, just without any reporting.
    pub control_plane_url: Option<String>,
    /// Base URL of the attributes sink (spec.md §4.6).
    pub attributes_url: Option<String>,
    /// Identifier sent with every control-plane request; falls back to the
    /// collected hostname when unset.
    pub instance_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            inventory_enabled: true,
            guest_policies_enabled: true,
            task_notification_enabled: true,
            recipe_db_path: None,
            live_state_path: None,
            lock_path: None,
            log_level: "info".to_string(),
            control_plane_url: None,
            attributes_url: None,
            instance_id: None,
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Load defaults, overlay an optional TOML file, then overlay
    /// `OSCONFIG_*` environment variables.
    pub fn load(toml_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match toml_path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io { path: path.to_path_buf(), source }),
        }
    }

    fn apply_env(&mut self) {
        if let Ok(raw) = std::env::var("OSCONFIG_POLL_INTERVAL_SECS") {
            match raw.parse() {
                Ok(secs) => self.poll_interval_secs = secs,
                Err(err) => tracing::warn!(%err, raw, "ignoring invalid OSCONFIG_POLL_INTERVAL_SECS"),
            }
        }
        if let Ok(raw) = std::env::var("OSCONFIG_INVENTORY_ENABLED") {
            self.inventory_enabled = parse_bool(&raw, self.inventory_enabled);
        }
        if let Ok(raw) = std::env::var("OSCONFIG_GUEST_POLICIES_ENABLED") {
            self.guest_policies_enabled = parse_bool(&raw, self.guest_policies_enabled);
        }
        if let Ok(raw) = std::env::var("OSCONFIG_TASK_NOTIFICATION_ENABLED") {
            self.task_notification_enabled = parse_bool(&raw, self.task_notification_enabled);
        }
        if let Ok(raw) = std::env::var("OSCONFIG_LOG_LEVEL") {
            self.log_level = raw;
        }
        if let Ok(raw) = std::env::var("OSCONFIG_CONTROL_PLANE_URL") {
            self.control_plane_url = Some(raw);
        }
        if let Ok(raw) = std::env::var("OSCONFIG_ATTRIBUTES_URL") {
            self.attributes_url = Some(raw);
        }
        if let Ok(raw) = std::env::var("OSCONFIG_INSTANCE_ID") {
            self.instance_id = Some(raw);
        }
    }

    /// Best-effort reload for the poll loop: on any error, log and return
    /// the previous config unchanged (spec.md §4.7 step 1).
    pub fn refresh(&self, toml_path: Option<&Path>) -> Self {
        match Self::load(toml_path) {
            Ok(fresh) => fresh,
            Err(err) => {
                tracing::warn!(%err, "config refresh failed, keeping last good config");
                self.clone()
            }
        }
    }
}

fn parse_bool(raw: &str, default: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => true,
        "0" | "false" | "no" => false,
        _ => {
            tracing::warn!(raw, "ignoring unrecognized boolean env value");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all_features_enabled() {
        let config = Config::default();
        assert!(config.inventory_enabled);
        assert!(config.guest_policies_enabled);
        assert!(config.task_notification_enabled);
        assert_eq!(config.poll_interval_secs, 60);
    }

    #[test]
    fn missing_toml_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config.poll_interval_secs, 60);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        std::fs::write(&path, "poll_interval_secs = 30\ninventory_enabled = false\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.poll_interval_secs, 30);
        assert!(!config.inventory_enabled);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        std::fs::write(&path, "not valid toml {{{").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[yare::parameterized(
        one       = { "1", true },
        zero      = { "0", false },
        true_word = { "true", true },
        false_word = { "false", false },
        yes       = { "YES", true },
        no        = { "No", false },
        padded    = { "  true  ", true },
    )]
    fn parse_bool_recognizes_common_spellings(raw: &str, expected: bool) {
        assert_eq!(parse_bool(raw, !expected), expected);
    }

    #[test]
    fn parse_bool_falls_back_to_default_on_garbage() {
        assert!(parse_bool("maybe", true));
        assert!(!parse_bool("maybe", false));
    }

    #[test]
    fn refresh_keeps_last_good_value_on_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        std::fs::write(&path, "poll_interval_secs = 45\n").unwrap();
        let good = Config::load(Some(&path)).unwrap();

        std::fs::write(&path, "not valid toml {{{").unwrap();
        let refreshed = good.refresh(Some(&path));
        assert_eq!(refreshed.poll_interval_secs, 45);
    }

    #[test]
    #[serial_test::serial]
    fn env_vars_override_toml_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        std::fs::write(&path, "poll_interval_secs = 45\n").unwrap();

        std::env::set_var("OSCONFIG_POLL_INTERVAL_SECS", "120");
        std::env::set_var("OSCONFIG_INVENTORY_ENABLED", "false");
        let config = Config::load(Some(&path)).unwrap();
        std::env::remove_var("OSCONFIG_POLL_INTERVAL_SECS");
        std::env::remove_var("OSCONFIG_INVENTORY_ENABLED");

        assert_eq!(config.poll_interval_secs, 120);
        assert!(!config.inventory_enabled);
        assert!(config.guest_policies_enabled);
    }

    #[test]
    #[serial_test::serial]
    fn unrecognized_env_bool_falls_back_to_previous_value() {
        std::env::set_var("OSCONFIG_GUEST_POLICIES_ENABLED", "maybe");
        let config = Config::load(None).unwrap();
        std::env::remove_var("OSCONFIG_GUEST_POLICIES_ENABLED");

        assert!(config.guest_policies_enabled);
    }
}
