// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Top-level error aggregating every taxonomy bucket from spec.md §7 into
/// the supervisor's result type.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("another agent instance is already running: {0}")]
    AlreadyRunning(String),
    #[error("config load failed: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error(transparent)]
    LiveState(#[from] osconfig_storage::LiveStateError),
    #[error(transparent)]
    RecipeDb(#[from] osconfig_storage::RecipeDbError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("recipe DB/live-state persistence error: {0}")]
    Persist(#[from] osconfig_storage::LiveStateError),
    #[error("control plane rpc failed: {0}")]
    Report(#[from] osconfig_adapters::ControlPlaneError),
    #[error("{family}: both exclusive-packages and excludes are set")]
    Configuration { family: osconfig_core::PackageFamily },
    #[error("{family}: package update failed: {source}")]
    PackageUpdate { family: osconfig_core::PackageFamily, #[source] source: osconfig_adapters::AdapterError },
    #[error("reboot primitive failed: {0}")]
    Reboot(#[source] std::io::Error),
    #[error("job {0} was cancelled by the control plane")]
    Cancelled(osconfig_core::JobId),
    #[error(transparent)]
    ExecStep(#[from] osconfig_recipe::StepError),
    #[error("fetching pre/post-patch exec step content failed: {0}")]
    Fetch(#[from] osconfig_adapters::FetchError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
