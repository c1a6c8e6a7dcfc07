// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fatal startup errors (spec.md §6): anything that keeps the agent from
//! reaching its main loop at all. Everything past startup is handled and
//! logged in place rather than propagated here — a single patch job or
//! inventory field failing never takes the process down.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] osconfig_daemon::config::ConfigError),
    #[error("another agent instance is already running: {0}")]
    AlreadyRunning(String),
    #[error(transparent)]
    RecipeDb(#[from] osconfig_storage::RecipeDbError),
    #[error(transparent)]
    LiveState(#[from] osconfig_storage::LiveStateError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<osconfig_daemon::AgentError> for StartupError {
    fn from(err: osconfig_daemon::AgentError) -> Self {
        match err {
            osconfig_daemon::AgentError::AlreadyRunning(path) => Self::AlreadyRunning(path),
            osconfig_daemon::AgentError::Config(source) => Self::Config(source),
            osconfig_daemon::AgentError::LiveState(source) => Self::LiveState(source),
            osconfig_daemon::AgentError::RecipeDb(source) => Self::RecipeDb(source),
            osconfig_daemon::AgentError::Io(source) => Self::Io(source),
        }
    }
}
