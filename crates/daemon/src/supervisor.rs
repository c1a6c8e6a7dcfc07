// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Agent supervisor (spec.md §4.7): singleton process lock, poll loop,
//! config refresh, restart-marker handling, signal-driven shutdown.

use crate::config::Config;
use crate::error::AgentError;
use crate::tasker::Tasker;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// An exclusively-held lock file; dropped (and the file removed) on clean
/// shutdown (spec.md §4.7 "the lock must be released ... on clean shutdown").
pub struct SingletonLock {
    path: PathBuf,
    file: File,
}

impl SingletonLock {
    /// Acquire the lock or fail immediately — never blocks.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, AgentError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).write(true).open(&path)?;
        file.try_lock_exclusive().map_err(|_| AgentError::AlreadyRunning(path.display().to_string()))?;
        Ok(Self { path, file })
    }
}

impl Drop for SingletonLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        let _ = std::fs::remove_file(&self.path);
    }
}

/// What the poll loop decided to do on one tick, surfaced for tests and for
/// the caller to act on (enqueue work, spin down the notification client).
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TickActions {
    pub should_exit: bool,
    pub enqueue_inventory: bool,
    pub enqueue_policies: bool,
    pub notification_client_should_be_active: bool,
}

/// One iteration of the poll loop (spec.md §4.7 steps 1-5), pure aside from
/// the restart-marker file check: reads `config` and `restart_marker_path`,
/// returns what the caller should do. Never blocks.
pub fn tick(config: &Config, restart_marker_path: &Path) -> TickActions {
    if restart_marker_path.exists() {
        if let Err(err) = std::fs::remove_file(restart_marker_path) {
            tracing::warn!(%err, path = %restart_marker_path.display(), "failed to remove restart marker");
        }
        return TickActions { should_exit: true, ..Default::default() };
    }
    TickActions {
        should_exit: false,
        enqueue_inventory: config.inventory_enabled,
        enqueue_policies: config.guest_policies_enabled,
        notification_client_should_be_active: config.task_notification_enabled,
    }
}

/// Drive the poll loop until cancelled or a restart marker is observed.
/// `on_tick` is called with each tick's decided actions; it owns enqueuing
/// work onto the [`Tasker`] and managing the notification client lifecycle.
/// `cancel` is the top-level supervisor context's cancellation token
/// (spec.md §5): every long operation derives from the same token.
pub async fn run_poll_loop(
    mut config: Config,
    toml_path: Option<PathBuf>,
    restart_marker_path: PathBuf,
    cancel: CancellationToken,
    mut on_tick: impl FnMut(&TickActions),
) {
    let mut interval = tokio::time::interval(config.poll_interval());
    loop {
        tokio::select! {
            _ = interval.tick() => {
                config = config.refresh(toml_path.as_deref());
                let actions = tick(&config, &restart_marker_path);
                on_tick(&actions);
                if actions.should_exit {
                    return;
                }
            }
            () = cancel.cancelled() => {
                tracing::info!("supervisor received cancellation signal, shutting down");
                return;
            }
        }
    }
}

/// Drain and close a [`Tasker`] as part of a clean shutdown path.
pub async fn shutdown(tasker: Tasker) {
    tasker.close().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_acquisition_fails_when_already_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.lock");
        let first = SingletonLock::acquire(&path).unwrap();
        let second = SingletonLock::acquire(&path);
        assert!(second.is_err());
        drop(first);
        assert!(SingletonLock::acquire(&path).is_ok());
    }

    #[test]
    fn lock_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.lock");
        let lock = SingletonLock::acquire(&path).unwrap();
        assert!(path.exists());
        drop(lock);
        assert!(!path.exists());
    }

    #[test]
    fn tick_with_restart_marker_requests_exit_and_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("restart");
        std::fs::write(&marker, "").unwrap();
        let actions = tick(&Config::default(), &marker);
        assert!(actions.should_exit);
        assert!(!marker.exists());
    }

    #[test]
    fn tick_without_marker_reflects_feature_flags() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("restart");
        let mut config = Config::default();
        config.guest_policies_enabled = false;
        let actions = tick(&config, &marker);
        assert!(!actions.should_exit);
        assert!(actions.enqueue_inventory);
        assert!(!actions.enqueue_policies);
    }
}
