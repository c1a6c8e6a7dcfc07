// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-run working directory (spec.md §4.2 steps 2-3): a uniquely named
//! directory under the system temp root, removed on drop regardless of how
//! the run ended.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `"run_" + monotonic-nanos`, disambiguated further by a process-local
/// counter in case the clock doesn't advance between two calls.
pub fn new_run_id() -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    let seq = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("run_{nanos}_{seq}")
}

pub struct RunWorkspace {
    root: PathBuf,
}

impl RunWorkspace {
    /// Create `<temp-root>/osconfig-recipe/<name>-<version>-<run_id>`.
    pub fn create(temp_root: &Path, name: &str, version: &str, run_id: &str) -> std::io::Result<Self> {
        let root = temp_root.join("osconfig-recipe").join(format!("{name}-{version}-{run_id}"));
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Working directory for step index `i`, created on first use.
    pub fn step_dir(&self, index: usize) -> std::io::Result<PathBuf> {
        let dir = self.root.join(format!("step{index:02}"));
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

impl Drop for RunWorkspace {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_dir_all(&self.root) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(dir = %self.root.display(), %err, "failed to clean up recipe run workspace");
            }
        }
    }
}
