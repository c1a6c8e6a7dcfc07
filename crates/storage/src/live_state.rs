// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Live PatchRun state: the on-disk snapshot of all in-flight patch jobs,
//! used to resume across process restarts and reboots (spec.md §3, §8 law 8).

use crate::atomic::write_atomic;
use osconfig_core::{JobId, PatchRun};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Schema version for the live-state file. A future migration hangs off a
/// mismatch here (spec.md §9 open question on step-name schema stability).
pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum LiveStateError {
    #[error("io error reading/writing live state at {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("live state at {path} is not valid JSON: {source}")]
    Parse { path: PathBuf, #[source] source: serde_json::Error },
    #[error("live state at {path} has unsupported schema version {found} (expected {CURRENT_VERSION})")]
    UnsupportedSchema { path: PathBuf, found: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OnDisk {
    version: u32,
    runs: BTreeMap<String, PatchRun>,
}

/// All currently-active [`PatchRun`]s, keyed by job id.
///
/// Invariant: at most one `PatchRun` per job id (enforced by the map key).
#[derive(Debug, Clone)]
pub struct LiveState {
    path: PathBuf,
    runs: BTreeMap<String, PatchRun>,
}

impl LiveState {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, LiveStateError> {
        let path = path.into();
        let runs = match std::fs::read(&path) {
            Ok(bytes) => {
                let on_disk: OnDisk = serde_json::from_slice(&bytes)
                    .map_err(|source| LiveStateError::Parse { path: path.clone(), source })?;
                if on_disk.version != CURRENT_VERSION {
                    tracing::warn!(path = %path.display(), found = on_disk.version, expected = CURRENT_VERSION, "live state schema mismatch, refusing to load");
                    return Err(LiveStateError::UnsupportedSchema {
                        path: path.clone(),
                        found: on_disk.version,
                    });
                }
                on_disk.runs
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(LiveStateError::Io { path: path.clone(), source }),
        };
        Ok(Self { path, runs })
    }

    pub fn get(&self, job_id: &JobId) -> Option<&PatchRun> {
        self.runs.get(job_id.as_str())
    }

    pub fn all(&self) -> impl Iterator<Item = &PatchRun> {
        self.runs.values()
    }

    /// Insert or replace a run's record and persist the full state file.
    pub fn put(&mut self, run: PatchRun) -> Result<(), LiveStateError> {
        self.runs.insert(run.job.job_id.as_str().to_string(), run);
        self.save()
    }

    /// Remove a run from live state (spec.md §4.4 REPORT_SUCCESS, §8
    /// cancellation scenario: no further writes happen for a removed job).
    pub fn remove(&mut self, job_id: &JobId) -> Result<(), LiveStateError> {
        self.runs.remove(job_id.as_str());
        self.save()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), LiveStateError> {
        let on_disk = OnDisk { version: CURRENT_VERSION, runs: self.runs.clone() };
        let bytes = serde_json::to_vec_pretty(&on_disk)
            .map_err(|source| LiveStateError::Parse { path: self.path.clone(), source })?;
        write_atomic(&self.path, &bytes)
            .map_err(|source| LiveStateError::Io { path: self.path.clone(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osconfig_core::{PatchConfig, PatchJob, PatchStep};

    fn run(job_id: &str, step: PatchStep) -> PatchRun {
        let job = PatchJob { job_id: JobId::from(job_id), patch_config: PatchConfig::default(), dry_run: false };
        let mut run = PatchRun::new(job, 0);
        run.step = step;
        run
    }

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = LiveState::load(dir.path().join("nope.json")).unwrap();
        assert_eq!(state.all().count(), 0);
    }

    #[test]
    fn resumes_patching_step_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.json");
        let mut state = LiveState::load(&path).unwrap();
        state.put(run("job-1", PatchStep::Patching)).unwrap();

        let reloaded = LiveState::load(&path).unwrap();
        assert_eq!(reloaded.get(&JobId::from("job-1")).unwrap().step, PatchStep::Patching);
    }

    #[test]
    fn remove_drops_job_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.json");
        let mut state = LiveState::load(&path).unwrap();
        state.put(run("job-1", PatchStep::ReportSuccess)).unwrap();
        state.remove(&JobId::from("job-1")).unwrap();

        let reloaded = LiveState::load(&path).unwrap();
        assert!(reloaded.get(&JobId::from("job-1")).is_none());
    }

    #[test]
    fn unsupported_schema_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.json");
        std::fs::write(&path, r#"{"version": 99, "runs": {}}"#).unwrap();
        let err = LiveState::load(&path).unwrap_err();
        assert!(matches!(err, LiveStateError::UnsupportedSchema { found: 99, .. }));
    }

    #[yare::parameterized(
        acked = { PatchStep::Acked },
        pre_reboot = { PatchStep::PreReboot },
        patching = { PatchStep::Patching },
        report_success = { PatchStep::ReportSuccess },
    )]
    fn every_patch_step_survives_a_reload(step: PatchStep) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.json");
        let mut state = LiveState::load(&path).unwrap();
        state.put(run("job-1", step)).unwrap();

        let reloaded = LiveState::load(&path).unwrap();
        assert_eq!(reloaded.get(&JobId::from("job-1")).unwrap().step, step);
    }
}
