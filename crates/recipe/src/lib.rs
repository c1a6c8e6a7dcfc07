// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Recipe step execution (spec.md §4.3). Each function here implements one
//! `RecipeStep` variant; `dispatch` resolves a step against the run's
//! artifact map and step working directory and calls the matching
//! implementation. Orchestration (workspace creation, artifact fetch,
//! recipe-db bookkeeping) lives one layer up in `osconfig-installer`.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod archive;
pub mod error;
pub mod exec_step;
pub mod file_copy;
pub mod package_step;

pub use error::StepError;

use osconfig_core::{ExecLocation, RecipeStep};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Resolve a `RecipeStep`'s `artifact_id` field (when it has one) against
/// the run's fetched-artifact map; a missing id is a step failure.
pub fn resolve_artifact<'a>(
    artifacts: &'a HashMap<String, PathBuf>,
    artifact_id: &str,
) -> Result<&'a Path, StepError> {
    artifacts
        .get(artifact_id)
        .map(PathBuf::as_path)
        .ok_or_else(|| StepError::MissingArtifact(artifact_id.to_string()))
}

fn resolve_exec_location<'a>(
    artifacts: &'a HashMap<String, PathBuf>,
    location: &'a ExecLocation,
) -> Result<&'a Path, StepError> {
    match location {
        ExecLocation::ArtifactId(id) => resolve_artifact(artifacts, id),
        ExecLocation::Path(path) => Ok(Path::new(path)),
    }
}

/// Dispatch one step (spec.md §4.2 step 6). `step_dir` is the run's
/// `stepNN` working directory created by the installer for this step index.
pub async fn dispatch(
    step: &RecipeStep,
    artifacts: &HashMap<String, PathBuf>,
    step_dir: &Path,
) -> Result<(), StepError> {
    tracing::debug!(kind = step.kind_name(), dir = %step_dir.display(), "dispatching recipe step");
    match step {
        RecipeStep::FileCopy { artifact_id, destination, permissions, overwrite } => {
            let source = resolve_artifact(artifacts, artifact_id)?;
            file_copy::run(source, Path::new(destination), permissions.as_deref(), *overwrite).await
        }
        RecipeStep::ArchiveExtraction { artifact_id, destination, archive_type } => {
            let source = resolve_artifact(artifacts, artifact_id)?.to_path_buf();
            let destination = PathBuf::from(destination);
            let archive_type = *archive_type;
            tokio::task::spawn_blocking(move || archive::extract(&source, &destination, archive_type))
                .await
                .map_err(|e| StepError::Io(std::io::Error::other(e)))?
        }
        RecipeStep::MsiInstallation { artifact_id, flags, allowed_exit_codes } => {
            let path = resolve_artifact(artifacts, artifact_id)?;
            package_step::install_msi(path, flags, allowed_exit_codes).await
        }
        RecipeStep::DpkgInstallation { artifact_id, allowed_exit_codes } => {
            let path = resolve_artifact(artifacts, artifact_id)?;
            package_step::install_dpkg(path, allowed_exit_codes).await
        }
        RecipeStep::RpmInstallation { artifact_id, allowed_exit_codes } => {
            let path = resolve_artifact(artifacts, artifact_id)?;
            package_step::install_rpm(path, allowed_exit_codes).await
        }
        RecipeStep::FileExec { location, args, allowed_exit_codes } => {
            let path = resolve_exec_location(artifacts, location)?;
            exec_step::run_file(path, args, allowed_exit_codes).await
        }
        RecipeStep::ScriptRun { script_body, interpreter, args, allowed_exit_codes } => {
            exec_step::run_script(step_dir, script_body, *interpreter, args, allowed_exit_codes).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn file_copy_dispatches_to_resolved_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        tokio::fs::write(&src, b"payload").await.unwrap();
        let dst = dir.path().join("dst.bin");

        let mut artifacts = HashMap::new();
        artifacts.insert("a1".to_string(), src);

        let step = RecipeStep::FileCopy {
            artifact_id: "a1".into(),
            destination: dst.display().to_string(),
            permissions: None,
            overwrite: false,
        };
        dispatch(&step, &artifacts, dir.path()).await.unwrap();
        assert_eq!(tokio::fs::read(&dst).await.unwrap(), b"payload");
    }

    #[tokio::test]
    async fn missing_artifact_id_is_a_step_failure() {
        let dir = tempfile::tempdir().unwrap();
        let step = RecipeStep::FileCopy {
            artifact_id: "missing".into(),
            destination: dir.path().join("out").display().to_string(),
            permissions: None,
            overwrite: false,
        };
        let err = dispatch(&step, &HashMap::new(), dir.path()).await.unwrap_err();
        assert!(matches!(err, StepError::MissingArtifact(_)));
    }

    #[tokio::test]
    async fn file_exec_with_explicit_path_does_not_need_artifact_map() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("run.sh");
        tokio::fs::write(&script, "#!/bin/sh\nexit 0\n").await.unwrap();
        let step = RecipeStep::FileExec {
            location: ExecLocation::Path(script.display().to_string()),
            args: vec![],
            allowed_exit_codes: HashSet::new(),
        };
        dispatch(&step, &HashMap::new(), dir.path()).await.unwrap();
    }
}
