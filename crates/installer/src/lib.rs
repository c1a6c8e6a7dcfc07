// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Recipe installer orchestration (spec.md §4.2): consult the decision
//! procedure, create a per-run workspace, fetch artifacts, dispatch the
//! selected step list, and record the outcome in the recipe DB.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod error;
pub mod workspace;

pub use error::InstallError;

use osconfig_adapters::fetch::FetcherRegistry;
use osconfig_core::{decide, InstallDecision, Recipe, RecipeSpec, RecipeVersion};
use osconfig_storage::RecipeDb;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use workspace::{new_run_id, RunWorkspace};

pub struct RecipeInstaller<'a> {
    db: &'a mut RecipeDb,
    fetchers: &'a FetcherRegistry,
    temp_root: PathBuf,
    now: i64,
}

impl<'a> RecipeInstaller<'a> {
    pub fn new(db: &'a mut RecipeDb, fetchers: &'a FetcherRegistry, temp_root: PathBuf, now: i64) -> Self {
        Self { db, fetchers, temp_root, now }
    }

    /// Run the full decision-and-install pipeline for one recipe spec
    /// (spec.md §4.2). Returns without touching the DB on a no-op decision.
    pub async fn converge(&mut self, spec: &RecipeSpec) -> Result<(), InstallError> {
        let existing = self.db.get(&spec.name).cloned();
        let decision = decide(existing.as_ref(), spec);
        let steps = match decision {
            InstallDecision::NoOp => return Ok(()),
            InstallDecision::RunInstallSteps => &spec.install_steps,
            InstallDecision::RunUpdateSteps => &spec.update_steps,
        };

        let run_id = new_run_id();
        let workspace = RunWorkspace::create(&self.temp_root, &spec.name, &spec.version.to_string(), &run_id)?;

        let artifacts = match self.fetch_all(spec, workspace.root()).await {
            Ok(map) => map,
            Err(err) => {
                self.record_failure(spec);
                return Err(err);
            }
        };

        for (index, step) in steps.iter().enumerate() {
            let step_dir = workspace.step_dir(index)?;
            if let Err(source) = osconfig_recipe::dispatch(step, &artifacts, &step_dir).await {
                tracing::error!(recipe = %spec.name, index, kind = step.kind_name(), %source, "recipe step failed");
                self.record_failure(spec);
                return Err(InstallError::Step { name: spec.name.clone(), index, kind: step.kind_name(), source });
            }
        }

        self.record_success(spec);
        Ok(())
    }

    async fn fetch_all(&self, spec: &RecipeSpec, root: &Path) -> Result<HashMap<String, PathBuf>, InstallError> {
        let mut artifacts = HashMap::with_capacity(spec.artifacts.len());
        for (artifact_id, artifact) in &spec.artifacts {
            let filename = match artifact.extension() {
                Some(ext) => format!("{artifact_id}.{ext}"),
                None => artifact_id.clone(),
            };
            let destination = root.join(&filename);
            self.fetchers.fetch(artifact, &destination).await.map_err(|source| InstallError::Fetch {
                name: spec.name.clone(),
                artifact_id: artifact_id.clone(),
                source,
            })?;
            artifacts.insert(artifact_id.clone(), destination);
        }
        Ok(artifacts)
    }

    fn record_failure(&mut self, spec: &RecipeSpec) {
        let recipe = Recipe { name: spec.name.clone(), version: spec.version.clone(), install_time: self.now, success: false };
        if let Err(err) = self.db.upsert(recipe) {
            tracing::error!(recipe = %spec.name, %err, "failed to persist recipe failure record");
        }
    }

    fn record_success(&mut self, spec: &RecipeSpec) {
        let recipe = Recipe { name: spec.name.clone(), version: spec.version.clone(), install_time: self.now, success: true };
        if let Err(err) = self.db.upsert(recipe) {
            tracing::error!(recipe = %spec.name, %err, "failed to persist recipe success record");
        }
    }
}

/// Helper used by tests and by the step-index error path to stringify a
/// `RecipeVersion` the way the DB and workspace naming both expect.
pub fn version_string(version: &RecipeVersion) -> String {
    version.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use osconfig_core::{Artifact, DesiredState, RecipeStep};
    use std::collections::HashSet;

    fn spec_with_steps(name: &str, version: &str, steps: Vec<RecipeStep>) -> RecipeSpec {
        RecipeSpec {
            name: name.to_string(),
            version: RecipeVersion::parse(version).unwrap(),
            desired_state: DesiredState::Installed,
            artifacts: HashMap::new(),
            install_steps: steps,
            update_steps: vec![],
        }
    }

    #[tokio::test]
    async fn converge_records_success_after_all_steps_pass() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = RecipeDb::load(dir.path().join("db.json")).unwrap();
        let fetchers = FetcherRegistry::default_set();
        let mut installer = RecipeInstaller::new(&mut db, &fetchers, dir.path().to_path_buf(), 1000);

        let script = dir.path().join("noop.sh");
        std::fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        let spec = spec_with_steps(
            "foo",
            "1.0.0",
            vec![RecipeStep::FileExec {
                location: osconfig_core::ExecLocation::Path(script.display().to_string()),
                args: vec![],
                allowed_exit_codes: HashSet::new(),
            }],
        );

        installer.converge(&spec).await.unwrap();
        let recorded = db.get("foo").unwrap();
        assert!(recorded.success);
    }

    #[tokio::test]
    async fn converge_records_failure_when_a_step_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = RecipeDb::load(dir.path().join("db.json")).unwrap();
        let fetchers = FetcherRegistry::default_set();
        let mut installer = RecipeInstaller::new(&mut db, &fetchers, dir.path().to_path_buf(), 1000);

        let script = dir.path().join("fail.sh");
        std::fs::write(&script, "#!/bin/sh\nexit 9\n").unwrap();
        let spec = spec_with_steps(
            "bar",
            "1.0.0",
            vec![RecipeStep::FileExec {
                location: osconfig_core::ExecLocation::Path(script.display().to_string()),
                args: vec![],
                allowed_exit_codes: HashSet::new(),
            }],
        );

        let err = installer.converge(&spec).await.unwrap_err();
        assert!(matches!(err, InstallError::Step { .. }));
        let recorded = db.get("bar").unwrap();
        assert!(!recorded.success);
    }

    #[tokio::test]
    async fn converge_is_a_noop_when_already_installed() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = RecipeDb::load(dir.path().join("db.json")).unwrap();
        db.upsert(Recipe {
            name: "foo".into(),
            version: RecipeVersion::parse("1.0.0").unwrap(),
            install_time: 1,
            success: true,
        })
        .unwrap();
        let fetchers = FetcherRegistry::default_set();
        let mut installer = RecipeInstaller::new(&mut db, &fetchers, dir.path().to_path_buf(), 1000);

        let spec = spec_with_steps("foo", "1.0.0", vec![]);
        installer.converge(&spec).await.unwrap();
        let recorded = db.get("foo").unwrap();
        assert_eq!(recorded.install_time, 1);
    }
}
