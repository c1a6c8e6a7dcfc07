// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Patch-job state machine (spec.md §4.4): `Acked -> PreReboot -> Patching
//! -> ReportSuccess`, durably resumable across process restarts and reboots
//! via the live-state file.

use crate::error::PatchError;
use crate::retry::retry;
use osconfig_adapters::{ControlPlaneClient, FetcherRegistry, PackageAdapter, PlatformOps, Progress, TaskDirective, UpdateQueryOptions};
use osconfig_core::{
    filter_names, Artifact, Exclude, ExecSource, ExecStepConfig, JobId, PackageFamily, PatchConfig, PatchInterpreter,
    PatchJob, PatchRun, PatchStep, RebootConfig, StepInterpreter,
};
use osconfig_storage::LiveState;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const PACKAGE_UPDATE_DEADLINE: Duration = Duration::from_secs(3 * 60);
const REPORT_DEADLINE: Duration = Duration::from_secs(35 * 60);

fn is_transient_rpc(err: &osconfig_adapters::ControlPlaneError) -> bool {
    err.status_code().is_transient()
}

/// Outcome of running a job to whatever point it stopped at: terminal
/// success/failure/cancellation, or a deliberate indefinite block because a
/// reboot was just issued.
#[derive(Debug)]
pub enum RunOutcome {
    Succeeded { reboot_required: bool },
    Cancelled,
    RebootIssued,
}

pub struct PatchRunner {
    control_plane: Arc<dyn ControlPlaneClient>,
    platform: Arc<dyn PlatformOps>,
    adapters: Vec<Arc<dyn PackageAdapter>>,
    fetchers: Arc<FetcherRegistry>,
}

impl PatchRunner {
    pub fn new(
        control_plane: Arc<dyn ControlPlaneClient>,
        platform: Arc<dyn PlatformOps>,
        adapters: Vec<Arc<dyn PackageAdapter>>,
        fetchers: Arc<FetcherRegistry>,
    ) -> Self {
        Self { control_plane, platform, adapters, fetchers }
    }

    /// Resume or begin a job, driving it through states until it reaches a
    /// terminal outcome or must block forever on a just-issued reboot.
    pub async fn run(&self, live_state: &mut LiveState, job: PatchJob, now: i64) -> Result<RunOutcome, PatchError> {
        let job_id = job.job_id.clone();
        let mut run = live_state.get(&job_id).cloned().unwrap_or_else(|| PatchRun::new(job, now));

        loop {
            match run.step {
                PatchStep::Acked => {
                    run.started_at = now;
                    if self.report(&mut run, live_state, Progress::Started).await?.is_none() {
                        return Ok(RunOutcome::Cancelled);
                    }
                    run.step = PatchStep::PreReboot;
                    live_state.put(run.clone())?;
                }
                PatchStep::PreReboot => {
                    // Advance to Patching before the reboot primitive fires so a
                    // crash mid-reboot resumes in Patching, not PreReboot again.
                    run.step = PatchStep::Patching;
                    live_state.put(run.clone())?;

                    let first_pass = run.reboot_count == 0;
                    if self.should_reboot_pre(&run.job.patch_config, first_pass).await {
                        if let Some(outcome) = self.maybe_reboot(&mut run, live_state).await? {
                            return Ok(outcome);
                        }
                    }
                }
                PatchStep::Patching => {
                    if !run.job.dry_run {
                        if let Some(pre_step) = run.job.patch_config.pre_step.clone() {
                            if self.run_exec_step(&pre_step, Progress::PrePatchStep, &mut run, live_state).await?.is_none() {
                                return Ok(RunOutcome::Cancelled);
                            }
                        }
                    }

                    if self.report(&mut run, live_state, Progress::ApplyingPatches).await?.is_none() {
                        return Ok(RunOutcome::Cancelled);
                    }
                    if !run.job.dry_run {
                        self.apply_updates(&run.job.patch_config).await?;

                        if let Some(post_step) = run.job.patch_config.post_step.clone() {
                            if self.run_exec_step(&post_step, Progress::PostPatchStep, &mut run, live_state).await?.is_none() {
                                return Ok(RunOutcome::Cancelled);
                            }
                        }
                    }

                    let first_pass = run.reboot_count == 0;
                    if self.should_reboot_post(&run.job.patch_config, first_pass).await {
                        if let Some(outcome) = self.maybe_reboot(&mut run, live_state).await? {
                            return Ok(outcome);
                        }
                    }

                    run.step = PatchStep::ReportSuccess;
                    live_state.put(run.clone())?;
                }
                PatchStep::ReportSuccess => {
                    let reboot_required = self.platform.reboot_probe().reboot_required().await;
                    let output = if reboot_required { "SUCCEEDED_REBOOT_REQUIRED" } else { "SUCCEEDED" };
                    let _ = retry(REPORT_DEADLINE, "report_task_complete", is_transient_rpc, || {
                        self.control_plane.report_task_complete(&job_id, None, output)
                    })
                    .await;
                    live_state.remove(&job_id)?;
                    return Ok(RunOutcome::Succeeded { reboot_required });
                }
            }
        }
    }

    /// Report progress; on a `Stop` directive, report a best-effort
    /// cancellation completion and remove the run from live state
    /// (spec.md §8 "Patch state-machine cancel" scenario). Returns `None`
    /// when the caller should stop driving the state machine.
    async fn report(&self, run: &mut PatchRun, live_state: &mut LiveState, progress: Progress) -> Result<Option<()>, PatchError> {
        let job_id = run.job.job_id.clone();
        let labels = run.log_labels.clone();
        let directive = retry(REPORT_DEADLINE, "report_task_progress", is_transient_rpc, || {
            self.control_plane.report_task_progress(&job_id, progress, &labels)
        })
        .await?;

        if directive == TaskDirective::Stop {
            let _ = retry(REPORT_DEADLINE, "report_task_complete", is_transient_rpc, || {
                self.control_plane.report_task_complete(&job_id, Some("cancelled by control plane"), "")
            })
            .await;
            live_state.remove(&job_id)?;
            return Ok(None);
        }
        Ok(Some(()))
    }

    /// Pre-patch reboot predicate (spec.md §4.4 PRE_REBOOT): the only skip
    /// case is ALWAYS with a prior reboot already counted this job. Every
    /// other case, including ALWAYS on the first pass, consults the probe —
    /// rebooting before any packages are applied is never forced.
    async fn should_reboot_pre(&self, config: &PatchConfig, first_pass: bool) -> bool {
        if config.reboot_config == RebootConfig::Always && !first_pass {
            return false;
        }
        if config.reboot_config == RebootConfig::Never {
            return false;
        }
        self.platform.reboot_probe().reboot_required().await
    }

    /// Post-patch reboot predicate (spec.md §4.4 PATCHING): same skip case
    /// as the pre-patch predicate, but ALWAYS on the first pass is forced
    /// true here instead of consulting the probe.
    async fn should_reboot_post(&self, config: &PatchConfig, first_pass: bool) -> bool {
        if config.reboot_config == RebootConfig::Always && !first_pass {
            return false;
        }
        if config.reboot_config == RebootConfig::Never {
            return false;
        }
        if config.reboot_config == RebootConfig::Always {
            return true;
        }
        self.platform.reboot_probe().reboot_required().await
    }

    /// Report REBOOTING, and if the config doesn't forbid it, increment
    /// `reboot_count`, persist, and invoke the reboot primitive. Returns the
    /// outcome the caller should return immediately, or `None` to keep
    /// driving the state machine without rebooting.
    async fn maybe_reboot(&self, run: &mut PatchRun, live_state: &mut LiveState) -> Result<Option<RunOutcome>, PatchError> {
        if self.report(run, live_state, Progress::Rebooting).await?.is_none() {
            return Ok(Some(RunOutcome::Cancelled));
        }
        if run.job.patch_config.reboot_config != RebootConfig::Never && !run.job.dry_run {
            run.reboot_count += 1;
            live_state.put(run.clone())?;
            self.platform.reboot().await.map_err(PatchError::Reboot)?;
            return Ok(Some(RunOutcome::RebootIssued));
        }
        Ok(None)
    }

    /// Run a pre- or post-patch exec step (spec.md §3 PatchJob's optional
    /// pre-step/post-step), reporting `progress` first. Returns `None` when
    /// the control plane cancelled the job mid-report. Both sources resolve
    /// to script text dispatched through the same interpreter selection the
    /// recipe crate's `ScriptRun` step uses.
    async fn run_exec_step(
        &self,
        step: &ExecStepConfig,
        progress: Progress,
        run: &mut PatchRun,
        live_state: &mut LiveState,
    ) -> Result<Option<()>, PatchError> {
        if self.report(run, live_state, progress).await?.is_none() {
            return Ok(None);
        }

        let interpreter = match step.interpreter {
            PatchInterpreter::Unspecified => StepInterpreter::Unspecified,
            PatchInterpreter::Shell => StepInterpreter::Shell,
            PatchInterpreter::Powershell => StepInterpreter::Powershell,
        };

        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
        let workdir = std::env::temp_dir().join(format!("osconfig-patch-exec-step-{}-{nanos}", run.job.job_id));
        tokio::fs::create_dir_all(&workdir).await?;

        let body = match &step.source {
            ExecSource::LocalPath(path) => tokio::fs::read_to_string(Path::new(path)).await.map_err(PatchError::from),
            ExecSource::RemoteObject { bucket, object } => {
                let dest = workdir.join("exec_step_source");
                let artifact = Artifact::Gcs { bucket: bucket.clone(), object: object.clone(), generation: None };
                match self.fetchers.fetch(&artifact, &dest).await {
                    Ok(()) => tokio::fs::read_to_string(&dest).await.map_err(PatchError::from),
                    Err(err) => Err(PatchError::from(err)),
                }
            }
        };

        let run_result = match body {
            Ok(body) => osconfig_recipe::exec_step::run_script(&workdir, &body, interpreter, &[], &step.allowed_success_codes)
                .await
                .map_err(PatchError::from),
            Err(err) => Err(err),
        };
        let _ = tokio::fs::remove_dir_all(&workdir).await;
        run_result?;
        Ok(Some(()))
    }

    async fn apply_updates(&self, config: &PatchConfig) -> Result<(), PatchError> {
        for adapter in &self.adapters {
            if !adapter.available() {
                continue;
            }
            let family = adapter.family();
            let (exclusive, excludes) = family_filter(config, family);

            let query_options = UpdateQueryOptions::default();
            let updates = retry(PACKAGE_UPDATE_DEADLINE, "available_updates", |_| true, || {
                adapter.available_updates(&query_options)
            })
            .await;
            let updates = match updates {
                Ok(updates) => updates,
                Err(source) => {
                    tracing::warn!(%family, %source, "skipping family after repeated failures probing updates");
                    continue;
                }
            };

            let names: Vec<&str> = updates.iter().map(|p| p.name.as_str()).collect();
            let filtered = filter_names(names, &exclusive, &excludes).map_err(|_| PatchError::Configuration { family })?;
            if filtered.is_empty() {
                continue;
            }
            let owned: Vec<String> = filtered.into_iter().map(String::from).collect();
            retry(PACKAGE_UPDATE_DEADLINE, "install", |_| true, || adapter.install(&owned))
                .await
                .map_err(|source| PatchError::PackageUpdate { family, source })?;
        }
        Ok(())
    }
}

/// Per-family allowlist/denylist pair from the patch config (spec.md §4.5).
/// Families with no configurable settings (rpm, googet) always return
/// empty/empty, i.e. no filtering.
fn family_filter(config: &PatchConfig, family: PackageFamily) -> (Vec<Exclude>, Vec<Exclude>) {
    match family {
        PackageFamily::Apt => (config.apt.exclusive_packages.clone(), config.apt.excludes.clone()),
        PackageFamily::Yum => (config.yum.exclusive_packages.clone(), config.yum.excludes.clone()),
        PackageFamily::Zypper => (config.zypper.exclusive_packages.clone(), config.zypper.excludes.clone()),
        _ => (Vec::new(), Vec::new()),
    }
}
