// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Patch job and patch run domain types (spec.md §3, §4.4).

use crate::exclude::Exclude;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

crate::define_id! {
    /// Server-issued patch job identifier.
    pub struct JobId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebootConfig {
    Default,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpreter {
    Unspecified,
    Shell,
    Powershell,
}

/// An exec step keyed by OS, run before or after patching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecStepConfig {
    pub interpreter: Interpreter,
    #[serde(default)]
    pub allowed_success_codes: HashSet<i32>,
    pub source: ExecSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExecSource {
    LocalPath(String),
    RemoteObject { bucket: String, object: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AptSettings {
    pub upgrade_type: Option<String>,
    #[serde(default)]
    pub excludes: Vec<Exclude>,
    #[serde(default)]
    pub exclusive_packages: Vec<Exclude>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YumSettings {
    #[serde(default)]
    pub security: bool,
    #[serde(default)]
    pub minimal: bool,
    #[serde(default)]
    pub excludes: Vec<Exclude>,
    #[serde(default)]
    pub exclusive_packages: Vec<Exclude>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZypperSettings {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub severities: Vec<String>,
    #[serde(default)]
    pub with_update: bool,
    #[serde(default)]
    pub excludes: Vec<Exclude>,
    #[serde(default)]
    pub exclusive_packages: Vec<Exclude>,
    #[serde(default)]
    pub exclusive_patches: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowsUpdateSettings {
    #[serde(default)]
    pub classifications: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub exclusive_patches: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchConfig {
    pub reboot_config: RebootConfig,
    #[serde(default)]
    pub apt: AptSettings,
    #[serde(default)]
    pub yum: YumSettings,
    #[serde(default)]
    pub zypper: ZypperSettings,
    #[serde(default)]
    pub windows_update: WindowsUpdateSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_step: Option<ExecStepConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_step: Option<ExecStepConfig>,
}

impl Default for RebootConfig {
    fn default() -> Self {
        Self::Default
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchJob {
    pub job_id: JobId,
    pub patch_config: PatchConfig,
    pub dry_run: bool,
}

/// The patch run's current state-machine step (spec.md §4.4).
///
/// Serde tags are the canonical on-disk step names chosen to resolve
/// spec.md §9's open question about divergent step-name generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PatchStep {
    Acked,
    PreReboot,
    Patching,
    ReportSuccess,
}

crate::simple_display! {
    PatchStep {
        Acked => "acked",
        PreReboot => "pre_reboot",
        Patching => "patching",
        ReportSuccess => "report_success",
    }
}

/// A durable, resumable in-flight patch job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRun {
    pub job: PatchJob,
    pub started_at: i64,
    pub step: PatchStep,
    pub reboot_count: u32,
    pub log_labels: std::collections::BTreeMap<String, String>,
}

impl PatchRun {
    pub fn new(job: PatchJob, started_at: i64) -> Self {
        Self { job, started_at, step: PatchStep::Acked, reboot_count: 0, log_labels: Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_step_serializes_to_canonical_pascal_case() {
        let json = serde_json::to_string(&PatchStep::PreReboot).unwrap();
        assert_eq!(json, "\"PreReboot\"");
    }

    #[test]
    fn new_run_starts_in_acked_with_zero_reboots() {
        let job = PatchJob {
            job_id: JobId::from("job-1"),
            patch_config: PatchConfig::default(),
            dry_run: false,
        };
        let run = PatchRun::new(job, 100);
        assert_eq!(run.step, PatchStep::Acked);
        assert_eq!(run.reboot_count, 0);
    }
}
