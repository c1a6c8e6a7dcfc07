// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Recipe step payloads (spec.md §4.3).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveType {
    Zip,
    Tar,
    TarGzip,
    TarBzip,
    TarLzma,
    TarXz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpreter {
    Unspecified,
    Shell,
    Powershell,
}

/// Either a reference into the run's fetched-artifact map, or an explicit
/// local filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecLocation {
    ArtifactId(String),
    Path(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecipeStep {
    FileCopy {
        artifact_id: String,
        destination: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        permissions: Option<String>,
        #[serde(default)]
        overwrite: bool,
    },
    ArchiveExtraction {
        artifact_id: String,
        destination: String,
        archive_type: ArchiveType,
    },
    MsiInstallation {
        artifact_id: String,
        #[serde(default)]
        flags: Vec<String>,
        #[serde(default)]
        allowed_exit_codes: HashSet<i32>,
    },
    DpkgInstallation {
        artifact_id: String,
        #[serde(default)]
        allowed_exit_codes: HashSet<i32>,
    },
    RpmInstallation {
        artifact_id: String,
        #[serde(default)]
        allowed_exit_codes: HashSet<i32>,
    },
    FileExec {
        location: ExecLocation,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        allowed_exit_codes: HashSet<i32>,
    },
    ScriptRun {
        script_body: String,
        interpreter: Interpreter,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        allowed_exit_codes: HashSet<i32>,
    },
}

impl RecipeStep {
    /// Short tag naming the step's variant, used in step-failure diagnostics
    /// (spec.md §4.2 step 6: "surface the error with the step index and type").
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::FileCopy { .. } => "FileCopy",
            Self::ArchiveExtraction { .. } => "ArchiveExtraction",
            Self::MsiInstallation { .. } => "MsiInstallation",
            Self::DpkgInstallation { .. } => "DpkgInstallation",
            Self::RpmInstallation { .. } => "RpmInstallation",
            Self::FileExec { .. } => "FileExec",
            Self::ScriptRun { .. } => "ScriptRun",
        }
    }
}

/// Parse an octal permission string; empty means `0o755` (spec.md §4.3 FileCopy).
pub fn parse_permissions(s: Option<&str>) -> Result<u32, std::num::ParseIntError> {
    match s {
        None | Some("") => Ok(0o755),
        Some(s) => u32::from_str_radix(s, 8),
    }
}
