// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Recipe domain types: the installed-state record and the install spec.

use crate::artifact::Artifact;
use crate::step::RecipeStep;
use crate::version::RecipeVersion;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A recipe's installed-state record, as persisted in the recipe DB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub version: RecipeVersion,
    pub install_time: i64,
    pub success: bool,
}

/// The desired end state a recipe installer run should reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesiredState {
    Installed,
    Updated,
    Removed,
}

/// A recipe specification supplied to the installer (spec.md §4.2 Input).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSpec {
    pub name: String,
    pub version: RecipeVersion,
    pub desired_state: DesiredState,
    pub artifacts: HashMap<String, Artifact>,
    pub install_steps: Vec<RecipeStep>,
    pub update_steps: Vec<RecipeStep>,
}

/// What the decision procedure (spec.md §4.2 step 1) chose to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallDecision {
    NoOp,
    RunInstallSteps,
    RunUpdateSteps,
}

/// Decide whether to no-op, install, or update, given the DB's current
/// record for this recipe name (if any).
pub fn decide(existing: Option<&Recipe>, spec: &RecipeSpec) -> InstallDecision {
    match (existing, spec.desired_state) {
        (Some(_), DesiredState::Installed) => InstallDecision::NoOp,
        (Some(recipe), DesiredState::Updated) => {
            if recipe.version < spec.version {
                InstallDecision::RunUpdateSteps
            } else {
                InstallDecision::NoOp
            }
        }
        (None, DesiredState::Installed) | (None, DesiredState::Updated) => {
            InstallDecision::RunInstallSteps
        }
        (_, DesiredState::Removed) => InstallDecision::NoOp,
    }
}
