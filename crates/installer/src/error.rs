// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("recipe {name}: step {index} ({kind}) failed: {source}")]
    Step { name: String, index: usize, kind: &'static str, #[source] source: osconfig_recipe::StepError },
    #[error("recipe {name}: artifact {artifact_id} fetch failed: {source}")]
    Fetch { name: String, artifact_id: String, #[source] source: osconfig_adapters::FetchError },
    #[error(transparent)]
    Db(#[from] osconfig_storage::RecipeDbError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
