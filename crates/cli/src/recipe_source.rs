// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Recipe lookup (spec.md §6): fetches the set of recipes this instance
//! should converge to. Same HTTP+JSON shape as the control-plane client,
//! kept as a plain function rather than a trait since the `policies` verb
//! is its only caller.

use osconfig_core::RecipeSpec;
use osconfig_wire::{RecipeLookupRequest, RecipeLookupResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecipeSourceError {
    #[error("recipe lookup request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("recipe lookup returned status {0}")]
    Status(reqwest::StatusCode),
}

pub async fn fetch_recipes(
    client: &reqwest::Client,
    base_url: &str,
    instance_id: &str,
) -> Result<Vec<RecipeSpec>, RecipeSourceError> {
    let url = format!("{}/recipes", base_url.trim_end_matches('/'));
    let request = RecipeLookupRequest { instance_id: instance_id.to_string() };
    let response = client.post(url).json(&request).send().await?;
    if !response.status().is_success() {
        return Err(RecipeSourceError::Status(response.status()));
    }
    let parsed: RecipeLookupResponse = response.json().await?;
    Ok(parsed.recipes)
}
