// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `osconfig policies` (spec.md §4.2): look up the recipes this instance
//! should converge to and run each one through the installer.

use super::AgentContext;
use anyhow::{anyhow, Context, Result};
use osconfig_adapters::fetch::FetcherRegistry;
use osconfig_core::Clock;
use osconfig_storage::RecipeDb;

pub async fn run(ctx: &AgentContext) -> Result<()> {
    let Some(base_url) = ctx.config.control_plane_url.as_deref() else {
        tracing::warn!("no control plane configured (OSCONFIG_CONTROL_PLANE_URL unset), nothing to converge");
        return Ok(());
    };
    let instance_id = ctx
        .config
        .instance_id
        .clone()
        .ok_or_else(|| anyhow!("OSCONFIG_INSTANCE_ID must be set to look up recipes"))?;

    let recipes = crate::recipe_source::fetch_recipes(&ctx.http_client, base_url, &instance_id)
        .await
        .context("recipe lookup failed")?;

    let mut db = RecipeDb::load(ctx.recipe_db_path()).context("loading recipe db")?;
    let fetchers = FetcherRegistry::default_set();
    let clock = osconfig_core::SystemClock;
    let mut failures = Vec::new();

    for spec in &recipes {
        let mut installer = osconfig_installer::RecipeInstaller::new(
            &mut db,
            &fetchers,
            std::env::temp_dir().join("osconfig-recipe-runs"),
            clock.unix_seconds(),
        );
        if let Err(err) = installer.converge(spec).await {
            tracing::error!(recipe = %spec.name, %err, "recipe convergence failed");
            failures.push(spec.name.clone());
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("{} recipe(s) failed to converge: {}", failures.len(), failures.join(", ")))
    }
}
