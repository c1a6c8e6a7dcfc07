// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `osconfig inventory` (spec.md §4.6): collect one `InstanceInventory` and
//! post every field to the attributes sink.

use super::AgentContext;
use anyhow::Result;

pub async fn run(ctx: &AgentContext) -> Result<()> {
    let inventory = crate::inventory_collect::collect(env!("CARGO_PKG_VERSION"), &ctx.package_adapters).await;
    tracing::info!(
        hostname = %inventory.hostname,
        installed = inventory.installed_packages.get(osconfig_core::PackageFamily::Apt).map(<[_]>::len).unwrap_or(0),
        "collected inventory"
    );

    match ctx.attributes_sink() {
        Some(sink) => osconfig_daemon::inventory::report(&sink, &inventory).await,
        None => tracing::warn!("no attributes sink configured (OSCONFIG_ATTRIBUTES_URL unset), skipping report"),
    }
    Ok(())
}
