// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Construction of the concrete collaborators the agent core only sees as
//! trait objects (spec.md §6): package adapters, the platform capability,
//! and the artifact fetcher registry. This is the one place in the repo
//! that knows every adapter's concrete type.

use osconfig_adapters::{AptAdapter, GoogetAdapter, PackageAdapter, PlatformOps, RpmAdapter, YumAdapter, ZypperAdapter};
use std::sync::Arc;

/// Every package-manager adapter this binary ships with; callers filter
/// by `.available()` before use (spec.md §7 "local environmental" errors).
pub fn all_package_adapters() -> Vec<Arc<dyn PackageAdapter>> {
    vec![
        Arc::new(AptAdapter),
        Arc::new(YumAdapter),
        Arc::new(ZypperAdapter),
        Arc::new(RpmAdapter),
        Arc::new(GoogetAdapter),
    ]
}

pub fn available_package_adapters() -> Vec<Arc<dyn PackageAdapter>> {
    all_package_adapters().into_iter().filter(|adapter| adapter.available()).collect()
}

pub fn platform() -> Arc<dyn PlatformOps> {
    osconfig_adapters::current_platform()
}
