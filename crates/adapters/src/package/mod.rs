// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Package-manager adapter contract (spec.md §6) and concrete, subprocess-
//! backed implementations for each family.

mod apt;
mod googet;
pub mod parsers;
mod rpm;
mod yum;
mod zypper;

pub use apt::AptAdapter;
pub use googet::GoogetAdapter;
pub use rpm::RpmAdapter;
pub use yum::YumAdapter;
pub use zypper::{ZypperAdapter, ZypperPatchQuery};

use crate::error::AdapterError;
use async_trait::async_trait;
use osconfig_core::{PackageFamily, PackageInfo};

/// Options narrowing an `available_updates` query (per-family settings are
/// applied by the patch runner before filtering; this trait only describes
/// what the adapter itself can natively restrict).
#[derive(Debug, Clone, Default)]
pub struct UpdateQueryOptions {
    pub security_only: bool,
}

/// One implementation per package-manager family (spec.md §6).
#[async_trait]
pub trait PackageAdapter: Send + Sync {
    fn family(&self) -> PackageFamily;

    /// Whether the manager's binary is present on this host.
    fn available(&self) -> bool;

    async fn installed(&self) -> Result<Vec<PackageInfo>, AdapterError>;

    async fn available_updates(&self, opts: &UpdateQueryOptions) -> Result<Vec<PackageInfo>, AdapterError>;

    async fn install(&self, names: &[String]) -> Result<(), AdapterError>;

    async fn remove(&self, names: &[String]) -> Result<(), AdapterError>;
}

/// True if a binary of the given name exists on `PATH`. Used by each
/// adapter's `available()` probe (spec.md §7 "local environmental" errors:
/// missing binary skips the family, does not abort others).
pub fn binary_on_path(name: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(name).is_file()))
        .unwrap_or(false)
}
