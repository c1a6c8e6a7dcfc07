// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::parsers::{parse_zypper_list_updates, ZypperPatchRow, ZypperPatchStatus};
use super::{binary_on_path, parsers::parse_zypper_patches, PackageAdapter, UpdateQueryOptions};
use crate::error::AdapterError;
use async_trait::async_trait;
use osconfig_core::{PackageFamily, PackageInfo};
use osconfig_exec::CommandSpec;

const FAMILY: &str = "zypper";

#[derive(Debug, Default)]
pub struct ZypperAdapter;

#[async_trait]
impl PackageAdapter for ZypperAdapter {
    fn family(&self) -> PackageFamily {
        PackageFamily::Zypper
    }

    fn available(&self) -> bool {
        binary_on_path("zypper")
    }

    async fn installed(&self) -> Result<Vec<PackageInfo>, AdapterError> {
        if !self.available() {
            return Err(AdapterError::Unavailable { family: FAMILY });
        }
        let spec = CommandSpec::new("rpm").args(["-qa", "--queryformat", "%{NAME} %{ARCH} %{VERSION}-%{RELEASE}\n"]);
        let out = osconfig_exec::run(&spec).await?;
        Ok(super::parsers::parse_dpkg_query(&out.stdout_string()))
    }

    async fn available_updates(&self, _opts: &UpdateQueryOptions) -> Result<Vec<PackageInfo>, AdapterError> {
        if !self.available() {
            return Err(AdapterError::Unavailable { family: FAMILY });
        }
        let spec = CommandSpec::new("zypper").args(["--non-interactive", "list-updates"]);
        let out = osconfig_exec::run(&spec).await?;
        Ok(parse_zypper_list_updates(&out.stdout_string()))
    }

    async fn install(&self, names: &[String]) -> Result<(), AdapterError> {
        let spec = CommandSpec::new("zypper").args(["--non-interactive", "install"]).args(names.to_vec());
        let out = osconfig_exec::run(&spec).await?;
        if out.exit_code != 0 {
            return Err(AdapterError::CommandFailed {
                family: FAMILY,
                operation: "install",
                detail: out.stderr_string(),
            });
        }
        Ok(())
    }

    async fn remove(&self, names: &[String]) -> Result<(), AdapterError> {
        let spec = CommandSpec::new("zypper").args(["--non-interactive", "remove"]).args(names.to_vec());
        let out = osconfig_exec::run(&spec).await?;
        if out.exit_code != 0 {
            return Err(AdapterError::CommandFailed {
                family: FAMILY,
                operation: "remove",
                detail: out.stderr_string(),
            });
        }
        Ok(())
    }
}

/// Zypper patch-classification query (spec.md §4.5), distinct from the
/// plain package-update query above: patches and their package sets are
/// queried and filtered through allow/deny lists independently.
#[derive(Debug, Default)]
pub struct ZypperPatchQuery;

impl ZypperPatchQuery {
    pub async fn list_patches(&self) -> Result<Vec<ZypperPatchRow>, AdapterError> {
        let spec = CommandSpec::new("zypper").args(["--non-interactive", "list-patches"]);
        let out = osconfig_exec::run(&spec).await?;
        Ok(parse_zypper_patches(&out.stdout_string()))
    }

    pub async fn installed_patches(&self) -> Result<Vec<ZypperPatchRow>, AdapterError> {
        Ok(self
            .list_patches()
            .await?
            .into_iter()
            .filter(|r| r.status == ZypperPatchStatus::Applied)
            .collect())
    }

    pub async fn available_patches(&self) -> Result<Vec<ZypperPatchRow>, AdapterError> {
        Ok(self
            .list_patches()
            .await?
            .into_iter()
            .filter(|r| r.status == ZypperPatchStatus::Needed)
            .collect())
    }
}
