// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::parsers::parse_dpkg_query;
use super::{binary_on_path, PackageAdapter, UpdateQueryOptions};
use crate::error::AdapterError;
use async_trait::async_trait;
use osconfig_core::{PackageFamily, PackageInfo};
use osconfig_exec::CommandSpec;

const FAMILY: &str = "rpm";

/// Bare `rpm` database access, used directly by recipe `RpmInstallation`
/// steps (spec.md §4.3) on hosts that have no `yum`/`zypper` front end, or
/// when a recipe names an exact `.rpm` file to install rather than a
/// repository package name.
#[derive(Debug, Default)]
pub struct RpmAdapter;

#[async_trait]
impl PackageAdapter for RpmAdapter {
    fn family(&self) -> PackageFamily {
        PackageFamily::Rpm
    }

    fn available(&self) -> bool {
        binary_on_path("rpm")
    }

    async fn installed(&self) -> Result<Vec<PackageInfo>, AdapterError> {
        if !self.available() {
            return Err(AdapterError::Unavailable { family: FAMILY });
        }
        let spec = CommandSpec::new("rpm").args(["-qa", "--queryformat", "%{NAME} %{ARCH} %{VERSION}-%{RELEASE}\n"]);
        let out = osconfig_exec::run(&spec).await?;
        Ok(parse_dpkg_query(&out.stdout_string()))
    }

    /// The bare `rpm` database has no concept of a remote repository, so it
    /// cannot answer "what's available" — only `yum`/`zypper` can. Always
    /// empty; callers that want upgrade detection should use those adapters.
    async fn available_updates(&self, _opts: &UpdateQueryOptions) -> Result<Vec<PackageInfo>, AdapterError> {
        if !self.available() {
            return Err(AdapterError::Unavailable { family: FAMILY });
        }
        Ok(Vec::new())
    }

    /// `names` are paths to local `.rpm` files, not repository package names.
    async fn install(&self, names: &[String]) -> Result<(), AdapterError> {
        let spec = CommandSpec::new("rpm").arg("-U").arg("--replacepkgs").args(names.to_vec());
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
        let spec = CommandSpec::new("rpm").arg("-e").args(names.to_vec());
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
