// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::parsers::{parse_apt_upgradable, parse_dpkg_query};
use super::{binary_on_path, PackageAdapter, UpdateQueryOptions};
use crate::error::AdapterError;
use async_trait::async_trait;
use osconfig_core::{PackageFamily, PackageInfo};
use osconfig_exec::CommandSpec;

const FAMILY: &str = "apt";

#[derive(Debug, Default)]
pub struct AptAdapter;

#[async_trait]
impl PackageAdapter for AptAdapter {
    fn family(&self) -> PackageFamily {
        PackageFamily::Apt
    }

    fn available(&self) -> bool {
        binary_on_path("dpkg-query") && binary_on_path("apt-get")
    }

    async fn installed(&self) -> Result<Vec<PackageInfo>, AdapterError> {
        if !self.available() {
            return Err(AdapterError::Unavailable { family: FAMILY });
        }
        let spec = CommandSpec::new("dpkg-query")
            .args(["-W", "-f=${Package} ${Architecture} ${Version}\n"]);
        let out = osconfig_exec::run(&spec).await?;
        Ok(parse_dpkg_query(&out.stdout_string()))
    }

    async fn available_updates(&self, _opts: &UpdateQueryOptions) -> Result<Vec<PackageInfo>, AdapterError> {
        if !self.available() {
            return Err(AdapterError::Unavailable { family: FAMILY });
        }
        let spec = CommandSpec::new("apt-get").args(["full-upgrade", "--just-print", "-V"]);
        let out = osconfig_exec::run(&spec).await?;
        Ok(parse_apt_upgradable(&out.stdout_string()))
    }

    async fn install(&self, names: &[String]) -> Result<(), AdapterError> {
        tracing::info!(family = FAMILY, count = names.len(), "installing packages");
        let spec = CommandSpec::new("apt-get").arg("install").arg("-y").args(names.to_vec());
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
        let spec = CommandSpec::new("apt-get").arg("remove").arg("-y").args(names.to_vec());
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
