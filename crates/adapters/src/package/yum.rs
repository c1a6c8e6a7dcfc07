// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::parsers::parse_yum_check_update;
use super::{binary_on_path, PackageAdapter, UpdateQueryOptions};
use crate::error::AdapterError;
use async_trait::async_trait;
use osconfig_core::{PackageFamily, PackageInfo};
use osconfig_exec::CommandSpec;

const FAMILY: &str = "yum";

#[derive(Debug, Default)]
pub struct YumAdapter;

#[async_trait]
impl PackageAdapter for YumAdapter {
    fn family(&self) -> PackageFamily {
        PackageFamily::Yum
    }

    fn available(&self) -> bool {
        binary_on_path("yum") && binary_on_path("rpm")
    }

    async fn installed(&self) -> Result<Vec<PackageInfo>, AdapterError> {
        if !self.available() {
            return Err(AdapterError::Unavailable { family: FAMILY });
        }
        let spec = CommandSpec::new("rpm").args(["-qa", "--queryformat", "%{NAME} %{ARCH} %{VERSION}-%{RELEASE}\n"]);
        let out = osconfig_exec::run(&spec).await?;
        Ok(super::parsers::parse_dpkg_query(&out.stdout_string()))
    }

    async fn available_updates(&self, opts: &UpdateQueryOptions) -> Result<Vec<PackageInfo>, AdapterError> {
        if !self.available() {
            return Err(AdapterError::Unavailable { family: FAMILY });
        }
        let mut spec = CommandSpec::new("yum").arg("check-update");
        if opts.security_only {
            spec = spec.arg("--security");
        }
        let out = osconfig_exec::run(&spec).await?;
        // yum check-update exits 100 when updates are available; only 0/100 are success.
        if out.exit_code != 0 && out.exit_code != 100 {
            return Err(AdapterError::CommandFailed {
                family: FAMILY,
                operation: "check-update",
                detail: out.stderr_string(),
            });
        }
        Ok(parse_yum_check_update(&out.stdout_string()))
    }

    async fn install(&self, names: &[String]) -> Result<(), AdapterError> {
        let spec = CommandSpec::new("yum").arg("install").arg("-y").args(names.to_vec());
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
        let spec = CommandSpec::new("yum").arg("remove").arg("-y").args(names.to_vec());
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
