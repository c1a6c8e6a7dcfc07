// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::parsers::parse_googet_update;
use super::{binary_on_path, PackageAdapter, UpdateQueryOptions};
use crate::error::AdapterError;
use async_trait::async_trait;
use osconfig_core::{PackageFamily, PackageInfo};
use osconfig_exec::CommandSpec;

const FAMILY: &str = "googet";

/// Windows-native adapter (GooGet is Google's own package manager, shipped
/// on Windows images alongside MSI support).
#[derive(Debug, Default)]
pub struct GoogetAdapter;

#[async_trait]
impl PackageAdapter for GoogetAdapter {
    fn family(&self) -> PackageFamily {
        PackageFamily::Googet
    }

    fn available(&self) -> bool {
        binary_on_path("googet") || binary_on_path("googet.exe")
    }

    async fn installed(&self) -> Result<Vec<PackageInfo>, AdapterError> {
        if !self.available() {
            return Err(AdapterError::Unavailable { family: FAMILY });
        }
        let spec = CommandSpec::new("googet").args(["installed", "-info"]);
        let out = osconfig_exec::run(&spec).await?;
        Ok(parse_installed(&out.stdout_string()))
    }

    async fn available_updates(&self, _opts: &UpdateQueryOptions) -> Result<Vec<PackageInfo>, AdapterError> {
        if !self.available() {
            return Err(AdapterError::Unavailable { family: FAMILY });
        }
        let spec = CommandSpec::new("googet").args(["update", "-dry_run"]);
        let out = osconfig_exec::run(&spec).await?;
        Ok(parse_googet_update(&out.stdout_string()))
    }

    async fn install(&self, names: &[String]) -> Result<(), AdapterError> {
        let spec = CommandSpec::new("googet").arg("-noconfirm").arg("install").args(names.to_vec());
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
        let spec = CommandSpec::new("googet").arg("-noconfirm").arg("remove").args(names.to_vec());
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

/// `googet installed -info` output: repeated `Name: <pkg>.<arch>` /
/// `Version: <ver>` pairs, one package per block.
fn parse_installed(output: &str) -> Vec<PackageInfo> {
    let mut packages = Vec::new();
    let mut pending_name_arch: Option<(String, String)> = None;
    for line in output.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Name: ") {
            if let Some((name, arch)) = rest.rsplit_once('.') {
                pending_name_arch = Some((name.to_string(), arch.to_string()));
            }
        } else if let Some(rest) = line.strip_prefix("Version: ") {
            if let Some((name, arch)) = pending_name_arch.take() {
                packages.push(PackageInfo::new(name, arch, rest.trim()));
            }
        }
    }
    packages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_version_blocks() {
        let out = "Name: foo.x86_64\nVersion: 1.0.0@1\nName: bar.noarch\nVersion: 2.0.0@1\n";
        let parsed = parse_installed(out);
        assert_eq!(parsed, vec![
            PackageInfo::new("foo", "x86_64", "1.0.0@1"),
            PackageInfo::new("bar", "noarch", "2.0.0@1"),
        ]);
    }
}
