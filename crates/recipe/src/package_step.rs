// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `MsiInstallation` / `DpkgInstallation` / `RpmInstallation` (spec.md
//! §4.3): each delegates to the platform's own installer with the
//! artifact's local path, propagating the step's allowed-exit-codes.

use crate::error::StepError;
use osconfig_exec::CommandSpec;
use std::collections::HashSet;
use std::path::Path;

pub async fn install_msi(path: &Path, flags: &[String], allowed_exit_codes: &HashSet<i32>) -> Result<(), StepError> {
    if !cfg!(windows) {
        return Err(StepError::PlatformMismatch {
            step: "MsiInstallation",
            detail: "msiexec is only available on Windows".to_string(),
        });
    }
    let spec = CommandSpec::new("msiexec")
        .args(["/i", &path.display().to_string(), "/quiet", "/norestart"])
        .args(flags.to_vec());
    osconfig_exec::run_checked(&spec, allowed_exit_codes).await?;
    Ok(())
}

pub async fn install_dpkg(path: &Path, allowed_exit_codes: &HashSet<i32>) -> Result<(), StepError> {
    let spec = CommandSpec::new("dpkg").arg("-i").arg(path.display().to_string());
    osconfig_exec::run_checked(&spec, allowed_exit_codes).await?;
    Ok(())
}

pub async fn install_rpm(path: &Path, allowed_exit_codes: &HashSet<i32>) -> Result<(), StepError> {
    let spec = CommandSpec::new("rpm").arg("-U").arg("--replacepkgs").arg(path.display().to_string());
    osconfig_exec::run_checked(&spec, allowed_exit_codes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn msi_on_non_windows_is_a_platform_mismatch() {
        if cfg!(windows) {
            return;
        }
        let err = install_msi(Path::new("/tmp/pkg.msi"), &[], &HashSet::new()).await.unwrap_err();
        assert!(matches!(err, StepError::PlatformMismatch { .. }));
    }
}
