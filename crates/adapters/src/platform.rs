// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `PlatformOps` hides every OS-specific branch (file paths, reboot
//! primitives, recipe-db location) behind one capability so the patch
//! runner and recipe installer carry no `cfg(windows)`/`cfg(unix)` of their
//! own (spec.md §9 redesign note).

use crate::reboot::{LinuxRebootProbe, RebootProbe, WindowsRebootProbe};
use async_trait::async_trait;
use osconfig_storage::{DEFAULT_POSIX_PATH, DEFAULT_WINDOWS_PATH};
use std::path::PathBuf;
use std::sync::Arc;

#[async_trait]
pub trait PlatformOps: Send + Sync {
    fn recipe_db_path(&self) -> PathBuf;
    fn live_state_path(&self) -> PathBuf;
    fn reboot_probe(&self) -> Arc<dyn RebootProbe>;

    /// Issue the OS reboot command. Per spec.md §9, the caller must then
    /// block indefinitely rather than return — this call only requests the
    /// reboot, it does not wait for it.
    async fn reboot(&self) -> Result<(), std::io::Error>;
}

#[derive(Debug, Default)]
pub struct LinuxPlatform;

#[async_trait]
impl PlatformOps for LinuxPlatform {
    fn recipe_db_path(&self) -> PathBuf {
        PathBuf::from(DEFAULT_POSIX_PATH)
    }

    fn live_state_path(&self) -> PathBuf {
        PathBuf::from("/var/lib/google/osconfig_agent/patch_live_state.json")
    }

    fn reboot_probe(&self) -> Arc<dyn RebootProbe> {
        Arc::new(LinuxRebootProbe)
    }

    async fn reboot(&self) -> Result<(), std::io::Error> {
        let spec = osconfig_exec::CommandSpec::new("shutdown").args(["-r", "now"]);
        osconfig_exec::run(&spec).await.map(|_| ()).map_err(std::io::Error::other)
    }
}

#[derive(Debug, Default)]
pub struct WindowsPlatform;

#[async_trait]
impl PlatformOps for WindowsPlatform {
    fn recipe_db_path(&self) -> PathBuf {
        PathBuf::from(DEFAULT_WINDOWS_PATH)
    }

    fn live_state_path(&self) -> PathBuf {
        PathBuf::from(r"C:\ProgramData\Google\osconfig_agent\patch_live_state.json")
    }

    fn reboot_probe(&self) -> Arc<dyn RebootProbe> {
        Arc::new(WindowsRebootProbe)
    }

    async fn reboot(&self) -> Result<(), std::io::Error> {
        let spec = osconfig_exec::CommandSpec::new("shutdown").args(["/r", "/t", "0"]);
        osconfig_exec::run(&spec).await.map(|_| ()).map_err(std::io::Error::other)
    }
}

/// The platform matching the binary's own build target.
pub fn current() -> Arc<dyn PlatformOps> {
    #[cfg(windows)]
    {
        Arc::new(WindowsPlatform)
    }
    #[cfg(not(windows))]
    {
        Arc::new(LinuxPlatform)
    }
}
