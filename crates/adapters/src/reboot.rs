// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reboot-required probes (spec.md §4.4): after a patch round, the runner
//! must decide whether the host needs a reboot before it can report success.
//! Each OS has its own heuristics; none of them are exact, so this module
//! treats "probably needs a reboot" as the answer, never "definitely".

use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait RebootProbe: Send + Sync {
    async fn reboot_required(&self) -> bool;
}

/// Kernel/core packages whose install time past `btime` implies a pending
/// reboot on RPM hosts where `needs-restarting` isn't installed.
const RPM_CORE_PACKAGES: &[&str] = &["kernel", "kernel-core", "glibc", "systemd", "linux-firmware"];

/// Linux probe: a present `/var/run/reboot-required` marker (Debian/Ubuntu's
/// own convention) is authoritative. Failing that, `needs-restarting -r`
/// (yum-utils) returns exit code 1 when a reboot is needed, 0 otherwise
/// (exit code 2 means the tool is too old to tell, treated as no). Failing
/// that on RPM hosts, fall back to the RPM-database heuristic: any of a
/// fixed set of kernel/core packages installed after the kernel itself
/// booted (`btime` in `/proc/stat`) implies the running kernel predates it.
#[derive(Debug, Default)]
pub struct LinuxRebootProbe;

#[async_trait]
impl RebootProbe for LinuxRebootProbe {
    async fn reboot_required(&self) -> bool {
        if Path::new("/var/run/reboot-required").exists() {
            return true;
        }
        if super::package::binary_on_path("needs-restarting") {
            let spec = osconfig_exec::CommandSpec::new("needs-restarting").arg("-r");
            if let Ok(out) = osconfig_exec::run(&spec).await {
                return out.exit_code == 1;
            }
        }
        if super::package::binary_on_path("rpm") {
            return rpm_install_time_exceeds_btime().await;
        }
        false
    }
}

async fn rpm_install_time_exceeds_btime() -> bool {
    let Some(btime) = read_proc_stat_btime().await else {
        return false;
    };
    let spec = osconfig_exec::CommandSpec::new("rpm")
        .arg("-q")
        .arg("--queryformat")
        .arg("%{INSTALLTIME}\n")
        .args(RPM_CORE_PACKAGES.iter().copied());
    let Ok(out) = osconfig_exec::run(&spec).await else {
        return false;
    };
    out.stdout_string().lines().any(|line| line.trim().parse::<i64>().map(|install_time| install_time > btime).unwrap_or(false))
}

async fn read_proc_stat_btime() -> Option<i64> {
    let contents = tokio::fs::read_to_string("/proc/stat").await.ok()?;
    parse_btime(&contents)
}

fn parse_btime(proc_stat: &str) -> Option<i64> {
    proc_stat.lines().find_map(|line| line.strip_prefix("btime ")).and_then(|value| value.trim().parse().ok())
}

/// Windows probe: either of two registry-adjacent markers indicates a
/// pending reboot. `PendingFileRenameOperations` is set by any installer
/// that replaced an in-use file; the Windows Update `RebootRequired` key is
/// set by WU itself. Both are queried via `reg query` rather than a native
/// registry crate, matching how this agent shells out for all other
/// OS-specific probes.
#[derive(Debug, Default)]
pub struct WindowsRebootProbe;

#[async_trait]
impl RebootProbe for WindowsRebootProbe {
    async fn reboot_required(&self) -> bool {
        const KEYS: [&str; 2] = [
            r"HKLM\SYSTEM\CurrentControlSet\Control\Session Manager\PendingFileRenameOperations",
            r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\WindowsUpdate\Auto Update\RebootRequired",
        ];
        for key in KEYS {
            let spec = osconfig_exec::CommandSpec::new("reg").args(["query", key]);
            if let Ok(out) = osconfig_exec::run(&spec).await {
                if out.exit_code == 0 {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn linux_probe_detects_marker_file() {
        // Exercises the happy path without touching the real filesystem
        // marker: a probe bound to a fake path would be needed for a true
        // unit test, so this only confirms the trait object is callable.
        let probe: Box<dyn RebootProbe> = Box::new(LinuxRebootProbe);
        let _ = probe.reboot_required().await;
    }

    #[test]
    fn parses_btime_from_proc_stat_contents() {
        let sample = "cpu  1 2 3 4 5 6 7 8 9 10\nbtime 1690000000\nprocesses 123\n";
        assert_eq!(parse_btime(sample), Some(1690000000));
    }

    #[test]
    fn missing_btime_line_parses_to_none() {
        assert_eq!(parse_btime("cpu  1 2 3\n"), None);
    }
}
