// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Host-fact and package collection for a fresh `InstanceInventory`
//! (spec.md §4.6). Every OS-specific probe shells out via `osconfig_exec`
//! rather than a native system-info crate, matching the reboot probes and
//! package adapters in `osconfig-adapters`.

use osconfig_adapters::{PackageAdapter, UpdateQueryOptions};
use osconfig_core::{InstanceInventory, Packages};
use osconfig_exec::CommandSpec;
use std::sync::Arc;

struct HostFacts {
    hostname: String,
    short_name: String,
    long_name: String,
    os_version: String,
    kernel_version: String,
    kernel_release: String,
    architecture: String,
}

#[cfg(unix)]
async fn host_facts() -> HostFacts {
    let (short_name, long_name, os_version) = parse_os_release(
        &tokio::fs::read_to_string("/etc/os-release").await.unwrap_or_default(),
    );
    HostFacts {
        hostname: uname("-n").await,
        short_name,
        long_name,
        os_version,
        kernel_version: uname("-v").await,
        kernel_release: uname("-r").await,
        architecture: uname("-m").await,
    }
}

#[cfg(unix)]
async fn uname(flag: &str) -> String {
    let spec = CommandSpec::new("uname").arg(flag);
    osconfig_exec::run(&spec).await.map(|out| out.stdout_string().trim().to_string()).unwrap_or_default()
}

fn parse_os_release(contents: &str) -> (String, String, String) {
    let mut id = String::new();
    let mut pretty_name = String::new();
    let mut version_id = String::new();
    for line in contents.lines() {
        let Some((key, value)) = line.split_once('=') else { continue };
        let value = value.trim().trim_matches('"').to_string();
        match key {
            "ID" => id = value,
            "PRETTY_NAME" => pretty_name = value,
            "VERSION_ID" => version_id = value,
            _ => {}
        }
    }
    (id, pretty_name, version_id)
}

#[cfg(windows)]
async fn host_facts() -> HostFacts {
    HostFacts {
        hostname: std::env::var("COMPUTERNAME").unwrap_or_default(),
        short_name: "windows".to_string(),
        long_name: "Windows".to_string(),
        os_version: std::env::var("OS").unwrap_or_default(),
        kernel_version: String::new(),
        kernel_release: String::new(),
        architecture: std::env::var("PROCESSOR_ARCHITECTURE").unwrap_or_default(),
    }
}

/// Query every available adapter for installed packages and updates
/// (spec.md §4.6). One adapter's failure is logged and does not block
/// the others.
async fn collect_packages(adapters: &[Arc<dyn PackageAdapter>]) -> (Packages, Packages) {
    let mut installed = Packages::default();
    let mut updates = Packages::default();
    for adapter in adapters {
        if !adapter.available() {
            continue;
        }
        let family = adapter.family();
        match adapter.installed().await {
            Ok(packages) => installed.set(family, packages),
            Err(err) => tracing::warn!(%family, %err, "failed to list installed packages"),
        }
        match adapter.available_updates(&UpdateQueryOptions::default()).await {
            Ok(packages) => updates.set(family, packages),
            Err(err) => tracing::warn!(%family, %err, "failed to list available updates"),
        }
    }
    (installed, updates)
}

pub async fn collect(agent_version: &str, adapters: &[Arc<dyn PackageAdapter>]) -> InstanceInventory {
    let facts = host_facts().await;
    let (installed_packages, available_updates) = collect_packages(adapters).await;
    InstanceInventory {
        hostname: facts.hostname,
        short_name: facts.short_name,
        long_name: facts.long_name,
        os_version: facts.os_version,
        kernel_version: facts.kernel_version,
        kernel_release: facts.kernel_release,
        architecture: facts.architecture,
        agent_version: agent_version.to_string(),
        installed_packages,
        available_updates,
        last_updated: chrono::Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_id_pretty_name_and_version_from_os_release() {
        let contents = "NAME=\"Ubuntu\"\nID=ubuntu\nPRETTY_NAME=\"Ubuntu 22.04.3 LTS\"\nVERSION_ID=\"22.04\"\n";
        let (id, pretty, version) = parse_os_release(contents);
        assert_eq!(id, "ubuntu");
        assert_eq!(pretty, "Ubuntu 22.04.3 LTS");
        assert_eq!(version, "22.04");
    }

    #[test]
    fn missing_fields_default_to_empty_strings() {
        let (id, pretty, version) = parse_os_release("NAME=\"Arch Linux\"\n");
        assert!(id.is_empty());
        assert!(pretty.is_empty());
        assert!(version.is_empty());
    }
}
