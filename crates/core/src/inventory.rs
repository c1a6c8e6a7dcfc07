// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-cycle host inventory snapshot.

use crate::package::Packages;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fresh host inventory snapshot. Constructed anew per reporting cycle;
/// the previous value is discarded, never merged into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceInventory {
    pub hostname: String,
    pub short_name: String,
    pub long_name: String,
    pub os_version: String,
    pub kernel_version: String,
    pub kernel_release: String,
    pub architecture: String,
    pub agent_version: String,
    pub installed_packages: Packages,
    pub available_updates: Packages,
    pub last_updated: DateTime<Utc>,
}

impl InstanceInventory {
    /// Fields as `(name, RFC 3339 / raw text)` pairs, for structured logging
    /// and for components that want string fields without the JSON payloads.
    pub fn string_fields(&self) -> [(&'static str, &str); 8] {
        [
            ("Hostname", &self.hostname),
            ("ShortName", &self.short_name),
            ("LongName", &self.long_name),
            ("OSVersion", &self.os_version),
            ("KernelVersion", &self.kernel_version),
            ("KernelRelease", &self.kernel_release),
            ("Architecture", &self.architecture),
            ("AgentVersion", &self.agent_version),
        ]
    }
}
