// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Package inventory types shared by patch filtering and the inventory reporter.

use serde::{Deserialize, Serialize};

/// A single installed or available package. Immutable value type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub architecture: String,
    pub version: String,
}

impl PackageInfo {
    pub fn new(
        name: impl Into<String>,
        architecture: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), architecture: architecture.into(), version: version.into() }
    }
}

/// Package-manager family a [`PackageInfo`] bag is grouped under.
///
/// Absence of a family (`None` in [`Packages`]) means "not probed", distinct
/// from an empty `Vec` which means "probed, nothing found".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageFamily {
    Apt,
    Yum,
    Zypper,
    Googet,
    Rpm,
    WindowsUpdate,
    InstalledHotfix,
}

crate::simple_display! {
    PackageFamily {
        Apt => "apt",
        Yum => "yum",
        Zypper => "zypper",
        Googet => "googet",
        Rpm => "rpm",
        WindowsUpdate => "windows_update",
        InstalledHotfix => "installed_hotfix",
    }
}

/// A tagged bag grouping [`PackageInfo`] by package-manager family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apt: Option<Vec<PackageInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yum: Option<Vec<PackageInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zypper: Option<Vec<PackageInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub googet: Option<Vec<PackageInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<Vec<PackageInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows_update: Option<Vec<PackageInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_hotfix: Option<Vec<PackageInfo>>,
}

impl Packages {
    pub fn get(&self, family: PackageFamily) -> Option<&[PackageInfo]> {
        match family {
            PackageFamily::Apt => self.apt.as_deref(),
            PackageFamily::Yum => self.yum.as_deref(),
            PackageFamily::Zypper => self.zypper.as_deref(),
            PackageFamily::Googet => self.googet.as_deref(),
            PackageFamily::Rpm => self.rpm.as_deref(),
            PackageFamily::WindowsUpdate => self.windows_update.as_deref(),
            PackageFamily::InstalledHotfix => self.installed_hotfix.as_deref(),
        }
    }

    pub fn set(&mut self, family: PackageFamily, packages: Vec<PackageInfo>) {
        let slot = match family {
            PackageFamily::Apt => &mut self.apt,
            PackageFamily::Yum => &mut self.yum,
            PackageFamily::Zypper => &mut self.zypper,
            PackageFamily::Googet => &mut self.googet,
            PackageFamily::Rpm => &mut self.rpm,
            PackageFamily::WindowsUpdate => &mut self.windows_update,
            PackageFamily::InstalledHotfix => &mut self.installed_hotfix,
        };
        *slot = Some(packages);
    }

    /// All families that were probed, paired with their packages.
    pub fn probed_families(&self) -> Vec<(PackageFamily, &[PackageInfo])> {
        [
            PackageFamily::Apt,
            PackageFamily::Yum,
            PackageFamily::Zypper,
            PackageFamily::Googet,
            PackageFamily::Rpm,
            PackageFamily::WindowsUpdate,
            PackageFamily::InstalledHotfix,
        ]
        .into_iter()
        .filter_map(|f| self.get(f).map(|pkgs| (f, pkgs)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_family_is_not_probed() {
        let packages = Packages::default();
        assert!(packages.get(PackageFamily::Apt).is_none());
    }

    #[test]
    fn empty_family_is_probed_but_empty() {
        let mut packages = Packages::default();
        packages.set(PackageFamily::Apt, vec![]);
        assert_eq!(packages.get(PackageFamily::Apt), Some(&[][..]));
    }

    #[test]
    fn probed_families_lists_only_set_ones() {
        let mut packages = Packages::default();
        packages.set(PackageFamily::Yum, vec![PackageInfo::new("foo", "x86_64", "1.0")]);
        let probed = packages.probed_families();
        assert_eq!(probed.len(), 1);
        assert_eq!(probed[0].0, PackageFamily::Yum);
    }
}
