// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Defensive parsers for each package manager's human-readable CLI output
//! (spec.md §6). Unrecognized lines are skipped silently, never fatal —
//! these are best-effort scrapers of tool output that was never meant to be
//! machine-read.

use osconfig_core::PackageInfo;

/// Native architecture reported by `uname -m`, normalized the way the apt
/// parser needs (`amd64` → `x86_64`) since dpkg/apt speak Debian arch names.
fn normalize_arch(arch: &str) -> String {
    match arch {
        "amd64" => "x86_64".to_string(),
        other => other.to_string(),
    }
}

/// `dpkg-query -W -f='${Package} ${Architecture} ${Version}\n'` output:
/// lines of exactly `"<name> <arch> <version>"` (3 whitespace-separated
/// fields). Other lines are ignored.
pub fn parse_dpkg_query(output: &str) -> Vec<PackageInfo> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [name, arch, version] => Some(PackageInfo::new(*name, *arch, *version)),
                _ => None,
            }
        })
        .collect()
}

/// `apt-get full-upgrade --just-print -V` output: lines beginning with
/// `Inst ` of the form `Inst <name> [<cur>] (<new> <repo> [<arch>])`. Lines
/// missing the `[<cur>]` segment are new installs and are skipped.
pub fn parse_apt_upgradable(output: &str) -> Vec<PackageInfo> {
    let mut packages = Vec::new();
    for line in output.lines() {
        let Some(rest) = line.strip_prefix("Inst ") else { continue };

        let mut tokens = rest.splitn(2, ' ');
        let Some(name) = tokens.next() else { continue };
        let Some(remainder) = tokens.next() else { continue };
        let remainder = remainder.trim_start();
        if !remainder.starts_with('[') {
            // "new install" line: `Inst name (new repo [arch])`
            continue;
        }
        let Some(close_bracket) = remainder.find(']') else { continue };
        let after_current = remainder[close_bracket + 1..].trim_start();
        let Some(paren_body) = after_current.strip_prefix('(').and_then(|s| s.strip_suffix(')')) else {
            continue;
        };
        let paren_fields: Vec<&str> = paren_body.split_whitespace().collect();
        let Some(new_version) = paren_fields.first() else { continue };
        let arch = paren_fields
            .iter()
            .find(|f| f.starts_with('[') && f.ends_with(']'))
            .map(|f| &f[1..f.len() - 1])
            .unwrap_or("all");
        packages.push(PackageInfo::new(name.to_string(), normalize_arch(arch), new_version.to_string()));
    }
    packages
}

/// `yum check-update` output: tabular lines `<name>.<arch>  <version>  <repo>`.
/// A line equal to `Obsoleting Packages` terminates the list.
pub fn parse_yum_check_update(output: &str) -> Vec<PackageInfo> {
    let mut packages = Vec::new();
    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "Obsoleting Packages" {
            break;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let [name_arch, version, _repo] = fields[..] else { continue };
        let Some((name, arch)) = name_arch.rsplit_once('.') else { continue };
        packages.push(PackageInfo::new(name, arch, version));
    }
    packages
}

/// `zypper list-updates`/`zypper list-patches`: pipe-separated table with a
/// leading status column. Only rows whose status is `v` are package updates;
/// patch-classification rows are handled by [`parse_zypper_patches`].
pub fn parse_zypper_list_updates(output: &str) -> Vec<PackageInfo> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('|').map(str::trim).collect();
            if fields.len() < 5 || fields[0] != "v" {
                return None;
            }
            // v | repository | name | current | available | arch
            let name = fields.get(2)?;
            let version = fields.get(4)?;
            let arch = fields.get(5).copied().unwrap_or("");
            Some(PackageInfo::new(*name, arch, *version))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZypperPatchStatus {
    Applied,
    Needed,
    NotNeeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZypperPatchRow {
    pub name: String,
    pub status: ZypperPatchStatus,
}

/// `zypper list-patches` table: `<status> | <repo> | <name> | <category> | <severity>`.
pub fn parse_zypper_patches(output: &str) -> Vec<ZypperPatchRow> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('|').map(str::trim).collect();
            if fields.len() < 3 {
                return None;
            }
            let status = match fields[0] {
                "applied" => ZypperPatchStatus::Applied,
                "needed" => ZypperPatchStatus::Needed,
                "not needed" => ZypperPatchStatus::NotNeeded,
                _ => return None,
            };
            Some(ZypperPatchRow { name: fields[2].to_string(), status })
        })
        .collect()
}

/// `googet update` (dry-run) output: `<name>.<arch>, <old> --> <new> from <repo>`.
pub fn parse_googet_update(output: &str) -> Vec<PackageInfo> {
    output
        .lines()
        .filter_map(|line| {
            let (name_arch, rest) = line.split_once(',')?;
            let (name, arch) = name_arch.trim().rsplit_once('.')?;
            let rest = rest.trim();
            let (_old, rest) = rest.split_once("-->")?;
            let new_version = rest.trim().split_whitespace().next()?;
            Some(PackageInfo::new(name, arch, new_version))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpkg_query_parses_three_field_lines_and_skips_others() {
        let out = "vim amd64 2:8.1.0-1\nnot-three-fields\nbash amd64 5.0-6\n";
        let parsed = parse_dpkg_query(out);
        assert_eq!(parsed, vec![
            PackageInfo::new("vim", "amd64", "2:8.1.0-1"),
            PackageInfo::new("bash", "amd64", "5.0-6"),
        ]);
    }

    #[test]
    fn apt_upgradable_matches_spec_scenario() {
        let out = concat!(
            "Inst libldap-common [2.4.45+dfsg-1ubuntu1.2] (2.4.45+dfsg-1ubuntu1.3 Ubuntu:18.04/bionic-updates [all])\n",
            "Inst google-cloud-sdk [245.0.0-0] (246.0.0-0 cloud-sdk-stretch [amd64])\n",
            "Inst firmware-linux-free (3.4 Debian:9.9/stable [all])\n",
        );
        let parsed = parse_apt_upgradable(out);
        assert_eq!(parsed, vec![
            PackageInfo::new("libldap-common", "all", "2.4.45+dfsg-1ubuntu1.3"),
            PackageInfo::new("google-cloud-sdk", "x86_64", "246.0.0-0"),
        ]);
    }

    #[test]
    fn yum_check_update_stops_at_obsoleting_packages() {
        let out = "bash.x86_64  5.0.17-1.el8  baseos\nObsoleting Packages\nshould-be-ignored.x86_64 1.0 repo\n";
        let parsed = parse_yum_check_update(out);
        assert_eq!(parsed, vec![PackageInfo::new("bash", "x86_64", "5.0.17-1.el8")]);
    }

    #[test]
    fn zypper_list_updates_keeps_only_status_v_rows() {
        let out = "v | repo | foo | 1.0 | 1.1 | x86_64\ni | repo | bar | 1.0 | 1.1 | x86_64\n";
        let parsed = parse_zypper_list_updates(out);
        assert_eq!(parsed, vec![PackageInfo::new("foo", "x86_64", "1.1")]);
    }

    #[test]
    fn zypper_patches_classification_matches_spec_scenario() {
        let out = concat!(
            "applied | repo | patch-a | security | important\n",
            "needed | repo | patch-b | security | important\n",
            "not needed | repo | patch-c | recommended | moderate\n",
            "needed | repo | patch-d | recommended | low\n",
        );
        let rows = parse_zypper_patches(out);
        let installed: Vec<_> = rows.iter().filter(|r| r.status == ZypperPatchStatus::Applied).collect();
        let available: Vec<_> = rows.iter().filter(|r| r.status == ZypperPatchStatus::Needed).collect();
        assert_eq!(installed.len(), 1);
        assert_eq!(installed[0].name, "patch-a");
        assert_eq!(available.len(), 2);
    }

    #[test]
    fn googet_update_parses_arrow_notation() {
        let out = "foo.x86_64, 1.0.0 --> 1.1.0 from repo\n";
        let parsed = parse_googet_update(out);
        assert_eq!(parsed, vec![PackageInfo::new("foo", "x86_64", "1.1.0")]);
    }
}
