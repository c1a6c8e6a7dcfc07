// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Exclude-list entries: either a strict string match or a regex.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(try_from = "ExcludeRepr", into = "ExcludeRepr")]
pub enum Exclude {
    Strict(String),
    Regex(Regex),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
enum ExcludeKind {
    Strict,
    Regex,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct ExcludeRepr {
    kind: ExcludeKind,
    value: String,
}

impl TryFrom<ExcludeRepr> for Exclude {
    type Error = regex::Error;

    fn try_from(repr: ExcludeRepr) -> Result<Self, Self::Error> {
        match repr.kind {
            ExcludeKind::Strict => Ok(Self::Strict(repr.value)),
            ExcludeKind::Regex => Ok(Self::Regex(Regex::new(&repr.value)?)),
        }
    }
}

impl From<Exclude> for ExcludeRepr {
    fn from(e: Exclude) -> Self {
        match e {
            Exclude::Strict(s) => Self { kind: ExcludeKind::Strict, value: s },
            Exclude::Regex(re) => Self { kind: ExcludeKind::Regex, value: re.as_str().to_string() },
        }
    }
}

impl Exclude {
    pub fn strict(s: impl Into<String>) -> Self {
        Self::Strict(s.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::Regex(Regex::new(pattern)?))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Strict(s) => s == name,
            Self::Regex(re) => re.is_match(name),
        }
    }
}

impl PartialEq for Exclude {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Strict(a), Self::Strict(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}
impl Eq for Exclude {}

impl fmt::Display for Exclude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict(s) => write!(f, "{s}"),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Apply the §4.5 allowlist/denylist policy to a list of package names.
///
/// - `exclusive` and `excludes` both non-empty is a configuration error.
/// - `excludes` entries remove matching names.
/// - If `exclusive` is non-empty, only names it matches are kept; otherwise
///   everything not excluded is kept.
pub fn filter_names<'a>(
    names: impl IntoIterator<Item = &'a str>,
    exclusive: &[Exclude],
    excludes: &[Exclude],
) -> Result<Vec<&'a str>, FilterConfigError> {
    if !exclusive.is_empty() && !excludes.is_empty() {
        return Err(FilterConfigError);
    }
    let kept = names.into_iter().filter(|name| {
        if !exclusive.is_empty() {
            exclusive.iter().any(|e| e.matches(name))
        } else {
            !excludes.iter().any(|e| e.matches(name))
        }
    });
    Ok(kept.collect())
}

#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
#[error("exclusive-packages and excludes are mutually exclusive")]
pub struct FilterConfigError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_lists_set_is_an_error() {
        let exclusive = vec![Exclude::strict("a")];
        let excludes = vec![Exclude::strict("b")];
        assert_eq!(filter_names(["a", "b"], &exclusive, &excludes), Err(FilterConfigError));
    }

    #[test]
    fn excludes_removes_matches() {
        let excludes = vec![Exclude::strict("b")];
        let out = filter_names(["a", "b", "c"], &[], &excludes).unwrap();
        assert_eq!(out, vec!["a", "c"]);
    }

    #[test]
    fn exclusive_keeps_only_listed() {
        let exclusive = vec![Exclude::strict("a")];
        let out = filter_names(["a", "b", "c"], &exclusive, &[]).unwrap();
        assert_eq!(out, vec!["a"]);
    }

    #[test]
    fn empty_lists_keep_everything() {
        let out = filter_names(["a", "b"], &[], &[]).unwrap();
        assert_eq!(out, vec!["a", "b"]);
    }

    #[test]
    fn regex_exclude_matches_pattern() {
        let excludes = vec![Exclude::regex("^lib.*").unwrap()];
        let out = filter_names(["libfoo", "bar"], &[], &excludes).unwrap();
        assert_eq!(out, vec!["bar"]);
    }

    #[yare::parameterized(
        strict_hit  = { Exclude::strict("foo"), "foo", true },
        strict_miss = { Exclude::strict("foo"), "bar", false },
        regex_hit   = { Exclude::regex("^lib.*").unwrap(), "libssl", true },
        regex_miss  = { Exclude::regex("^lib.*").unwrap(), "openssl", false },
    )]
    fn matches_strict_and_regex_entries(exclude: Exclude, name: &str, expected: bool) {
        assert_eq!(exclude.matches(name), expected);
    }
}
