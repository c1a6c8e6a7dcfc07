// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Recipe version parsing and ordering.
//!
//! A version is a dotted-decimal string of 1 to 4 non-negative integer
//! components (`"N[.N[.N[.N]]]"`). The empty string is equivalent to `[0]`.
//! Comparison is lexicographic with the shorter side zero-padded, so
//! `"1.2" < "1.2.3" < "1.3"`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Maximum number of dotted components a version may carry.
pub const MAX_COMPONENTS: usize = 4;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("version {0:?} has more than {MAX_COMPONENTS} components")]
    TooManyComponents(String),
    #[error("version {0:?} has a non-numeric component {1:?}")]
    NotNumeric(String, String),
}

/// A parsed recipe version: 1-4 non-negative integer components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipeVersion(Vec<u64>);

impl RecipeVersion {
    pub fn components(&self) -> &[u64] {
        &self.0
    }

    pub fn parse(s: &str) -> Result<Self, VersionParseError> {
        if s.is_empty() {
            return Ok(Self(vec![0]));
        }
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() > MAX_COMPONENTS {
            return Err(VersionParseError::TooManyComponents(s.to_string()));
        }
        let mut components = Vec::with_capacity(parts.len());
        for part in parts {
            let n = part
                .parse::<u64>()
                .map_err(|_| VersionParseError::NotNumeric(s.to_string(), part.to_string()))?;
            components.push(n);
        }
        Ok(Self(components))
    }
}

impl TryFrom<String> for RecipeVersion {
    type Error = VersionParseError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<RecipeVersion> for String {
    fn from(v: RecipeVersion) -> String {
        v.to_string()
    }
}

impl fmt::Display for RecipeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl PartialOrd for RecipeVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecipeVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        for i in 0..len {
            let a = self.0.get(i).copied().unwrap_or(0);
            let b = other.0.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_equals_zero() {
        assert_eq!(RecipeVersion::parse("").unwrap(), RecipeVersion::parse("0").unwrap());
    }

    #[test]
    fn short_prefix_orders_before_longer_with_trailing_nonzero() {
        let a = RecipeVersion::parse("1.2").unwrap();
        let b = RecipeVersion::parse("1.2.3").unwrap();
        let c = RecipeVersion::parse("1.3").unwrap();
        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
    }

    #[test]
    fn equal_after_zero_padding() {
        let a = RecipeVersion::parse("1.0").unwrap();
        let b = RecipeVersion::parse("1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_too_many_components() {
        assert!(RecipeVersion::parse("1.2.3.4.5").is_err());
    }

    #[test]
    fn rejects_non_numeric_component() {
        assert!(RecipeVersion::parse("1.a.3").is_err());
    }

    #[test]
    fn display_round_trips() {
        let v = RecipeVersion::parse("1.2.3").unwrap();
        assert_eq!(v.to_string(), "1.2.3");
    }
}
