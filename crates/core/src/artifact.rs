// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact sources a recipe step may fetch before dispatch.

use serde::{Deserialize, Serialize};

/// An opaque file a recipe references, identified by an id unique within
/// the recipe. Fetched from an object store or a remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    Gcs {
        bucket: String,
        object: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        generation: Option<i64>,
    },
    Remote {
        uri: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checksum: Option<String>,
    },
}

impl Artifact {
    /// The filename extension implied by the source, if any, preserved when
    /// materializing the artifact on disk (spec.md §4.2 step 4).
    pub fn extension(&self) -> Option<&str> {
        let name = match self {
            Self::Gcs { object, .. } => object.as_str(),
            Self::Remote { uri, .. } => uri.as_str(),
        };
        let base = name.rsplit('/').next().unwrap_or(name);
        base.rsplit_once('.').map(|(_, ext)| ext).filter(|ext| !ext.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_from_gcs_object_path() {
        let a = Artifact::Gcs { bucket: "b".into(), object: "dir/file.tar.gz".into(), generation: None };
        assert_eq!(a.extension(), Some("gz"));
    }

    #[test]
    fn extension_from_remote_uri() {
        let a = Artifact::Remote { uri: "https://example.com/pkg.deb".into(), checksum: None };
        assert_eq!(a.extension(), Some("deb"));
    }

    #[test]
    fn no_extension_returns_none() {
        let a = Artifact::Remote { uri: "https://example.com/pkg".into(), checksum: None };
        assert_eq!(a.extension(), None);
    }
}
