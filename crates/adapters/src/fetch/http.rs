// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::{write_and_verify, ArtifactFetcher};
use crate::error::FetchError;
use async_trait::async_trait;
use osconfig_core::Artifact;
use std::path::Path;

/// Handles `Artifact::Remote`, restricted to `http`/`https` (spec.md §4.2).
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    fn handles(&self, artifact: &Artifact) -> bool {
        matches!(artifact, Artifact::Remote { .. })
    }

    async fn fetch(&self, artifact: &Artifact, destination: &Path) -> Result<(), FetchError> {
        let Artifact::Remote { uri, checksum } = artifact else {
            return Err(FetchError::UnsupportedProtocol { scheme: format!("{artifact:?}") });
        };

        let scheme = uri.split_once("://").map(|(s, _)| s).unwrap_or("");
        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return Err(FetchError::UnsupportedProtocol { scheme: scheme.to_string() });
        }

        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|source| FetchError::Http { uri: uri.clone(), source })?;
        if !response.status().is_success() {
            return Err(FetchError::Status { uri: uri.clone(), status: response.status().as_u16() });
        }

        write_and_verify(destination, response.bytes_stream(), checksum.as_deref()).await
    }
}
