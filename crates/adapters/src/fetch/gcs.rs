// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::{write_and_verify, ArtifactFetcher};
use crate::error::FetchError;
use async_trait::async_trait;
use osconfig_core::Artifact;
use std::path::Path;

const STORAGE_HOST: &str = "https://storage.googleapis.com";

/// Handles `Artifact::Gcs` via the object-store's media download endpoint.
/// A `generation` pins the exact object version, matching the artifact's
/// own "fetch this specific upload, not whatever's current" contract.
pub struct GcsFetcher {
    client: reqwest::Client,
    host: String,
}

impl GcsFetcher {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new(), host: STORAGE_HOST.to_string() }
    }

    #[cfg(test)]
    pub fn with_host(host: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), host: host.into() }
    }

    fn media_url(&self, bucket: &str, object: &str, generation: Option<i64>) -> String {
        let encoded_object = object.replace('/', "%2F");
        let mut url = format!(
            "{}/download/storage/v1/b/{bucket}/o/{encoded_object}?alt=media",
            self.host
        );
        if let Some(generation) = generation {
            url.push_str(&format!("&generation={generation}"));
        }
        url
    }
}

impl Default for GcsFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactFetcher for GcsFetcher {
    fn handles(&self, artifact: &Artifact) -> bool {
        matches!(artifact, Artifact::Gcs { .. })
    }

    async fn fetch(&self, artifact: &Artifact, destination: &Path) -> Result<(), FetchError> {
        let Artifact::Gcs { bucket, object, generation } = artifact else {
            return Err(FetchError::UnsupportedProtocol { scheme: format!("{artifact:?}") });
        };

        let url = self.media_url(bucket, object, *generation);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Http { uri: url.clone(), source })?;
        if !response.status().is_success() {
            return Err(FetchError::Status { uri: url, status: response.status().as_u16() });
        }

        write_and_verify(destination, response.bytes_stream(), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_url_percent_encodes_object_path_and_pins_generation() {
        let fetcher = GcsFetcher::with_host("https://storage.example.com");
        let url = fetcher.media_url("my-bucket", "dir/file.tar.gz", Some(42));
        assert_eq!(
            url,
            "https://storage.example.com/download/storage/v1/b/my-bucket/o/dir%2Ffile.tar.gz?alt=media&generation=42"
        );
    }
}
