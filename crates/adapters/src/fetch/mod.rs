// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact fetch (spec.md §4.2): select a fetcher by artifact kind, stream
//! bytes to disk while hashing, verify the checksum if one was specified.

mod gcs;
mod http;

pub use gcs::GcsFetcher;
pub use http::HttpFetcher;

use crate::error::FetchError;
use async_trait::async_trait;
use osconfig_core::Artifact;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncWriteExt;

#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// True if this fetcher handles the given artifact kind.
    fn handles(&self, artifact: &Artifact) -> bool;

    /// Stream the artifact's bytes to `destination`, verifying any checksum
    /// it carries. File mode on creation is 0600 (spec.md §4.2).
    async fn fetch(&self, artifact: &Artifact, destination: &Path) -> Result<(), FetchError>;
}

/// Dispatches to whichever registered fetcher claims the artifact kind.
pub struct FetcherRegistry {
    fetchers: Vec<Box<dyn ArtifactFetcher>>,
}

impl FetcherRegistry {
    pub fn new(fetchers: Vec<Box<dyn ArtifactFetcher>>) -> Self {
        Self { fetchers }
    }

    pub fn default_set() -> Self {
        Self::new(vec![Box::new(HttpFetcher::new()), Box::new(GcsFetcher::new())])
    }

    pub async fn fetch(&self, artifact: &Artifact, destination: &Path) -> Result<(), FetchError> {
        for fetcher in &self.fetchers {
            if fetcher.handles(artifact) {
                return fetcher.fetch(artifact, destination).await;
            }
        }
        Err(FetchError::UnsupportedProtocol { scheme: format!("{artifact:?}") })
    }
}

/// Stream `body` (chunk source) to `destination` at mode 0600, hashing as it
/// writes, then verify against `expected_checksum_hex` if present.
pub(super) async fn write_and_verify(
    destination: &Path,
    mut chunks: impl futures_util::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Unpin,
    expected_checksum_hex: Option<&str>,
) -> Result<(), FetchError> {
    use futures_util::StreamExt;

    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp_path = destination.with_extension("partial");
    let mut file = tokio::fs::File::create(&tmp_path).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600)).await?;
    }

    let mut hasher = Sha256::new();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(|source| FetchError::Http { uri: destination.display().to_string(), source })?;
        hasher.update(&chunk);
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    drop(file);

    let computed = hex_encode(&hasher.finalize());
    if let Some(expected) = expected_checksum_hex {
        if !expected.eq_ignore_ascii_case(&computed) {
            tracing::warn!(expected, computed, path = %destination.display(), "artifact checksum mismatch");
            tokio::fs::remove_file(&tmp_path).await.ok();
            return Err(FetchError::ChecksumMismatch { expected: expected.to_string(), computed });
        }
    }

    tokio::fs::rename(&tmp_path, destination).await?;
    tracing::debug!(path = %destination.display(), "artifact fetched");
    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
