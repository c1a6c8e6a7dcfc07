// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::StepError;
use osconfig_core::parse_permissions;
use std::path::Path;

/// `FileCopy` (spec.md §4.3): fails if `destination` exists and `overwrite`
/// is false; otherwise writes the artifact's bytes with the parsed mode.
pub async fn run(
    source: &Path,
    destination: &Path,
    permissions: Option<&str>,
    overwrite: bool,
) -> Result<(), StepError> {
    if destination.exists() && !overwrite {
        return Err(StepError::DestinationExists(destination.display().to_string()));
    }
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(source, destination).await?;

    let mode = parse_permissions(permissions)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(destination, std::fs::Permissions::from_mode(mode)).await?;
    }
    #[cfg(not(unix))]
    {
        let _ = mode;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copies_bytes_and_sets_default_mode() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        tokio::fs::write(&src, b"hello").await.unwrap();
        let dst = dir.path().join("dst.txt");
        run(&src, &dst, None, false).await.unwrap();
        assert_eq!(tokio::fs::read(&dst).await.unwrap(), b"hello");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = tokio::fs::metadata(&dst).await.unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[tokio::test]
    async fn refuses_to_overwrite_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        tokio::fs::write(&src, b"a").await.unwrap();
        let dst = dir.path().join("dst.txt");
        tokio::fs::write(&dst, b"existing").await.unwrap();
        let err = run(&src, &dst, None, false).await.unwrap_err();
        assert!(matches!(err, StepError::DestinationExists(_)));
    }

    #[tokio::test]
    async fn overwrite_true_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        tokio::fs::write(&src, b"new").await.unwrap();
        let dst = dir.path().join("dst.txt");
        tokio::fs::write(&dst, b"old").await.unwrap();
        run(&src, &dst, None, true).await.unwrap();
        assert_eq!(tokio::fs::read(&dst).await.unwrap(), b"new");
    }
}
