// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StepError {
    #[error("artifact {0:?} not found in this run's artifact map")]
    MissingArtifact(String),
    #[error("destination {0} already exists and overwrite is false")]
    DestinationExists(String),
    #[error("archive entry {entry:?} escapes destination {destination}")]
    PathTraversal { entry: String, destination: String },
    #[error("archive entry {entry:?} collides with an existing file")]
    EntryCollision { entry: String },
    #[error("{step} is not supported on this platform: {detail}")]
    PlatformMismatch { step: &'static str, detail: String },
    #[error("invalid permissions string: {0}")]
    InvalidPermissions(#[from] std::num::ParseIntError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Exec(#[from] osconfig_exec::ExecError),
    #[error(transparent)]
    Adapter(#[from] osconfig_adapters::AdapterError),
    #[error("archive read error: {0}")]
    Archive(String),
}
