// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{family} is not available on this host")]
    Unavailable { family: &'static str },
    #[error("{family} {operation} failed: {detail}")]
    CommandFailed { family: &'static str, operation: &'static str, detail: String },
    #[error(transparent)]
    Exec(#[from] osconfig_exec::ExecError),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unsupported protocol {scheme:?} (only http/https are accepted)")]
    UnsupportedProtocol { scheme: String },
    #[error("checksum mismatch: expected {expected}, computed {computed}")]
    ChecksumMismatch { expected: String, computed: String },
    #[error("http error fetching {uri}: {source}")]
    Http { uri: String, #[source] source: reqwest::Error },
    #[error("non-success status {status} fetching {uri}")]
    Status { uri: String, status: u16 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("non-2xx response posting field {field}: {status_line}")]
    BadStatus { field: String, status_line: String },
    #[error("error posting field {field}: {source}")]
    Http { field: String, #[source] source: reqwest::Error },
}

/// RPC status codes the retry wrapper (spec.md §4.4) distinguishes. A
/// transient code is retried; anything else is surfaced immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcStatusCode {
    Ok,
    DeadlineExceeded,
    Unavailable,
    Aborted,
    Internal,
    ResourceExhausted,
    PermissionDenied,
    InvalidArgument,
    NotFound,
    Other,
}

impl RpcStatusCode {
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::DeadlineExceeded | Self::Unavailable | Self::Aborted | Self::Internal | Self::ResourceExhausted
        )
    }
}

#[derive(Debug, Error)]
#[error("rpc call failed with status {code:?}: {message}")]
pub struct RpcError {
    pub code: RpcStatusCode,
    pub message: String,
}
