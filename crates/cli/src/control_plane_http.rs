// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The concrete control-plane transport (spec.md §6): HTTP + JSON over the
//! wire shapes defined in `osconfig-wire`, the same pattern
//! `osconfig-adapters::sink::HttpAttributesSink` uses for the attributes
//! endpoint. `osconfig-adapters::ControlPlaneClient` itself stays
//! transport-agnostic so the patch runner's tests never touch the network;
//! this is the one production implementation, assembled here in the
//! integration layer rather than in the adapters crate.

use async_trait::async_trait;
use osconfig_adapters::error::{RpcError, RpcStatusCode};
use osconfig_adapters::{ControlPlaneClient, ControlPlaneError, Progress, TaskDirective};
use osconfig_core::JobId;
use osconfig_wire::{ProgressReportRequest, ProgressReportResponse, TaskCompleteRequest, WireTaskDirective};
use std::collections::BTreeMap;

pub struct HttpControlPlaneClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpControlPlaneClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn progress_name(progress: Progress) -> &'static str {
    match progress {
        Progress::Acked => "acked",
        Progress::Started => "started",
        Progress::ApplyingPatches => "applying_patches",
        Progress::PostPatchStep => "post_patch_step",
        Progress::Rebooting => "rebooting",
        Progress::PrePatchStep => "pre_patch_step",
    }
}

fn classify(source: reqwest::Error) -> RpcError {
    let code = if source.is_timeout() {
        RpcStatusCode::DeadlineExceeded
    } else if source.is_connect() {
        RpcStatusCode::Unavailable
    } else if let Some(status) = source.status() {
        status_code(status)
    } else {
        RpcStatusCode::Other
    };
    RpcError { code, message: source.to_string() }
}

fn status_code(status: reqwest::StatusCode) -> RpcStatusCode {
    match status.as_u16() {
        400 => RpcStatusCode::InvalidArgument,
        403 => RpcStatusCode::PermissionDenied,
        404 => RpcStatusCode::NotFound,
        408 | 504 => RpcStatusCode::DeadlineExceeded,
        409 => RpcStatusCode::Aborted,
        429 => RpcStatusCode::ResourceExhausted,
        500..=599 if status.as_u16() != 504 => RpcStatusCode::Internal,
        503 => RpcStatusCode::Unavailable,
        200..=299 => RpcStatusCode::Ok,
        _ => RpcStatusCode::Other,
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RpcError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let code = status_code(status);
    let message = response.text().await.unwrap_or_else(|_| status.to_string());
    Err(RpcError { code, message })
}

#[async_trait]
impl ControlPlaneClient for HttpControlPlaneClient {
    async fn report_task_progress(
        &self,
        job_id: &JobId,
        progress: Progress,
        labels: &BTreeMap<String, String>,
    ) -> Result<TaskDirective, ControlPlaneError> {
        let body = ProgressReportRequest {
            task_id: job_id.to_string(),
            progress: progress_name(progress).to_string(),
            labels: labels.clone(),
        };
        let response = self
            .client
            .post(self.url("tasks/progress"))
            .json(&body)
            .send()
            .await
            .map_err(classify)?;
        let response = check_status(response).await?;
        let parsed: ProgressReportResponse = response
            .json()
            .await
            .map_err(|source| RpcError { code: RpcStatusCode::Internal, message: source.to_string() })?;
        Ok(match parsed.directive {
            WireTaskDirective::Continue => TaskDirective::Continue,
            WireTaskDirective::Stop => TaskDirective::Stop,
        })
    }

    async fn report_task_complete(
        &self,
        job_id: &JobId,
        error_message: Option<&str>,
        output: &str,
    ) -> Result<(), ControlPlaneError> {
        let body = TaskCompleteRequest {
            task_id: job_id.to_string(),
            error_message: error_message.map(str::to_string),
            output: output.to_string(),
        };
        let response = self
            .client
            .post(self.url("tasks/complete"))
            .json(&body)
            .send()
            .await
            .map_err(classify)?;
        check_status(response).await?;
        Ok(())
    }
}
