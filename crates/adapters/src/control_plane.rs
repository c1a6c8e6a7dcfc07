// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Control-plane RPC contract (spec.md §6): notification long-poll, patch
//! progress/completion reporting, recipe lookup. The concrete RPC transport
//! is an external collaborator; this module only describes the shape the
//! patch runner and supervisor consume.

use async_trait::async_trait;
use osconfig_core::JobId;
use std::collections::BTreeMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Acked,
    Started,
    ApplyingPatches,
    PostPatchStep,
    Rebooting,
    PrePatchStep,
}

/// A server-returned instruction attached to a progress report response.
/// `Stop` cancels the task in place; `Continue` is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskDirective {
    Continue,
    Stop,
}

#[derive(Debug, Error)]
#[error("control plane rpc failed: {0}")]
pub struct ControlPlaneError(#[from] crate::error::RpcError);

impl ControlPlaneError {
    /// The RPC status code the retry wrapper (spec.md §4.4) classifies on.
    pub fn status_code(&self) -> crate::error::RpcStatusCode {
        self.0.code
    }
}

#[async_trait]
pub trait ControlPlaneClient: Send + Sync {
    async fn report_task_progress(
        &self,
        job_id: &JobId,
        progress: Progress,
        labels: &BTreeMap<String, String>,
    ) -> Result<TaskDirective, ControlPlaneError>;

    async fn report_task_complete(
        &self,
        job_id: &JobId,
        error_message: Option<&str>,
        output: &str,
    ) -> Result<(), ControlPlaneError>;
}

/// In-memory fake for tests: records every call and lets the test script
/// pre-program directives/cancellations (spec.md §8 "Patch state-machine
/// cancel" scenario).
#[cfg(feature = "test-support")]
#[derive(Debug)]
pub struct FakeControlPlaneClient {
    pub progress_calls: Mutex<Vec<(String, Progress)>>,
    pub complete_calls: Mutex<Vec<(String, Option<String>, String)>>,
    pub directive_on_progress: Mutex<TaskDirective>,
}

#[cfg(feature = "test-support")]
impl FakeControlPlaneClient {
    pub fn new() -> Self {
        Self {
            progress_calls: Mutex::new(Vec::new()),
            complete_calls: Mutex::new(Vec::new()),
            directive_on_progress: Mutex::new(TaskDirective::Continue),
        }
    }

    pub fn set_directive(&self, directive: TaskDirective) {
        *self.directive_on_progress.lock().expect("lock poisoned") = directive;
    }
}

#[cfg(feature = "test-support")]
#[async_trait]
impl ControlPlaneClient for FakeControlPlaneClient {
    async fn report_task_progress(
        &self,
        job_id: &JobId,
        progress: Progress,
        _labels: &BTreeMap<String, String>,
    ) -> Result<TaskDirective, ControlPlaneError> {
        self.progress_calls.lock().expect("lock poisoned").push((job_id.to_string(), progress));
        Ok(*self.directive_on_progress.lock().expect("lock poisoned"))
    }

    async fn report_task_complete(
        &self,
        job_id: &JobId,
        error_message: Option<&str>,
        output: &str,
    ) -> Result<(), ControlPlaneError> {
        self.complete_calls.lock().expect("lock poisoned").push((
            job_id.to_string(),
            error_message.map(str::to_string),
            output.to_string(),
        ));
        Ok(())
    }
}

#[cfg(all(test, feature = "test-support"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_records_progress_and_complete_calls() {
        let client = FakeControlPlaneClient::new();
        let job = JobId::from("job-1");
        client.report_task_progress(&job, Progress::Started, &BTreeMap::new()).await.unwrap();
        client.report_task_complete(&job, None, "ok").await.unwrap();
        assert_eq!(client.progress_calls.lock().unwrap().len(), 1);
        assert_eq!(client.complete_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stop_directive_is_returned_when_programmed() {
        let client = FakeControlPlaneClient::new();
        client.set_directive(TaskDirective::Stop);
        let job = JobId::from("job-1");
        let directive = client.report_task_progress(&job, Progress::ApplyingPatches, &BTreeMap::new()).await.unwrap();
        assert_eq!(directive, TaskDirective::Stop);
    }
}
