// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wire form of a progress report (spec.md §6): `report_task_progress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReportRequest {
    pub task_id: String,
    pub progress: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Wire form of `WireTaskDirective`, a.k.a. the server's answer to a
/// progress report: keep going, or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireTaskDirective {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReportResponse {
    pub directive: WireTaskDirective,
}

/// Wire form of `report_task_complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCompleteRequest {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub output: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_directive_round_trips_snake_case() {
        let json = serde_json::to_string(&WireTaskDirective::Stop).unwrap();
        assert_eq!(json, "\"stop\"");
    }

    #[test]
    fn task_complete_omits_absent_error_message() {
        let req = TaskCompleteRequest { task_id: "t1".into(), error_message: None, output: "ok".into() };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("error_message"));
    }
}
