// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

/// What the control plane's long-poll woke the agent up for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    PatchJob { job_id: String },
    PolicyUpdate,
}

/// Request body for the notification long-poll; `wait_seconds` bounds how
/// long the server may hold the connection open before returning empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPoll {
    pub instance_id: String,
    pub wait_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPollResponse {
    #[serde(default)]
    pub notifications: Vec<Notification>,
}
