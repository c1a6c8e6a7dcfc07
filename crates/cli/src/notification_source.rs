// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Notification long-poll (spec.md §6): what wakes `waitfortasknotification`
//! up. Plain function, same rationale as `recipe_source`: one caller, no
//! seam worth a trait.

use osconfig_wire::{Notification, NotificationPoll, NotificationPollResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationSourceError {
    #[error("notification poll failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("notification poll returned status {0}")]
    Status(reqwest::StatusCode),
}

pub async fn poll_once(
    client: &reqwest::Client,
    base_url: &str,
    instance_id: &str,
    wait_seconds: u32,
) -> Result<Vec<Notification>, NotificationSourceError> {
    let url = format!("{}/notifications", base_url.trim_end_matches('/'));
    let request = NotificationPoll { instance_id: instance_id.to_string(), wait_seconds };
    let response = client.post(url).json(&request).send().await?;
    if !response.status().is_success() {
        return Err(NotificationSourceError::Status(response.status()));
    }
    let parsed: NotificationPollResponse = response.json().await?;
    Ok(parsed.notifications)
}
