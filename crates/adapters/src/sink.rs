// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Attributes sink (spec.md §6): the inventory reporter's only collaborator,
//! one HTTP call per field under `<base-url>/<field>`.

use crate::error::SinkError;
use async_trait::async_trait;
use std::sync::Mutex;

#[async_trait]
pub trait AttributesSink: Send + Sync {
    async fn put_field(&self, field: &str, value: &str) -> Result<(), SinkError>;
}

pub struct HttpAttributesSink {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAttributesSink {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }
}

#[async_trait]
impl AttributesSink for HttpAttributesSink {
    async fn put_field(&self, field: &str, value: &str) -> Result<(), SinkError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), field);
        let response = self
            .client
            .put(&url)
            .body(value.to_string())
            .send()
            .await
            .map_err(|source| SinkError::Http { field: field.to_string(), source })?;
        if !response.status().is_success() {
            let status_line = response.status().to_string();
            return Err(SinkError::BadStatus { field: field.to_string(), status_line });
        }
        Ok(())
    }
}

#[cfg(feature = "test-support")]
#[derive(Debug, Default)]
pub struct FakeAttributesSink {
    pub posted: Mutex<Vec<(String, String)>>,
}

#[cfg(feature = "test-support")]
impl FakeAttributesSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "test-support")]
#[async_trait]
impl AttributesSink for FakeAttributesSink {
    async fn put_field(&self, field: &str, value: &str) -> Result<(), SinkError> {
        self.posted.lock().expect("lock poisoned").push((field.to_string(), value.to_string()));
        Ok(())
    }
}

#[cfg(all(test, feature = "test-support"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_sink_records_posted_fields() {
        let sink = FakeAttributesSink::new();
        sink.put_field("agentVersion", "1.2.3").await.unwrap();
        let posted = sink.posted.lock().unwrap();
        assert_eq!(posted.as_slice(), &[("agentVersion".to_string(), "1.2.3".to_string())]);
    }
}
