use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::info;
use serde::Serialize;

/// Notifies an external service that a pose session ran to completion.
#[async_trait]
pub trait StatusReporter: Send + Sync {
    async fn report_completion(&self, pose_name: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdate<'a> {
    pose_name: &'a str,
}

/// Posts `{"poseName": ...}` as JSON to the status endpoint. Any 2xx counts as success.
pub struct HttpStatusReporter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpStatusReporter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl StatusReporter for HttpStatusReporter {
    async fn report_completion(&self, pose_name: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&StatusUpdate { pose_name })
            .send()
            .await
            .with_context(|| format!("status update to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            bail!("status endpoint {} responded with {}", self.endpoint, status);
        }

        info!("pose status updated for {pose_name}");
        Ok(())
    }
}
