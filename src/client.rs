//! Companion client for the gh-pilot HTTP API.
//!
//! Wraps submit/poll/workspace operations behind a small reqwest client.
//! Used by the `gh-pilot-client` binary and handy for integration tests.

use std::time::Duration;

use anyhow::Context;
use uuid::Uuid;

use crate::api::types::{QueryCreatedResponse, ResultResponse};

/// Default attempts for [`AgentClient::wait`], at one-second intervals.
pub const DEFAULT_MAX_POLLS: u32 = 60;

pub struct AgentClient {
    http: reqwest::Client,
    base_url: String,
}

impl AgentClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a query, returning its id.
    pub async fn submit(&self, text: &str) -> anyhow::Result<Uuid> {
        let resp = self
            .http
            .post(format!("{}/query", self.base_url))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .context("Failed to reach the agent server")?
            .error_for_status()
            .context("Query submission rejected")?;

        let created: QueryCreatedResponse =
            resp.json().await.context("Malformed submission response")?;
        Ok(created.query_id)
    }

    /// Fetch the current status of a query.
    pub async fn result(&self, id: Uuid) -> anyhow::Result<ResultResponse> {
        let resp = self
            .http
            .get(format!("{}/result/{}", self.base_url, id))
            .send()
            .await
            .context("Failed to reach the agent server")?
            .error_for_status()
            .context("Result lookup rejected")?;

        resp.json().await.context("Malformed result response")
    }

    /// Poll until the query reaches a terminal state, an unknown-id answer,
    /// or the attempt budget runs out.
    pub async fn wait(
        &self,
        id: Uuid,
        max_polls: u32,
        interval: Duration,
    ) -> anyhow::Result<ResultResponse> {
        for _ in 0..max_polls {
            match self.result(id).await? {
                ResultResponse::Pending => tokio::time::sleep(interval).await,
                terminal => return Ok(terminal),
            }
        }
        anyhow::bail!("Timed out waiting for query {} after {} polls", id, max_polls)
    }

    /// Fetch workspace metadata as raw JSON.
    pub async fn workspace_info(&self) -> anyhow::Result<serde_json::Value> {
        let resp = self
            .http
            .get(format!("{}/workspace_info", self.base_url))
            .send()
            .await
            .context("Failed to reach the agent server")?
            .error_for_status()?;
        resp.json().await.context("Malformed workspace response")
    }

    /// Ask the server to reset the workspace.
    pub async fn reset_workspace(&self) -> anyhow::Result<serde_json::Value> {
        let resp = self
            .http
            .post(format!("{}/reset_workspace", self.base_url))
            .send()
            .await
            .context("Failed to reach the agent server")?
            .error_for_status()?;
        resp.json().await.context("Malformed reset response")
    }
}
