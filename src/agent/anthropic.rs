//! Minimal Anthropic Messages API client.
//!
//! Only the pieces the tool loop needs: send a message list with a tool
//! definition, get back content blocks. Content is kept as raw JSON values
//! so assistant turns can be echoed back verbatim.

use serde::Deserialize;
use serde_json::json;

use super::AgentError;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4000;

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Call `POST /v1/messages` and parse the content blocks.
    pub async fn messages(
        &self,
        model: &str,
        system: &str,
        messages: &[serde_json::Value],
        tools: &[serde_json::Value],
    ) -> Result<MessagesResponse, AgentError> {
        let body = json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "system": system,
            "messages": messages,
            "tools": tools,
        });

        let resp = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(AgentError::Provider { status, body: text });
        }

        serde_json::from_str(&text)
            .map_err(|e| AgentError::BadResponse(format!("{}: {}", e, text)))
    }
}

/// A `tool_use` request extracted from a response.
#[derive(Debug, Clone)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    pub input: serde_json::Value,
}

/// Response from the Messages API, content kept as raw blocks.
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<serde_json::Value>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl MessagesResponse {
    /// All `text` blocks, in order.
    pub fn text_blocks(&self) -> Vec<String> {
        self.content
            .iter()
            .filter(|block| block.get("type").and_then(|v| v.as_str()) == Some("text"))
            .filter_map(|block| block.get("text").and_then(|v| v.as_str()))
            .map(|s| s.to_string())
            .collect()
    }

    /// All `tool_use` blocks, in order.
    pub fn tool_uses(&self) -> Vec<ToolUse> {
        self.content
            .iter()
            .filter(|block| block.get("type").and_then(|v| v.as_str()) == Some("tool_use"))
            .map(|block| ToolUse {
                id: block
                    .get("id")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown")
                    .to_string(),
                name: block
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown")
                    .to_string(),
                input: block.get("input").cloned().unwrap_or(json!({})),
            })
            .collect()
    }
}
