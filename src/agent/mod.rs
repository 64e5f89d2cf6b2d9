//! Agent runtime adapter.
//!
//! The [`AgentRuntime`] trait is the seam between the HTTP layer and the
//! LLM: given a natural-language prompt and a workspace directory, produce
//! a text result. The production implementation, [`ClaudeAgent`], drives
//! the Anthropic Messages API in a tool-use loop where the model's only
//! tool is running shell commands (notably `gh` and `git`) inside the
//! workspace.
//!
//! All reasoning about *which* commands to run is delegated to the model;
//! this module only moves bytes and enforces a bound on tool rounds.

mod anthropic;
mod tools;

pub use anthropic::{AnthropicClient, MessagesResponse, ToolUse};
pub use tools::run_command;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::config::Config;

/// Errors produced by the agent adapter. Callers store these as a failed
/// query rather than propagating them out of the process.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("ANTHROPIC_API_KEY not found in environment or .env file")]
    MissingApiKey,
    #[error("request to the model provider failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model provider returned {status}: {body}")]
    Provider {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected provider response: {0}")]
    BadResponse(String),
    #[error("agent did not finish within {0} tool rounds")]
    ToolRoundsExhausted(u32),
}

/// Executes a prompt against a workspace and returns the agent's answer.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn run(&self, prompt: &str, workspace: &Path) -> anyhow::Result<String>;
}

/// Shared agent handle stored in the application state.
pub type AgentRef = Arc<dyn AgentRuntime>;

const SYSTEM_INSTRUCTIONS: &str = "\
You are a GitHub operations assistant that uses the GitHub CLI (gh) to manage repositories.

You have a dedicated workspace directory at {workspace}. Always use this directory for \
cloning repositories, storing configuration files, and building or running anything.

For GitHub operations, use the `gh` command-line tool instead of direct API calls. \
The GitHub CLI is already authenticated.

The target repository is: https://github.com/{repo}

Examples of useful commands:

1. To create a branch:
   cd {workspace}
   gh repo clone {repo}
   cd $(basename {repo})
   git checkout -b feature/new-feature
   git push -u origin feature/new-feature

2. To create a pull request:
   gh pr create --title \"Your PR title\" --body \"Description of changes\"

3. To check repository details:
   gh repo view {repo}

Always check the current status and clearly explain which commands you are running.";

/// Render the system instructions for a concrete workspace and target repo.
fn render_instructions(workspace: &Path, target_repo: &str) -> String {
    SYSTEM_INSTRUCTIONS
        .replace("{workspace}", &workspace.display().to_string())
        .replace("{repo}", target_repo)
}

/// JSON schema for the single tool exposed to the model.
fn run_command_tool() -> serde_json::Value {
    json!({
        "name": "run_command",
        "description": "Run a shell command inside the agent workspace directory and return its output. Use this for gh, git and any other command-line work.",
        "input_schema": {
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                }
            },
            "required": ["command"]
        }
    })
}

/// Anthropic-backed agent implementation.
pub struct ClaudeAgent {
    client: Option<AnthropicClient>,
    model: String,
    target_repo: String,
    max_tool_rounds: u32,
    command_timeout: Duration,
}

impl ClaudeAgent {
    pub fn new(config: &Config) -> Self {
        Self {
            client: config.api_key.clone().map(AnthropicClient::new),
            model: config.model.clone(),
            target_repo: config.target_repo.clone(),
            max_tool_rounds: config.max_tool_rounds,
            command_timeout: config.command_timeout,
        }
    }

    async fn run_inner(&self, prompt: &str, workspace: &Path) -> Result<String, AgentError> {
        let client = self.client.as_ref().ok_or(AgentError::MissingApiKey)?;

        let system = render_instructions(workspace, &self.target_repo);
        let tools = vec![run_command_tool()];
        let mut messages = vec![json!({"role": "user", "content": prompt})];
        let mut transcript: Vec<String> = Vec::new();

        for _ in 0..self.max_tool_rounds {
            let response = client
                .messages(&self.model, &system, &messages, &tools)
                .await?;

            for text in response.text_blocks() {
                transcript.push(text);
            }

            let tool_uses = response.tool_uses();
            if tool_uses.is_empty() {
                if transcript.is_empty() {
                    return Err(AgentError::BadResponse(
                        "provider returned no text content".to_string(),
                    ));
                }
                return Ok(transcript.join("\n\n"));
            }

            // Echo the assistant turn verbatim so tool_use ids line up with
            // the tool_result blocks we send back.
            messages.push(json!({"role": "assistant", "content": response.content}));

            let mut results = Vec::with_capacity(tool_uses.len());
            for tool_use in &tool_uses {
                let command = tool_use
                    .input
                    .get("command")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                tracing::info!("Agent running command: {}", command);
                transcript.push(format!("[ran `{}`]", command));

                let output = run_command(workspace, command, self.command_timeout).await;
                results.push(json!({
                    "type": "tool_result",
                    "tool_use_id": tool_use.id,
                    "content": output,
                }));
            }
            messages.push(json!({"role": "user", "content": results}));
        }

        Err(AgentError::ToolRoundsExhausted(self.max_tool_rounds))
    }
}

#[async_trait]
impl AgentRuntime for ClaudeAgent {
    async fn run(&self, prompt: &str, workspace: &Path) -> anyhow::Result<String> {
        self.run_inner(prompt, workspace).await.map_err(Into::into)
    }
}
