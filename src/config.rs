//! Environment-derived configuration.
//!
//! All knobs come from environment variables (optionally loaded from a `.env`
//! file by `main` before this runs). Missing values fall back to defaults
//! that match a local development setup.

use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the server and the agent.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server to.
    pub host: String,
    pub port: u16,
    /// Root of the agent's workspace directory.
    pub workspace_dir: PathBuf,
    /// Anthropic API key. When absent the server still starts; queries fail
    /// with a stored error instead of crashing the process.
    pub api_key: Option<String>,
    /// Model passed to the Messages API.
    pub model: String,
    /// Repository the agent instructions point at, as `owner/name`.
    pub target_repo: String,
    /// Upper bound on tool-use rounds per query.
    pub max_tool_rounds: u32,
    /// Timeout applied to each shell command the agent runs.
    pub command_timeout: Duration,
}

impl Config {
    /// Build a configuration from environment variables.
    ///
    /// - `GH_PILOT_HOST` / `GH_PILOT_PORT` - bind address (default `127.0.0.1:8000`)
    /// - `WORKSPACE_DIR` - agent workspace root (default `./agent_workspace`)
    /// - `ANTHROPIC_API_KEY` - LLM provider credential
    /// - `GH_PILOT_MODEL` - model identifier
    /// - `TARGET_REPO` - repository the agent operates on
    /// - `GH_PILOT_MAX_TOOL_ROUNDS` - tool loop bound (default 16)
    /// - `GH_PILOT_COMMAND_TIMEOUT_SECS` - per-command timeout (default 120)
    pub fn from_env() -> Self {
        let port = std::env::var("GH_PILOT_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8000);
        let max_tool_rounds = std::env::var("GH_PILOT_MAX_TOOL_ROUNDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(16);
        let command_timeout_secs: u64 = std::env::var("GH_PILOT_COMMAND_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        Self {
            host: std::env::var("GH_PILOT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            workspace_dir: std::env::var("WORKSPACE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("agent_workspace")),
            api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            model: std::env::var("GH_PILOT_MODEL")
                .unwrap_or_else(|_| "claude-3-5-sonnet-20241022".to_string()),
            target_repo: std::env::var("TARGET_REPO")
                .unwrap_or_else(|_| "deploypilotorg/example-repo".to_string()),
            max_tool_rounds,
            command_timeout: Duration::from_secs(command_timeout_secs),
        }
    }
}
