//! # gh-pilot
//!
//! A small HTTP service that turns natural-language queries into GitHub
//! operations by driving an LLM agent that shells out to the `gh` CLI.
//!
//! ```text
//!        ┌──────────────────────────────────┐
//!        │            HTTP API              │
//!        │  (submit query / poll result)    │
//!        └────────────────┬─────────────────┘
//!                         │ background task per query
//!                         ▼
//!                ┌─────────────────┐       ┌───────────────┐
//!                │  ClaudeAgent    │──────▶│  run_command  │
//!                │  (tool loop)    │◀──────│  (gh, git...) │
//!                └─────────────────┘       └───────────────┘
//! ```
//!
//! ## Query Flow
//! 1. `POST /query` allocates an id and spawns the agent in the background
//! 2. The agent runs a Messages API tool loop inside the workspace directory
//! 3. The terminal outcome is written back to the query store
//! 4. Clients poll `GET /result/{id}` until completed or failed
//!
//! ## Modules
//! - `agent`: the agent runtime adapter (trait + Anthropic implementation)
//! - `api`: axum routes, shared state, server entry point
//! - `client`: companion client used by the interactive CLI binary
//! - `query`: query lifecycle store
//! - `workspace`: the agent's working directory

pub mod agent;
pub mod api;
pub mod client;
pub mod config;
pub mod query;
pub mod workspace;

pub use config::Config;
