//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::agent::{AgentRef, ClaudeAgent};
use crate::config::Config;
use crate::query::QueryStore;
use crate::workspace::{Workspace, WorkspaceInfo};

use super::types::*;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub queries: QueryStore,
    /// The agent used for query execution
    pub agent: AgentRef,
    /// The agent's working directory
    pub workspace: Workspace,
}

/// Build the router for a prepared application state.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/query", post(submit_query))
        .route("/result/:id", get(get_result))
        .route("/workspace_info", get(workspace_info))
        .route("/reset_workspace", post(reset_workspace))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let workspace = Workspace::new(config.workspace_dir.clone());
    workspace.ensure().await?;

    if config.api_key.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY is not set; queries will fail until it is configured");
    }

    let agent: AgentRef = Arc::new(ClaudeAgent::new(&config));

    let state = Arc::new(AppState {
        config: config.clone(),
        queries: QueryStore::new(),
        agent,
        workspace,
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Agent workspace at {}", config.workspace_dir.display());

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGTERM/SIGINT.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Submit a query. Returns immediately; the agent runs in the background.
async fn submit_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Json<QueryCreatedResponse> {
    let query = state.queries.create(req.text.clone()).await;
    let id = query.id;

    tracing::info!("Accepted query {}: {:?}", id, req.text);

    let state_clone = Arc::clone(&state);
    let handle = tokio::spawn(async move {
        run_agent_query(state_clone, id, req.text).await;
    });
    state.queries.attach_handle(id, handle).await;

    Json(QueryCreatedResponse {
        query_id: id,
        status: query.status,
    })
}

/// Run the agent for a query (background). Any failure is caught and stored
/// as the query's terminal state; nothing escapes to crash the process.
async fn run_agent_query(state: Arc<AppState>, id: Uuid, prompt: String) {
    match state.agent.run(&prompt, state.workspace.root()).await {
        Ok(result) => {
            tracing::info!("Query {} completed", id);
            state.queries.set_result(id, result).await;
        }
        Err(e) => {
            tracing::error!("Query {} failed: {:#}", id, e);
            state.queries.set_error(id, format!("{:#}", e)).await;
        }
    }
}

/// Poll a query's status and result.
///
/// Unknown ids (including strings that are not UUIDs at all) answer with an
/// in-band `not_found` status rather than an HTTP error.
async fn get_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<ResultResponse> {
    let Ok(id) = id.parse::<Uuid>() else {
        return Json(ResultResponse::NotFound);
    };

    match state.queries.get(id).await {
        Some(query) => Json(query.into()),
        None => Json(ResultResponse::NotFound),
    }
}

/// Report the workspace path, existence, and file tree.
async fn workspace_info(State(state): State<Arc<AppState>>) -> Json<WorkspaceInfo> {
    Json(state.workspace.info().await)
}

/// Destroy and recreate the workspace directory.
///
/// Refused while any query is in flight; the workspace is shared mutable
/// state and a reset under a running agent would pull the directory out
/// from under it.
async fn reset_workspace(State(state): State<Arc<AppState>>) -> Json<ResetResponse> {
    let in_flight = state.queries.in_flight().await;
    if in_flight > 0 {
        return Json(ResetResponse::Error {
            message: format!(
                "Workspace is busy: {} query(ies) still in flight",
                in_flight
            ),
        });
    }

    match state.workspace.reset().await {
        Ok(()) => {
            tracing::info!("Workspace reset at {}", state.workspace.root().display());
            Json(ResetResponse::Success {
                message: format!(
                    "Workspace at {} has been reset",
                    state.workspace.root().display()
                ),
            })
        }
        Err(e) => Json(ResetResponse::Error {
            message: format!("Error resetting workspace: {}", e),
        }),
    }
}
