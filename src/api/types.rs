//! Wire types for the HTTP API.
//!
//! Error outcomes are reported in-band: polling a failed or unknown query
//! returns HTTP 200 with a status field, and workspace resets answer with a
//! success/error envelope. Clients branch on `status`, not on HTTP codes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::query::{Query, QueryStatus};

/// Body of `POST /query`.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub text: String,
}

/// Response of `POST /query`.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryCreatedResponse {
    pub query_id: Uuid,
    pub status: QueryStatus,
}

/// Response of `GET /result/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResultResponse {
    Pending,
    Completed { result: String },
    Failed { error: String },
    NotFound,
}

impl From<Query> for ResultResponse {
    fn from(query: Query) -> Self {
        match query.status {
            QueryStatus::Pending => ResultResponse::Pending,
            QueryStatus::Completed => ResultResponse::Completed {
                result: query.result.unwrap_or_default(),
            },
            QueryStatus::Failed => ResultResponse::Failed {
                error: query.error.unwrap_or_default(),
            },
        }
    }
}

/// Response of `POST /reset_workspace`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResetResponse {
    Success { message: String },
    Error { message: String },
}

/// Response of `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
