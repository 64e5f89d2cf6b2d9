//! Query lifecycle store.
//!
//! Tracks every submitted query from `pending` to exactly one terminal state
//! (`completed` or `failed`). Terminal states are immutable: a late writer
//! cannot overwrite a result that has already been recorded. Entries are
//! never evicted; unbounded growth is an accepted limitation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Lifecycle state of a query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Pending,
    Completed,
    Failed,
}

/// A single submitted query.
#[derive(Debug, Clone, Serialize)]
pub struct Query {
    pub id: Uuid,
    pub prompt: String,
    pub status: QueryStatus,
    /// Agent output, present once status is `Completed`.
    pub result: Option<String>,
    /// Failure message, present once status is `Failed`.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

struct QueryEntry {
    query: Query,
    /// Handle of the background task executing this query. Currently only
    /// stored; there is no cancellation path once a query is scheduled.
    #[allow(dead_code)]
    handle: Option<JoinHandle<()>>,
}

/// In-memory store mapping query ids to lifecycle state.
#[derive(Default)]
pub struct QueryStore {
    entries: RwLock<HashMap<Uuid, QueryEntry>>,
}

impl QueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new pending query. Ids are random v4 UUIDs, so concurrent
    /// creates cannot collide.
    pub async fn create(&self, prompt: impl Into<String>) -> Query {
        let query = Query {
            id: Uuid::new_v4(),
            prompt: prompt.into(),
            status: QueryStatus::Pending,
            result: None,
            error: None,
            created_at: Utc::now(),
        };

        let mut entries = self.entries.write().await;
        entries.insert(
            query.id,
            QueryEntry {
                query: query.clone(),
                handle: None,
            },
        );
        query
    }

    /// Snapshot of a query, or `None` for unknown ids.
    pub async fn get(&self, id: Uuid) -> Option<Query> {
        self.entries.read().await.get(&id).map(|e| e.query.clone())
    }

    /// Record the background task handle for a query.
    pub async fn attach_handle(&self, id: Uuid, handle: JoinHandle<()>) {
        if let Some(entry) = self.entries.write().await.get_mut(&id) {
            entry.handle = Some(handle);
        }
    }

    /// Transition `pending` -> `completed` with the agent's output.
    pub async fn set_result(&self, id: Uuid, result: impl Into<String>) {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&id) {
            Some(entry) if entry.query.status == QueryStatus::Pending => {
                entry.query.status = QueryStatus::Completed;
                entry.query.result = Some(result.into());
            }
            Some(entry) => {
                tracing::warn!(
                    "Ignoring result for query {} in terminal state {:?}",
                    id,
                    entry.query.status
                );
            }
            None => tracing::warn!("Ignoring result for unknown query {}", id),
        }
    }

    /// Transition `pending` -> `failed` with a failure message.
    pub async fn set_error(&self, id: Uuid, message: impl Into<String>) {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&id) {
            Some(entry) if entry.query.status == QueryStatus::Pending => {
                entry.query.status = QueryStatus::Failed;
                entry.query.error = Some(message.into());
            }
            Some(entry) => {
                tracing::warn!(
                    "Ignoring error for query {} in terminal state {:?}",
                    id,
                    entry.query.status
                );
            }
            None => tracing::warn!("Ignoring error for unknown query {}", id),
        }
    }

    /// Number of queries still pending. Used to refuse workspace resets
    /// while the agent may be writing into the workspace.
    pub async fn in_flight(&self) -> usize {
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.query.status == QueryStatus::Pending)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_starts_pending() {
        let store = QueryStore::new();
        let query = store.create("list files").await;

        assert_eq!(query.status, QueryStatus::Pending);
        assert!(query.result.is_none());
        assert!(query.error.is_none());

        let fetched = store.get(query.id).await.unwrap();
        assert_eq!(fetched.status, QueryStatus::Pending);
        assert_eq!(fetched.prompt, "list files");
    }

    #[tokio::test]
    async fn result_completes_query() {
        let store = QueryStore::new();
        let query = store.create("list files").await;

        store.set_result(query.id, "a.txt, b.txt").await;

        let fetched = store.get(query.id).await.unwrap();
        assert_eq!(fetched.status, QueryStatus::Completed);
        assert_eq!(fetched.result.as_deref(), Some("a.txt, b.txt"));
        assert!(fetched.error.is_none());
    }

    #[tokio::test]
    async fn error_fails_query() {
        let store = QueryStore::new();
        let query = store.create("break things").await;

        store.set_error(query.id, "agent exploded").await;

        let fetched = store.get(query.id).await.unwrap();
        assert_eq!(fetched.status, QueryStatus::Failed);
        assert_eq!(fetched.error.as_deref(), Some("agent exploded"));
        assert!(fetched.result.is_none());
    }

    #[tokio::test]
    async fn terminal_state_is_immutable() {
        let store = QueryStore::new();
        let query = store.create("list files").await;

        store.set_result(query.id, "done").await;
        store.set_error(query.id, "too late").await;
        store.set_result(query.id, "overwritten").await;

        let fetched = store.get(query.id).await.unwrap();
        assert_eq!(fetched.status, QueryStatus::Completed);
        assert_eq!(fetched.result.as_deref(), Some("done"));
        assert!(fetched.error.is_none());
    }

    #[tokio::test]
    async fn unknown_id_returns_none() {
        let store = QueryStore::new();
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn in_flight_counts_pending_only() {
        let store = QueryStore::new();
        let a = store.create("one").await;
        let _b = store.create("two").await;
        assert_eq!(store.in_flight().await, 2);

        store.set_result(a.id, "ok").await;
        assert_eq!(store.in_flight().await, 1);
    }
}
