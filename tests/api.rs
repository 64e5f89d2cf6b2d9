//! End-to-end tests for the HTTP API with a stubbed agent runtime.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use gh_pilot::agent::{AgentRef, AgentRuntime};
use gh_pilot::api::types::ResultResponse;
use gh_pilot::api::{app, AppState};
use gh_pilot::client::AgentClient;
use gh_pilot::config::Config;
use gh_pilot::query::QueryStore;
use gh_pilot::workspace::Workspace;

/// Agent stub that sleeps, then answers with a fixed result or failure.
struct StubAgent {
    reply: Result<String, String>,
    delay: Duration,
}

impl StubAgent {
    fn ok(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            delay: Duration::from_millis(100),
        }
    }

    fn err(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            delay: Duration::from_millis(100),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl AgentRuntime for StubAgent {
    async fn run(&self, _prompt: &str, _workspace: &Path) -> anyhow::Result<String> {
        tokio::time::sleep(self.delay).await;
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => anyhow::bail!("{}", message),
        }
    }
}

struct TestServer {
    client: AgentClient,
    workspace_root: std::path::PathBuf,
    // Dropped last; owns the workspace directory.
    _dir: tempfile::TempDir,
}

async fn spawn_server(agent: AgentRef) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let workspace_root = dir.path().join("agent_workspace");

    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        workspace_dir: workspace_root.clone(),
        api_key: None,
        model: "claude-3-5-sonnet-20241022".to_string(),
        target_repo: "acme/demo".to_string(),
        max_tool_rounds: 4,
        command_timeout: Duration::from_secs(5),
    };

    let workspace = Workspace::new(workspace_root.clone());
    workspace.ensure().await.unwrap();

    let state = Arc::new(AppState {
        config,
        queries: QueryStore::new(),
        agent,
        workspace,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });

    TestServer {
        client: AgentClient::new(format!("http://{}", addr)),
        workspace_root,
        _dir: dir,
    }
}

#[tokio::test]
async fn submitted_query_is_pending_then_completed() {
    let server = spawn_server(Arc::new(StubAgent::ok("a.txt, b.txt"))).await;
    let client = &server.client;

    let id = client.submit("list files").await.unwrap();

    // Straight after submission the query is still pending.
    assert_eq!(client.result(id).await.unwrap(), ResultResponse::Pending);

    let terminal = client
        .wait(id, 50, Duration::from_millis(50))
        .await
        .unwrap();
    assert_eq!(
        terminal,
        ResultResponse::Completed {
            result: "a.txt, b.txt".to_string()
        }
    );

    // Terminal state never reverts.
    assert_eq!(client.result(id).await.unwrap(), terminal);
}

#[tokio::test]
async fn failed_agent_run_reports_failed_with_message() {
    let server = spawn_server(Arc::new(StubAgent::err("gh exploded"))).await;

    let id = server.client.submit("break things").await.unwrap();
    let terminal = server
        .client
        .wait(id, 50, Duration::from_millis(50))
        .await
        .unwrap();

    match terminal {
        ResultResponse::Failed { error } => {
            assert!(!error.is_empty());
            assert!(error.contains("gh exploded"));
        }
        other => panic!("expected failed, got {:?}", other),
    }
}

#[tokio::test]
async fn unknown_ids_answer_not_found_in_band() {
    let server = spawn_server(Arc::new(StubAgent::ok("unused"))).await;

    let resp = server.client.result(Uuid::new_v4()).await.unwrap();
    assert_eq!(resp, ResultResponse::NotFound);

    // Ids that are not UUIDs at all get the same in-band answer, HTTP 200.
    let raw: serde_json::Value = reqwest::get(format!(
        "{}/result/invalid_id_123",
        server.client.base_url()
    ))
    .await
    .unwrap()
    .json()
    .await
    .unwrap();
    assert_eq!(raw["status"], "not_found");
}

#[tokio::test]
async fn reset_workspace_leaves_a_fresh_directory() {
    let server = spawn_server(Arc::new(StubAgent::ok("unused"))).await;

    std::fs::write(server.workspace_root.join("stale.txt"), "old").unwrap();

    let reset = server.client.reset_workspace().await.unwrap();
    assert_eq!(reset["status"], "success");

    let info = server.client.workspace_info().await.unwrap();
    assert_eq!(info["workspace_exists"], true);
    assert_eq!(info["files"], serde_json::json!([]));
}

#[tokio::test]
async fn reset_is_refused_while_a_query_is_in_flight() {
    let agent = StubAgent::ok("slow answer").with_delay(Duration::from_secs(2));
    let server = spawn_server(Arc::new(agent)).await;

    let id = server.client.submit("long running").await.unwrap();

    let reset = server.client.reset_workspace().await.unwrap();
    assert_eq!(reset["status"], "error");
    assert!(reset["message"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("busy"));

    // The in-flight query still finishes normally afterwards.
    let terminal = server
        .client
        .wait(id, 100, Duration::from_millis(100))
        .await
        .unwrap();
    assert_eq!(
        terminal,
        ResultResponse::Completed {
            result: "slow answer".to_string()
        }
    );
}

#[tokio::test]
async fn concurrent_queries_each_reach_their_own_result() {
    let server = spawn_server(Arc::new(StubAgent::ok("shared answer"))).await;

    let first = server.client.submit("one").await.unwrap();
    let second = server.client.submit("two").await.unwrap();
    assert_ne!(first, second);

    for id in [first, second] {
        let terminal = server
            .client
            .wait(id, 50, Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(
            terminal,
            ResultResponse::Completed {
                result: "shared answer".to_string()
            }
        );
    }
}

#[tokio::test]
async fn workspace_info_reports_nested_files() {
    let server = spawn_server(Arc::new(StubAgent::ok("unused"))).await;

    std::fs::create_dir(server.workspace_root.join("repo")).unwrap();
    std::fs::write(server.workspace_root.join("repo/readme.md"), "hi").unwrap();

    let info = server.client.workspace_info().await.unwrap();
    let files = info["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "repo");
    assert_eq!(files[0]["type"], "directory");
    assert_eq!(files[0]["children"][0]["path"], "repo/readme.md");
    assert_eq!(files[0]["children"][0]["type"], "file");
}

#[tokio::test]
async fn health_reports_ok() {
    let server = spawn_server(Arc::new(StubAgent::ok("unused"))).await;

    let health: serde_json::Value =
        reqwest::get(format!("{}/health", server.client.base_url()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(health["status"], "ok");
    assert!(!health["version"].as_str().unwrap().is_empty());
}
