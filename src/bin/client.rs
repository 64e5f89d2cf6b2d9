//! Interactive client for the gh-pilot server.
//!
//! Reads queries from stdin, submits each one, and polls until the agent
//! finishes. The server URL is the first argument, defaulting to the local
//! development address.

use std::io::{BufRead, Write};
use std::time::Duration;

use gh_pilot::api::types::ResultResponse;
use gh_pilot::client::{AgentClient, DEFAULT_MAX_POLLS};

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let server_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    let client = AgentClient::new(server_url);

    match client.workspace_info().await {
        Ok(info) => {
            let path = info
                .get("workspace_path")
                .and_then(|v| v.as_str())
                .unwrap_or("<unknown>");
            println!("Connected to {} (workspace: {})", client.base_url(), path);
        }
        Err(e) => {
            eprintln!("Warning: could not reach {}: {:#}", client.base_url(), e);
        }
    }
    println!("Type your queries, or 'quit' to exit.");

    let stdin = std::io::stdin();
    loop {
        print!("\nquery> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("quit") || query.eq_ignore_ascii_case("exit") {
            break;
        }

        let id = match client.submit(query).await {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                continue;
            }
        };
        println!("Submitted query {} - waiting for the agent...", id);

        match client
            .wait(id, DEFAULT_MAX_POLLS, Duration::from_secs(1))
            .await
        {
            Ok(ResultResponse::Completed { result }) => println!("\n{}", result),
            Ok(ResultResponse::Failed { error }) => eprintln!("\nAgent failed: {}", error),
            Ok(ResultResponse::NotFound) => eprintln!("\nServer lost track of query {}", id),
            Ok(ResultResponse::Pending) => unreachable!("wait never returns pending"),
            Err(e) => eprintln!("\nError: {:#}", e),
        }
    }

    Ok(())
}
