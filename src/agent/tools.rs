//! Shell command execution for the agent's `run_command` tool.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// Run a shell command in the workspace and render its outcome as text.
///
/// Failures (non-zero exit, spawn errors, timeouts) are returned as output
/// for the model to react to, never as errors; a broken command is data,
/// not a fault in the adapter.
pub async fn run_command(workspace: &Path, command: &str, timeout: Duration) -> String {
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c")
        .arg(command)
        .current_dir(workspace)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return format!("Failed to execute command: {}", e),
    };

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return format!("Failed to execute command: {}", e),
        Err(_) => {
            return format!("Command timed out after {} seconds", timeout.as_secs());
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let mut rendered = String::new();
    if !output.status.success() {
        rendered.push_str(&format!(
            "Command exited with status {}\n",
            output.status.code().unwrap_or(-1)
        ));
    }
    if !stdout.is_empty() {
        rendered.push_str(&stdout);
    }
    if !stderr.is_empty() {
        if !rendered.is_empty() {
            rendered.push('\n');
        }
        rendered.push_str("stderr:\n");
        rendered.push_str(&stderr);
    }
    if rendered.is_empty() {
        rendered.push_str("(no output)");
    }
    rendered
}
