//! The agent's workspace directory.
//!
//! A `Workspace` is an explicit context object passed to the agent rather
//! than a process-wide singleton, so nothing prevents running several
//! isolated workspaces in one process later. The directory lives on disk
//! (typically a mounted volume) and survives restarts until explicitly
//! reset.
//!
//! Concurrent queries share the same directory without locking; the only
//! guard is the reset-while-busy check enforced at the API layer.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A node in the workspace file tree, mirroring what clients render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    pub name: String,
    /// Path relative to the workspace root.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
}

/// Metadata reported by `GET /workspace_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub workspace_path: String,
    pub workspace_exists: bool,
    pub files: Vec<FileNode>,
}

/// The agent's working directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the workspace directory if it does not exist yet.
    pub async fn ensure(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Destroy and recreate the workspace directory, discarding all contents.
    pub async fn reset(&self) -> io::Result<()> {
        if tokio::fs::try_exists(&self.root).await? {
            tokio::fs::remove_dir_all(&self.root).await?;
        }
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Snapshot the workspace path, existence, and nested file tree.
    pub async fn info(&self) -> WorkspaceInfo {
        let exists = self.root.exists();
        let files = if exists {
            match read_tree(&self.root, "") {
                Ok(tree) => tree,
                Err(e) => {
                    tracing::warn!("Failed to read workspace tree: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        WorkspaceInfo {
            workspace_path: self.root.display().to_string(),
            workspace_exists: exists,
            files,
        }
    }
}

/// Recursively list a directory as a name-sorted tree of [`FileNode`]s.
fn read_tree(dir: &Path, rel: &str) -> io::Result<Vec<FileNode>> {
    let mut names: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let mut nodes = Vec::with_capacity(names.len());
    for name in names {
        let path = dir.join(&name);
        let rel_path = if rel.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", rel, name)
        };

        if path.is_dir() {
            let children = read_tree(&path, &rel_path)?;
            nodes.push(FileNode {
                name,
                path: rel_path,
                kind: FileKind::Directory,
                children: Some(children),
            });
        } else {
            nodes.push(FileNode {
                name,
                path: rel_path,
                kind: FileKind::File,
                children: None,
            });
        }
    }

    Ok(nodes)
}
