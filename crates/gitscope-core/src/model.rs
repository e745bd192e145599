//! Core data structures for the commit graph

use std::borrow::Borrow;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Full object-id hash of a commit, as supplied by the data provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CommitId(pub String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        CommitId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 7-character prefix drawn next to graph nodes.
    pub fn short(&self) -> &str {
        self.prefix(7)
    }

    /// 8-character prefix shown in the detail panel.
    pub fn short8(&self) -> &str {
        self.prefix(8)
    }

    fn prefix(&self, n: usize) -> &str {
        self.0.get(..n).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitId {
    fn from(id: &str) -> Self {
        CommitId(id.to_string())
    }
}

impl From<String> for CommitId {
    fn from(id: String) -> Self {
        CommitId(id)
    }
}

// Lets hash maps keyed by CommitId be probed with plain &str.
impl Borrow<str> for CommitId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Commit author identity. Matches the provider wire shape `author: { name }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Signature { name: name.into() }
    }
}

/// One commit as read from the repository, before layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: CommitId,
    pub message: String,
    pub author: Signature,
    /// Author time, unix seconds.
    pub timestamp: i64,
    #[serde(rename = "parent")]
    pub parents: Vec<CommitId>,
}

impl CommitRecord {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Author date formatted `YYYY-MM-DD` (UTC).
    pub fn short_date(&self) -> String {
        DateTime::<Utc>::from_timestamp(self.timestamp, 0)
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "????-??-??".to_string())
    }
}

/// One loaded repository: the bounded commit log plus branch metadata.
/// Rebuilt wholesale on every load; shared immutably between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSnapshot {
    pub path: PathBuf,
    /// Reverse-chronological, newest first.
    pub commits: Vec<CommitRecord>,
    pub branches: Vec<String>,
    /// `None` when HEAD is detached or the repository has no commits yet.
    pub current_branch: Option<String>,
    /// Unix seconds at load time.
    pub loaded_at: i64,
}

impl RepoSnapshot {
    pub fn find(&self, id: &str) -> Option<&CommitRecord> {
        self.commits.iter().find(|c| c.id.as_str() == id)
    }
}

/// A positioned node in the commit graph. `position` is assigned once by
/// the graph builder and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitNode {
    pub id: CommitId,
    pub summary: String,
    pub author: String,
    #[serde(rename = "parent")]
    pub parents: Vec<CommitId>,
    pub position: Point,
    /// Marks the newest commit for distinct rendering.
    pub highlight: bool,
}

/// What a successful pick exposes to the detail panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub id: CommitId,
    pub short_id: String,
    pub summary: String,
    pub author: String,
    pub message: String,
}

/// Status line severity, mirrored by the client's status bar color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// One user-visible status message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub text: String,
    pub kind: StatusKind,
}

impl Status {
    pub fn info(text: impl Into<String>) -> Self {
        Status { text: text.into(), kind: StatusKind::Info }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Status { text: text.into(), kind: StatusKind::Success }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Status { text: text.into(), kind: StatusKind::Error }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::info("NO REPOSITORY LOADED")
    }
}
