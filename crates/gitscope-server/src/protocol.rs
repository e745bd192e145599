//! WebSocket message types shared with the browser client.
//!
//! Client messages carry raw pointer input and view commands; server
//! messages carry draw lists and panel payloads. Both sides use a
//! `type` tag in snake_case.

use serde::{Deserialize, Serialize};

use gitscope_core::{CommitId, DrawOp, RepoSnapshot, RepoStats, Selection, Status, View};
use gitscope_git::{DiffSummary, TreeEntry};

/// Messages the browser sends to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    Wheel { delta_y: f32 },
    ZoomIn,
    ZoomOut,
    ResetView,
    Resize { width: f32, height: f32 },
    SwitchView { view: View },
    SelectCommit { id: String },
    OpenDiff,
    CloseDiff,
    Refresh,
    Ping,
}

/// Messages the server pushes to the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Frame { ops: Vec<DrawOp> },
    Status { status: Status },
    Selected { selection: Selection },
    ActiveView { view: View },
    Overview { overview: RepoOverview },
    Branches { branches: Vec<BranchInfo> },
    Files { entries: Vec<TreeEntry> },
    Stats { stats: RepoStats },
    History { entries: Vec<HistoryEntry> },
    Diff { diff: DiffSummary },
    Error { message: String },
    Pong,
}

/// Header line for the info panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoOverview {
    pub branch: Option<String>,
    pub commits: usize,
    pub branches: usize,
}

impl RepoOverview {
    pub fn from_snapshot(snapshot: &RepoSnapshot) -> Self {
        RepoOverview {
            branch: snapshot.current_branch.clone(),
            commits: snapshot.commits.len(),
            branches: snapshot.branches.len(),
        }
    }
}

/// One row of the branches panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub head: bool,
}

impl BranchInfo {
    pub fn from_snapshot(snapshot: &RepoSnapshot) -> Vec<BranchInfo> {
        snapshot
            .branches
            .iter()
            .map(|name| BranchInfo {
                name: name.clone(),
                head: snapshot.current_branch.as_deref() == Some(name.as_str()),
            })
            .collect()
    }
}

/// One row of the history panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: CommitId,
    pub summary: String,
    pub date: String,
}

impl HistoryEntry {
    pub fn from_snapshot(snapshot: &RepoSnapshot) -> Vec<HistoryEntry> {
        snapshot
            .commits
            .iter()
            .map(|commit| HistoryEntry {
                id: commit.id.clone(),
                summary: commit.summary().to_string(),
                date: commit.short_date(),
            })
            .collect()
    }
}
