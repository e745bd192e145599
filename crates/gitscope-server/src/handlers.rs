//! REST handlers. The WebSocket drives the studio; these exist for
//! scripting and health checks.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::{Deserialize, Serialize};

use gitscope_core::{CommitGraph, RepoStats};
use gitscope_git::DiffSummary;

use crate::protocol::{BranchInfo, HistoryEntry};
use crate::state::ServerState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub sessions: usize,
    pub repo: String,
}

#[derive(Debug, Serialize)]
pub struct GraphResponse {
    pub nodes: Vec<NodeResponse>,
    pub edges: Vec<EdgeResponse>,
}

#[derive(Debug, Serialize)]
pub struct NodeResponse {
    pub id: String,
    pub summary: String,
    pub author: String,
    pub x: f32,
    pub y: f32,
    pub highlight: bool,
}

#[derive(Debug, Serialize)]
pub struct EdgeResponse {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct BranchesResponse {
    pub branches: Vec<BranchInfo>,
    pub current: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommitDetailResponse {
    pub id: String,
    pub short_id: String,
    pub summary: String,
    pub author: String,
    pub message: String,
    pub date: String,
    pub diff: Option<DiffSummary>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub summary: String,
    pub author: String,
    pub score: i64,
}

pub async fn health_handler(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        sessions: state.session_count(),
        repo: state.repo_path().display().to_string(),
    })
}

/// Positioned nodes and resolved edges, as the render driver sees them.
pub async fn graph_handler(State(state): State<Arc<ServerState>>) -> Json<GraphResponse> {
    let Some(snapshot) = state.snapshot().await else {
        return Json(GraphResponse { nodes: vec![], edges: vec![] });
    };
    let graph = CommitGraph::build(&snapshot.commits);
    let nodes = graph
        .nodes()
        .map(|node| NodeResponse {
            id: node.id.to_string(),
            summary: node.summary.clone(),
            author: node.author.clone(),
            x: node.position.x,
            y: node.position.y,
            highlight: node.highlight,
        })
        .collect();
    let edges = graph
        .edges()
        .map(|(child, parent)| EdgeResponse {
            from: child.id.to_string(),
            to: parent.id.to_string(),
        })
        .collect();
    Json(GraphResponse { nodes, edges })
}

pub async fn branches_handler(State(state): State<Arc<ServerState>>) -> Json<BranchesResponse> {
    match state.snapshot().await {
        Some(snapshot) => Json(BranchesResponse {
            branches: BranchInfo::from_snapshot(&snapshot),
            current: snapshot.current_branch.clone(),
        }),
        None => Json(BranchesResponse { branches: vec![], current: None }),
    }
}

pub async fn stats_handler(State(state): State<Arc<ServerState>>) -> Json<RepoStats> {
    match state.snapshot().await {
        Some(snapshot) => Json(RepoStats::from_snapshot(&snapshot)),
        None => Json(RepoStats { commits: 0, branches: 0, contributors: 0 }),
    }
}

pub async fn history_handler(State(state): State<Arc<ServerState>>) -> Json<Vec<HistoryEntry>> {
    match state.snapshot().await {
        Some(snapshot) => Json(HistoryEntry::from_snapshot(&snapshot)),
        None => Json(vec![]),
    }
}

/// Detail for one commit, addressed by its full id. The diff is best
/// effort; a diff failure still returns the commit.
pub async fn commit_handler(
    Path(id): Path<String>,
    State(state): State<Arc<ServerState>>,
) -> Result<Json<CommitDetailResponse>, StatusCode> {
    let snapshot = state.snapshot().await.ok_or(StatusCode::NOT_FOUND)?;
    let commit = snapshot.find(&id).ok_or(StatusCode::NOT_FOUND)?.clone();
    let diff = state.diff_summary(commit.id.to_string()).await.ok();
    Ok(Json(CommitDetailResponse {
        id: commit.id.to_string(),
        short_id: commit.id.short8().to_string(),
        summary: commit.summary().to_string(),
        author: commit.author.name.clone(),
        message: commit.message.clone(),
        date: commit.short_date(),
        diff,
    }))
}

/// Fuzzy search across summaries and author names, best score first.
pub async fn search_handler(
    Query(params): Query<SearchParams>,
    State(state): State<Arc<ServerState>>,
) -> Json<Vec<SearchResult>> {
    let Some(snapshot) = state.snapshot().await else {
        return Json(vec![]);
    };
    let matcher = SkimMatcherV2::default();
    let mut results: Vec<SearchResult> = snapshot
        .commits
        .iter()
        .filter_map(|commit| {
            let by_summary = matcher.fuzzy_match(commit.summary(), &params.q);
            let by_author = matcher.fuzzy_match(&commit.author.name, &params.q);
            let score = by_summary.max(by_author)?;
            Some(SearchResult {
                id: commit.id.short().to_string(),
                summary: commit.summary().to_string(),
                author: commit.author.name.clone(),
                score,
            })
        })
        .collect();
    results.sort_by(|a, b| b.score.cmp(&a.score));
    Json(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature, Time};
    use std::path::Path as FsPath;
    use tempfile::TempDir;

    fn fixture_repo(dir: &FsPath) {
        let repo = Repository::init(dir).unwrap();
        let sig = |t| Signature::new("alice", "alice@example.com", &Time::new(t, 0)).unwrap();
        let mut parent = None;
        for (i, message) in ["add parser", "fix lexer bug"].iter().enumerate() {
            std::fs::write(dir.join(format!("f{i}.txt")), message).unwrap();
            let mut index = repo.index().unwrap();
            index.add_path(FsPath::new(&format!("f{i}.txt"))).unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let s = sig(1_600_000_000 + i as i64 * 60);
            let parents: Vec<_> = parent.iter().collect();
            let oid = repo
                .commit(Some("HEAD"), &s, &s, message, &tree, &parents)
                .unwrap();
            parent = Some(repo.find_commit(oid).unwrap());
        }
    }

    async fn loaded_state() -> (TempDir, Arc<ServerState>) {
        let dir = TempDir::new().unwrap();
        fixture_repo(dir.path());
        let state = Arc::new(ServerState::new(dir.path(), 100));
        state.reload().await.unwrap();
        (dir, state)
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, state) = loaded_state().await;
        let response = health_handler(State(state)).await.0;
        assert_eq!(response.status, "ok");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(response.sessions, 0);
    }

    #[tokio::test]
    async fn test_graph_nodes_and_edges() {
        let (_dir, state) = loaded_state().await;
        let response = graph_handler(State(Arc::clone(&state))).await.0;
        assert_eq!(response.nodes.len(), 2);
        assert_eq!(response.edges.len(), 1);
        // Newest first, highlighted, at the fixed column
        assert_eq!(response.nodes[0].summary, "fix lexer bug");
        assert!(response.nodes[0].highlight);
        assert_eq!(response.nodes[0].x, 50.0);
        assert_eq!(response.nodes[0].y, 50.0);
        assert_eq!(response.edges[0].from, response.nodes[0].id);
        assert_eq!(response.edges[0].to, response.nodes[1].id);
    }

    #[tokio::test]
    async fn test_graph_empty_without_snapshot() {
        let state = Arc::new(ServerState::new("/tmp/nowhere", 100));
        let response = graph_handler(State(state)).await.0;
        assert!(response.nodes.is_empty());
        assert!(response.edges.is_empty());
    }

    #[tokio::test]
    async fn test_commit_detail_and_not_found() {
        let (_dir, state) = loaded_state().await;
        let id = state.snapshot().await.unwrap().commits[0].id.to_string();

        let detail = commit_handler(Path(id.clone()), State(Arc::clone(&state)))
            .await
            .unwrap()
            .0;
        assert_eq!(detail.id, id);
        assert_eq!(detail.short_id.len(), 8);
        assert_eq!(detail.summary, "fix lexer bug");
        assert_eq!(detail.date, "2020-09-13");
        let diff = detail.diff.unwrap();
        assert_eq!(diff.files_changed, 1);

        let missing = commit_handler(Path("0".repeat(40)), State(state)).await;
        assert!(matches!(missing, Err(StatusCode::NOT_FOUND)));
    }

    #[tokio::test]
    async fn test_search_ranks_matches() {
        let (_dir, state) = loaded_state().await;
        let results = search_handler(
            Query(SearchParams { q: "lexer".into() }),
            State(Arc::clone(&state)),
        )
        .await
        .0;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].summary, "fix lexer bug");
        assert_eq!(results[0].id.len(), 7);

        // Author matches surface every commit
        let results =
            search_handler(Query(SearchParams { q: "alice".into() }), State(state)).await.0;
        assert_eq!(results.len(), 2);
    }
}
