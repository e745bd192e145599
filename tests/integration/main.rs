//! Integration tests for Gitscope
//!
//! These drive whole pipelines: a real repository on disk, the git
//! reader, the layout and render engines, a studio session and the
//! shared server state.

use std::path::Path;
use std::sync::Arc;

use git2::{Repository, Signature, Time};
use tempfile::TempDir;

fn add_commit(repo: &Repository, file: &str, message: &str, author: &str, when: i64) {
    let dir = repo.workdir().unwrap();
    std::fs::write(dir.join(file), message).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new(file)).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let email = format!("{author}@example.com");
    let sig = Signature::new(author, &email, &Time::new(when, 0)).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap();
}

fn fixture_repo(dir: &Path) -> Repository {
    let repo = Repository::init(dir).unwrap();
    add_commit(&repo, "a.txt", "first", "alice", 1_600_000_000);
    add_commit(&repo, "b.txt", "second", "bob", 1_600_000_060);
    add_commit(&repo, "c.txt", "third", "alice", 1_600_000_120);
    repo
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    use std::process::Command;

    let output = Command::new("cargo")
        .args(["run", "--", "--help"])
        .current_dir(".")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("gitscope"));
    assert!(stdout.contains("Interactive commit graph studio"));
    assert!(stdout.contains("serve"));
}

/// Test the full path from an on-disk repository to a draw list
#[test]
fn test_snapshot_to_frame() {
    use gitscope_core::Studio;
    use gitscope_git::RepoReader;

    let dir = TempDir::new().unwrap();
    fixture_repo(dir.path());

    let snapshot = RepoReader::open(dir.path()).unwrap().snapshot(100).unwrap();
    assert_eq!(snapshot.commits.len(), 3);
    assert_eq!(snapshot.commits[0].summary(), "third");

    let mut studio = Studio::new();
    studio.load_snapshot(Arc::new(snapshot));
    assert_eq!(studio.status().text, "REPO LOADED");

    // clear + push + 2 edges + 3 circles + 6 labels + pop
    let list = studio.render().unwrap();
    assert_eq!(list.len(), 14);
}

/// Test that a rendered frame serializes the way the client replays it
#[test]
fn test_frame_wire_format() {
    use gitscope_core::Studio;
    use gitscope_git::RepoReader;

    let dir = TempDir::new().unwrap();
    fixture_repo(dir.path());

    let snapshot = RepoReader::open(dir.path()).unwrap().snapshot(100).unwrap();
    let mut studio = Studio::new();
    studio.load_snapshot(Arc::new(snapshot));

    let list = studio.render().unwrap();
    let ops = serde_json::to_value(list.ops()).unwrap();
    assert_eq!(ops[0]["op"], "rect");
    assert_eq!(ops[0]["color"], "#1a1a1a");
    assert_eq!(ops[1]["op"], "push_transform");
    assert_eq!(ops[1]["scale"], 1.0);
    let last = ops.as_array().unwrap().last().unwrap();
    assert_eq!(last["op"], "pop_transform");
}

/// Test picking a node and dragging empty space in one session
#[test]
fn test_pointer_pick_and_drag() {
    use gitscope_core::{Point, Studio};
    use gitscope_git::RepoReader;

    let dir = TempDir::new().unwrap();
    fixture_repo(dir.path());

    let snapshot = RepoReader::open(dir.path()).unwrap().snapshot(100).unwrap();
    let mut studio = Studio::new();
    studio.load_snapshot(Arc::new(snapshot));

    // Near the newest node at (50, 50)
    let selection = studio.pointer_down(Point::new(52.0, 52.0)).unwrap();
    assert_eq!(selection.summary, "third");
    assert_eq!(selection.short_id.len(), 8);
    studio.pointer_up();

    // Empty space starts a drag instead
    assert!(studio.pointer_down(Point::new(400.0, 400.0)).is_none());
    assert!(studio.pointer_move(Point::new(410.0, 390.0)));
    studio.pointer_up();
    assert_eq!(studio.viewport().offset(), Point::new(10.0, -10.0));

    // Wheel up zooms in
    studio.wheel(-120.0);
    assert!((studio.viewport().scale() - 1.1).abs() < 1e-3);
}

/// Test that the shared state loads, broadcasts and serves sessions
#[tokio::test]
async fn test_server_state_reload() {
    use gitscope_server::{RefreshEvent, ServerState};

    let dir = TempDir::new().unwrap();
    fixture_repo(dir.path());

    let state = Arc::new(ServerState::new(dir.path(), 100));
    let mut rx = state.subscribe();
    assert!(state.snapshot().await.is_none());

    state.reload().await.unwrap();

    let snapshot = state.snapshot().await.unwrap();
    assert_eq!(snapshot.commits.len(), 3);
    match rx.recv().await.unwrap() {
        RefreshEvent::Reloaded(s) => assert_eq!(s.commits.len(), 3),
        other => panic!("expected Reloaded, got {other:?}"),
    }
}

/// Test that the server assembles around a loaded state
#[tokio::test]
async fn test_server_construction() {
    use gitscope_server::{GitscopeServer, ServerConfig, ServerState, create_router};

    let dir = TempDir::new().unwrap();
    fixture_repo(dir.path());

    let state = Arc::new(ServerState::new(dir.path(), 100));
    state.reload().await.unwrap();

    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0, // Let OS assign port
    };
    let server = GitscopeServer::new(Arc::clone(&state), config);
    assert_eq!(server.state().session_count(), 0);
    assert!(server.state().snapshot().await.is_some());

    let _router = create_router(state);
}

/// Test that statistics aggregate across the loaded history
#[test]
fn test_stats_pipeline() {
    use gitscope_core::RepoStats;
    use gitscope_git::RepoReader;

    let dir = TempDir::new().unwrap();
    fixture_repo(dir.path());

    let snapshot = RepoReader::open(dir.path()).unwrap().snapshot(100).unwrap();
    let stats = RepoStats::from_snapshot(&snapshot);
    assert_eq!(stats.commits, 3);
    assert_eq!(stats.contributors, 2);
    assert_eq!(stats.branches, 1);
}

/// Test that the watcher reports a real commit as a ref change
#[tokio::test]
async fn test_watcher_sees_new_commits() {
    use gitscope_watcher::{RepoEvent, RepoWatcher};
    use std::time::Duration;

    let dir = TempDir::new().unwrap();
    let repo = fixture_repo(dir.path());

    let mut watcher = RepoWatcher::new(dir.path()).unwrap();
    add_commit(&repo, "d.txt", "fourth", "alice", 1_600_000_180);

    let event = tokio::time::timeout(Duration::from_secs(5), watcher.next_change())
        .await
        .expect("no ref change within 5s");
    assert!(matches!(event, Some(RepoEvent::RefsChanged)));
}
