//! Shared server state: the latest snapshot, refresh fan-out, sessions

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use anyhow::anyhow;
use dashmap::DashMap;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use gitscope_core::RepoSnapshot;
use gitscope_git::{DiffSummary, ProviderError, RepoReader, TreeEntry};

/// Broadcast to every connected session when a load finishes.
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    Reloaded(Arc<RepoSnapshot>),
    LoadFailed(String),
}

/// State shared by the REST handlers, the WebSocket sessions and the
/// watcher-driven reload loop.
pub struct ServerState {
    repo_path: PathBuf,
    depth: usize,
    snapshot: RwLock<Option<Arc<RepoSnapshot>>>,
    refresh_tx: broadcast::Sender<RefreshEvent>,
    sessions: DashMap<u64, Instant>,
    next_session: AtomicU64,
    /// Bumped when a load starts; a finishing load installs its snapshot
    /// only while it is still the newest one.
    load_generation: AtomicU64,
}

impl ServerState {
    pub fn new(repo_path: impl Into<PathBuf>, depth: usize) -> Self {
        let (refresh_tx, _) = broadcast::channel(64);
        ServerState {
            repo_path: repo_path.into(),
            depth,
            snapshot: RwLock::new(None),
            refresh_tx,
            sessions: DashMap::new(),
            next_session: AtomicU64::new(1),
            load_generation: AtomicU64::new(0),
        }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub async fn snapshot(&self) -> Option<Arc<RepoSnapshot>> {
        self.snapshot.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.refresh_tx.subscribe()
    }

    pub fn register_session(&self) -> u64 {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        self.sessions.insert(id, Instant::now());
        id
    }

    pub fn unregister_session(&self, id: u64) {
        if let Some((_, connected_at)) = self.sessions.remove(&id) {
            debug!(
                session_id = id,
                secs = connected_at.elapsed().as_secs(),
                "session closed"
            );
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Load a fresh snapshot off the runtime and install it.
    ///
    /// Loads can overlap; only the newest one wins. A superseded load is
    /// discarded silently, a failed current load broadcasts
    /// [`RefreshEvent::LoadFailed`] and leaves the installed snapshot
    /// untouched.
    pub async fn reload(&self) -> anyhow::Result<()> {
        let generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let path = self.repo_path.clone();
        let depth = self.depth;

        let result = tokio::task::spawn_blocking(move || -> Result<RepoSnapshot, ProviderError> {
            RepoReader::open(&path)?.snapshot(depth)
        })
        .await;

        let outcome = match result {
            Ok(Ok(snapshot)) => Ok(Arc::new(snapshot)),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("load task failed: {e}")),
        };

        match outcome {
            Ok(snapshot) => {
                if !self.try_install(generation, Arc::clone(&snapshot)).await {
                    debug!(generation, "discarding superseded load");
                    return Ok(());
                }
                info!(
                    commits = snapshot.commits.len(),
                    branches = snapshot.branches.len(),
                    "repository reloaded"
                );
                let _ = self.refresh_tx.send(RefreshEvent::Reloaded(snapshot));
                Ok(())
            }
            Err(message) => {
                if self.load_generation.load(Ordering::SeqCst) == generation {
                    warn!(%message, "repository load failed");
                    let _ = self.refresh_tx.send(RefreshEvent::LoadFailed(message.clone()));
                }
                Err(anyhow!(message))
            }
        }
    }

    async fn try_install(&self, generation: u64, snapshot: Arc<RepoSnapshot>) -> bool {
        let mut guard = self.snapshot.write().await;
        if self.load_generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        *guard = Some(snapshot);
        true
    }

    /// Top-level HEAD tree entries, read off the runtime.
    pub async fn head_tree(&self) -> anyhow::Result<Vec<TreeEntry>> {
        let path = self.repo_path.clone();
        let entries =
            tokio::task::spawn_blocking(move || -> Result<Vec<TreeEntry>, ProviderError> {
                RepoReader::open(&path)?.head_tree()
            })
            .await??;
        Ok(entries)
    }

    /// Change counts for one commit, read off the runtime.
    pub async fn diff_summary(&self, id: String) -> anyhow::Result<DiffSummary> {
        let path = self.repo_path.clone();
        let diff = tokio::task::spawn_blocking(move || -> Result<DiffSummary, ProviderError> {
            RepoReader::open(&path)?.diff_summary(&id)
        })
        .await??;
        Ok(diff)
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("repo_path", &self.repo_path)
            .field("depth", &self.depth)
            .field("sessions", &self.sessions.len())
            .finish()
    }
}
