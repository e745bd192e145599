//! Filesystem watcher implementation

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Quiet window a burst of ref writes must survive before one event fires.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Events emitted by the repository watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoEvent {
    /// HEAD moved, a branch was created/updated/deleted, or refs were packed
    RefsChanged,
}

/// Watches `<repo>/.git` and reports debounced ref updates.
///
/// Every commit, checkout, branch, fetch or reset touches HEAD, `refs/`,
/// `logs/` or `packed-refs`; object writes are ignored so bulk operations
/// do not cause a reload per blob.
pub struct RepoWatcher {
    // Held so the backend keeps running; dropping it stops the watch.
    _watcher: RecommendedWatcher,
    event_rx: mpsc::UnboundedReceiver<PathBuf>,
    git_dir: PathBuf,
}

impl RepoWatcher {
    /// Start watching the repository at `repo_root`.
    pub fn new(repo_root: impl AsRef<Path>) -> Result<Self> {
        let git_dir = repo_root.as_ref().join(".git");
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                match res {
                    Ok(event) => handle_notify_event(event, &event_tx),
                    Err(e) => error!("file system watch error: {}", e),
                }
            })?;
        watcher.watch(&git_dir, RecursiveMode::Recursive)?;
        info!("Watching git directory: {:?}", git_dir);

        Ok(RepoWatcher {
            _watcher: watcher,
            event_rx,
            git_dir,
        })
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Wait for the next ref update.
    ///
    /// Absorbs the whole burst: resolves only after [`DEBOUNCE_WINDOW`] has
    /// passed without further ref writes. Returns `None` once the watch
    /// backend has shut down.
    pub async fn next_change(&mut self) -> Option<RepoEvent> {
        self.event_rx.recv().await?;
        loop {
            match tokio::time::timeout(DEBOUNCE_WINDOW, self.event_rx.recv()).await {
                Ok(Some(path)) => {
                    debug!("absorbing ref update: {:?}", path);
                }
                // Quiet window elapsed, or the backend went away with an
                // event still owed
                Ok(None) | Err(_) => return Some(RepoEvent::RefsChanged),
            }
        }
    }
}

fn handle_notify_event(event: notify::Event, event_tx: &mpsc::UnboundedSender<PathBuf>) {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return;
    }
    for path in event.paths {
        if !is_ref_update(&path) {
            continue;
        }
        debug!("ref update: {:?}", path);
        if event_tx.send(path).is_err() {
            warn!("watcher receiver dropped");
            return;
        }
    }
}

/// Whether a path inside .git is part of the ref state.
fn is_ref_update(path: &Path) -> bool {
    let mut components = path.components();
    for component in components.by_ref() {
        if component.as_os_str() == ".git" {
            break;
        }
    }
    let Some(next) = components.next() else {
        return false;
    };
    let Some(name) = next.as_os_str().to_str() else {
        return false;
    };
    matches!(name, "HEAD" | "packed-refs" | "refs" | "logs")
}
