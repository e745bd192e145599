//! CLI command implementations

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gitscope_core::RepoStats;
use gitscope_git::RepoReader;
use gitscope_server::{GitscopeServer, ServerConfig, ServerState};
use gitscope_watcher::{RepoEvent, RepoWatcher};

pub struct ServeOptions {
    pub repo: PathBuf,
    pub host: String,
    pub port: u16,
    pub depth: usize,
}

pub async fn serve(options: ServeOptions, open_browser: bool) -> anyhow::Result<()> {
    tracing::info!("Starting Gitscope server on {}:{}", options.host, options.port);

    let state = Arc::new(ServerState::new(options.repo.clone(), options.depth));

    // The first load fails fast so a bad path surfaces at startup
    state.reload().await?;

    // Reload on ref changes in a background task
    let watcher_repo = options.repo.clone();
    let watcher_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = run_watcher(watcher_repo, watcher_state).await {
            tracing::error!("Repository watcher error: {}", e);
        }
    });

    let config = ServerConfig { host: options.host, port: options.port };
    let server = GitscopeServer::new(state, config);

    if open_browser {
        let url = server.url();
        tokio::spawn(async move {
            // Let the listener come up before the browser asks
            tokio::time::sleep(Duration::from_millis(300)).await;
            if let Err(e) = open::that(&url) {
                tracing::warn!("Cannot open browser: {}", e);
            }
        });
    }

    server.start().await
}

/// Watch `.git` and reload the snapshot on every debounced ref change.
async fn run_watcher(repo: PathBuf, state: Arc<ServerState>) -> anyhow::Result<()> {
    let mut watcher = RepoWatcher::new(&repo)?;
    tracing::info!("Watching {} for ref changes", repo.display());

    while let Some(RepoEvent::RefsChanged) = watcher.next_change().await {
        tracing::debug!("Refs changed, reloading");
        if let Err(e) = state.reload().await {
            tracing::warn!("Reload failed: {}", e);
        }
    }
    Ok(())
}

pub fn log(repo: PathBuf, limit: usize) -> anyhow::Result<()> {
    let snapshot = RepoReader::open(&repo)?.snapshot(limit)?;
    for commit in &snapshot.commits {
        println!(
            "{} {} {} ({})",
            commit.id.short(),
            commit.short_date(),
            commit.summary(),
            commit.author.name
        );
    }
    Ok(())
}

pub fn stats(repo: PathBuf, depth: usize) -> anyhow::Result<()> {
    let snapshot = RepoReader::open(&repo)?.snapshot(depth)?;
    let stats = RepoStats::from_snapshot(&snapshot);

    println!("Repository:   {}", snapshot.path.display());
    println!(
        "Branch:       {}",
        snapshot.current_branch.as_deref().unwrap_or("None")
    );
    println!("Commits:      {}", stats.commits);
    println!("Branches:     {}", stats.branches);
    println!("Contributors: {}", stats.contributors);
    Ok(())
}
