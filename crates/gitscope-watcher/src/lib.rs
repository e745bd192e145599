//! Watches a repository's .git directory for ref updates

pub mod watcher;

pub use watcher::{DEBOUNCE_WINDOW, RepoEvent, RepoWatcher};
