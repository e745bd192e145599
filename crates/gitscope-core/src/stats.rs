//! Aggregate counts for the Stats view

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::RepoSnapshot;

/// Counts shown by the Stats view and the `stats` CLI command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStats {
    pub commits: usize,
    pub branches: usize,
    pub contributors: usize,
}

impl RepoStats {
    /// Aggregate over one snapshot. Contributors are distinct author names.
    pub fn from_snapshot(snapshot: &RepoSnapshot) -> Self {
        let contributors: HashSet<&str> = snapshot
            .commits
            .iter()
            .map(|commit| commit.author.name.as_str())
            .collect();
        RepoStats {
            commits: snapshot.commits.len(),
            branches: snapshot.branches.len(),
            contributors: contributors.len(),
        }
    }
}
