//! Converts on-disk git repositories into core snapshot types

use std::path::{Path, PathBuf};

use chrono::Utc;
use git2::{BranchType, ErrorCode, ObjectType, Oid, Repository, Sort};
use thiserror::Error;
use tracing::debug;

use gitscope_core::{CommitId, CommitRecord, RepoSnapshot, Signature};

/// History window loaded per snapshot.
pub const DEFAULT_DEPTH: usize = 100;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to open repository at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },
    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),
    #[error("commit {0} not found")]
    UnknownCommit(String),
}

/// One top-level entry of the HEAD tree, for the Files view.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub kind: TreeEntryKind,
    /// 7-character object-id prefix.
    pub short_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeEntryKind {
    Tree,
    Blob,
}

/// Change counts of one commit against its first parent.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DiffSummary {
    /// 7-character prefix of the compared commit.
    pub commit: String,
    /// 7-character prefix of the first parent; `None` for root commits.
    pub parent: Option<String>,
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

/// Read access to one repository.
///
/// `git2::Repository` is not `Sync`, so a reader stays on one thread;
/// callers that need background loading open a fresh reader per load.
pub struct RepoReader {
    repo: Repository,
    path: PathBuf,
}

impl std::fmt::Debug for RepoReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoReader").field("path", &self.path).finish()
    }
}

impl RepoReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|source| ProviderError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(RepoReader {
            repo,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the newest `depth` commits plus branch metadata.
    ///
    /// A repository without any commits yields an empty snapshot, not an
    /// error.
    pub fn snapshot(&self, depth: usize) -> Result<RepoSnapshot, ProviderError> {
        let commits = self.log(depth)?;
        let branches = self.branch_names()?;
        let current_branch = self.current_branch()?;
        debug!(
            commits = commits.len(),
            branches = branches.len(),
            "loaded snapshot"
        );
        Ok(RepoSnapshot {
            path: self.path.clone(),
            commits,
            branches,
            current_branch,
            loaded_at: Utc::now().timestamp(),
        })
    }

    fn log(&self, depth: usize) -> Result<Vec<CommitRecord>, ProviderError> {
        if self.is_unborn()? {
            debug!("repository has no commits yet");
            return Ok(Vec::new());
        }

        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(Sort::TIME)?;
        walk.push_head()?;

        let mut commits = Vec::with_capacity(depth.min(128));
        for oid in walk.take(depth) {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            commits.push(to_record(&commit));
        }
        Ok(commits)
    }

    fn branch_names(&self) -> Result<Vec<String>, ProviderError> {
        let mut names = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    /// The checked-out branch name, `None` when HEAD is detached or unborn.
    fn current_branch(&self) -> Result<Option<String>, ProviderError> {
        if self.is_unborn()? {
            return Ok(None);
        }
        if self.repo.head_detached()? {
            return Ok(None);
        }
        let head = self.repo.head()?;
        Ok(head.shorthand().map(|s| s.to_string()))
    }

    /// Top-level entries of the HEAD tree. Empty for unborn repositories.
    pub fn head_tree(&self) -> Result<Vec<TreeEntry>, ProviderError> {
        if self.is_unborn()? {
            return Ok(Vec::new());
        }
        let commit = self.repo.head()?.peel_to_commit()?;
        let tree = commit.tree()?;

        let mut entries = Vec::with_capacity(tree.len());
        for entry in tree.iter() {
            let kind = match entry.kind() {
                Some(ObjectType::Tree) => TreeEntryKind::Tree,
                _ => TreeEntryKind::Blob,
            };
            entries.push(TreeEntry {
                name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
                kind,
                short_id: short7(entry.id()),
            });
        }
        Ok(entries)
    }

    /// Change counts of `id` against its first parent.
    pub fn diff_summary(&self, id: &str) -> Result<DiffSummary, ProviderError> {
        let oid: Oid = id
            .parse()
            .map_err(|_| ProviderError::UnknownCommit(id.to_string()))?;
        let commit = self
            .repo
            .find_commit(oid)
            .map_err(|_| ProviderError::UnknownCommit(id.to_string()))?;

        let Some(parent) = commit.parents().next() else {
            return Ok(DiffSummary {
                commit: short7(commit.id()),
                parent: None,
                files_changed: 0,
                insertions: 0,
                deletions: 0,
            });
        };

        let diff =
            self.repo
                .diff_tree_to_tree(Some(&parent.tree()?), Some(&commit.tree()?), None)?;
        let stats = diff.stats()?;
        Ok(DiffSummary {
            commit: short7(commit.id()),
            parent: Some(short7(parent.id())),
            files_changed: stats.files_changed(),
            insertions: stats.insertions(),
            deletions: stats.deletions(),
        })
    }

    fn is_unborn(&self) -> Result<bool, ProviderError> {
        match self.repo.head() {
            Ok(_) => Ok(false),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(true)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn to_record(commit: &git2::Commit<'_>) -> CommitRecord {
    let author = commit.author();
    CommitRecord {
        id: CommitId::new(commit.id().to_string()),
        message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        author: Signature::new(String::from_utf8_lossy(author.name_bytes()).into_owned()),
        timestamp: author.when().seconds(),
        parents: commit
            .parent_ids()
            .map(|oid| CommitId::new(oid.to_string()))
            .collect(),
    }
}

fn short7(oid: Oid) -> String {
    let mut s = oid.to_string();
    s.truncate(7);
    s
}
