//! Repository data provider backed by libgit2

pub mod reader;


#[cfg(test)]
pub mod test_utils;

pub use reader::{
    DEFAULT_DEPTH, DiffSummary, ProviderError, RepoReader, TreeEntry, TreeEntryKind,
};
