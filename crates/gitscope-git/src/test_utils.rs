//! Shared fixtures for provider tests

use std::path::Path;

use git2::{Commit, Oid, Repository, Signature, Time};

pub fn init_repo(path: &Path) -> Repository {
    Repository::init(path).unwrap()
}

/// Write and stage the given files, then commit them on HEAD.
pub fn commit_files(
    repo: &Repository,
    files: &[(&str, &str)],
    message: &str,
    author: &str,
    when: i64,
) -> Oid {
    let workdir = repo.workdir().unwrap();
    let mut index = repo.index().unwrap();
    for (name, content) in files {
        let file = workdir.join(name);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&file, content).unwrap();
        index.add_path(Path::new(name)).unwrap();
    }
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let email = format!("{author}@example.com");
    let sig = Signature::new(author, &email, &Time::new(when, 0)).unwrap();
    let parent = repo.head().ok().map(|h| h.peel_to_commit().unwrap());
    let parents: Vec<&Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

pub fn commit_file(
    repo: &Repository,
    name: &str,
    content: &str,
    message: &str,
    author: &str,
    when: i64,
) -> Oid {
    commit_files(repo, &[(name, content)], message, author, when)
}
