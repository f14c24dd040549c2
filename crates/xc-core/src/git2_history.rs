//! Native history queries via libgit2 (git2 crate).
//!
//! In-process alternative to shelling out to `git` for the read-only
//! queries the relic engine needs. Only reads live here; the remote
//! checkout acquirer keeps shelling out for `clone`.
//!
//! Only available with the `libgit2` feature flag (enabled by default).
//! When disabled, [`crate::history::default_provider`] falls back to the
//! shell provider.

use std::path::Path;

use crate::history::{Commit, HistoryError, HistoryProvider};

impl From<git2::Error> for HistoryError {
    fn from(e: git2::Error) -> Self {
        HistoryError::Command(e.message().to_string())
    }
}

/// History provider backed by in-process libgit2 calls.
///
/// Stateless; opens the repository fresh for each call, which keeps it
/// read-safe under concurrent queries.
pub struct Git2HistoryProvider;

impl Git2HistoryProvider {
    fn open(workdir: &Path) -> Result<git2::Repository, HistoryError> {
        git2::Repository::discover(workdir).map_err(HistoryError::from)
    }

    /// Object id of `path` within `tree`, or the tree's own id when the
    /// query targets the whole tree (`""` or `"."`).
    fn entry_id(tree: &git2::Tree<'_>, path: &str) -> Option<git2::Oid> {
        if path.is_empty() || path == "." {
            return Some(tree.id());
        }
        tree.get_path(Path::new(path)).ok().map(|entry| entry.id())
    }

    fn to_commit(commit: &git2::Commit<'_>) -> Commit {
        let author = commit.author();
        Commit {
            id: commit.id().to_string(),
            timestamp: commit.time().seconds(),
            author: author.name().unwrap_or("unknown").to_string(),
            message: commit.summary().unwrap_or("").to_string(),
        }
    }

    fn find_commit<'r>(
        repo: &'r git2::Repository,
        revision: &str,
    ) -> Result<git2::Commit<'r>, HistoryError> {
        repo.revparse_single(revision)?
            .peel_to_commit()
            .map_err(HistoryError::from)
    }
}

impl HistoryProvider for Git2HistoryProvider {
    fn log(
        &self,
        workdir: &Path,
        path: &str,
        max_entries: Option<usize>,
    ) -> Result<Vec<Commit>, HistoryError> {
        let repo = Self::open(workdir)?;
        let mut revwalk = repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(git2::Sort::TIME)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            let commit = repo.find_commit(oid)?;

            let current = Self::entry_id(&commit.tree()?, path);
            // Compare against the first parent only, matching default git
            // log history simplification closely enough for lifecycle use.
            let parent = match commit.parent(0) {
                Ok(parent) => Self::entry_id(&parent.tree()?, path),
                Err(_) => None,
            };

            if current != parent {
                commits.push(Self::to_commit(&commit));
                if let Some(max) = max_entries {
                    if commits.len() >= max {
                        break;
                    }
                }
            }
        }

        Ok(commits)
    }

    fn read_at_revision(
        &self,
        workdir: &Path,
        revision: &str,
        path: &str,
    ) -> Result<String, HistoryError> {
        let repo = Self::open(workdir)?;
        let commit = Self::find_commit(&repo, revision)?;
        let tree = commit.tree()?;

        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                return Err(HistoryError::NotFound(path.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        match entry.kind() {
            Some(git2::ObjectType::Tree) => {
                // Directory: render child names, like `git show rev:dir`.
                let subtree = repo.find_tree(entry.id())?;
                let mut names: Vec<String> = subtree
                    .iter()
                    .filter_map(|child| child.name().map(ToOwned::to_owned))
                    .collect();
                names.push(String::new());
                Ok(names.join("\n"))
            }
            _ => {
                let blob = repo.find_blob(entry.id())?;
                Ok(String::from_utf8_lossy(blob.content()).into_owned())
            }
        }
    }

    fn diff_name_only(&self, workdir: &Path, revision: &str) -> Result<Vec<String>, HistoryError> {
        let repo = Self::open(workdir)?;
        let commit = Self::find_commit(&repo, revision)?;

        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None, // root commit diffs against the empty tree
        };

        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&commit.tree()?), None)?;

        let mut paths = Vec::new();
        for delta in diff.deltas() {
            if let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) {
                paths.push(path.to_string_lossy().to_string());
            }
        }

        Ok(paths)
    }

    fn show_patch(
        &self,
        workdir: &Path,
        revision: &str,
        path: &str,
    ) -> Result<String, HistoryError> {
        let repo = Self::open(workdir)?;
        let commit = Self::find_commit(&repo, revision)?;

        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };

        let mut opts = git2::DiffOptions::new();
        opts.pathspec(path);
        let diff = repo.diff_tree_to_tree(
            parent_tree.as_ref(),
            Some(&commit.tree()?),
            Some(&mut opts),
        )?;

        let meta = Self::to_commit(&commit);
        let mut patch = format!(
            "commit {}\nAuthor: {}\n\n    {}\n\n",
            meta.id, meta.author, meta.message
        );
        diff.print(git2::DiffFormat::Patch, |_delta, _hunk, line| {
            match line.origin() {
                '+' | '-' | ' ' => patch.push(line.origin()),
                _ => {}
            }
            patch.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        Ok(patch)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
