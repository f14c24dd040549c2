//! File-lifecycle reconstruction.
//!
//! Given a path, the relic engine walks its version-control history and
//! classifies it as never tracked, alive, or deleted. For deleted paths it
//! also resolves the deletion commit and the sibling paths changed in the
//! same commit. This is the only state-derivation logic in the tool; the
//! rest of the system feeds text in and out of it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::{default_provider, Commit, HistoryError, HistoryProvider};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Classification-affecting failures of the relic engine.
///
/// "Path has no history" is NOT an error (see
/// [`LifecycleStatus::NeverTracked`]); these are the cases where the
/// engine could not produce a classification at all.
#[derive(Debug, Error)]
pub enum RelicError {
    /// The history provider could not be queried: not a repository,
    /// transport failure, corrupted store. Never downgraded to
    /// `NeverTracked` — "no history" and "history lookup broke" are
    /// different facts.
    #[error("history unavailable: {0}")]
    HistoryUnavailable(#[source] HistoryError),

    /// History exists but the first/last commits could not be resolved.
    /// The call aborts without a partial record.
    #[error("file history is incomplete")]
    IncompleteHistory,
}

// ---------------------------------------------------------------------------
// Lifecycle record
// ---------------------------------------------------------------------------

/// Classification of a path's version-control lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleStatus {
    /// The path has no commit history at all.
    NeverTracked,
    /// The path is present in the most recent revision's tree.
    Alive,
    /// The path has history but is absent from the most recent revision.
    Deleted,
}

/// The full known life of one path. Computed fresh on every call, never
/// cached or persisted.
///
/// Field presence follows the status without exception:
///
/// - `NeverTracked`: everything absent, `related_paths` empty.
/// - `Alive`: `first_seen` and `last_seen` present, `deletion_commit`
///   absent, `related_paths` empty.
/// - `Deleted`: `deletion_commit` present and equal to `last_seen`;
///   `related_paths` holds the other paths changed by that commit (empty,
///   never absent, when it touched nothing else).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleRecord {
    pub status: LifecycleStatus,
    pub first_seen: Option<Commit>,
    pub last_seen: Option<Commit>,
    pub deletion_commit: Option<Commit>,
    pub related_paths: Vec<String>,
}

impl LifecycleRecord {
    fn never_tracked() -> Self {
        Self {
            status: LifecycleStatus::NeverTracked,
            first_seen: None,
            last_seen: None,
            deletion_commit: None,
            related_paths: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Classifies path lifecycles against one repository working copy.
///
/// Holds its [`HistoryProvider`] as an explicit dependency so callers (and
/// tests) control the backing query implementation. The engine itself is
/// read-only and stateless across calls: analyzing the same path twice
/// against an unchanged repository yields identical records.
pub struct RelicEngine {
    provider: Box<dyn HistoryProvider>,
    workdir: PathBuf,
}

impl RelicEngine {
    pub fn new(provider: Box<dyn HistoryProvider>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            workdir: workdir.into(),
        }
    }

    /// Engine over the best provider available in this build.
    pub fn with_default_provider(workdir: impl Into<PathBuf>) -> Self {
        Self::new(default_provider(), workdir)
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Classify the version-control lifecycle of `path`.
    ///
    /// Performs a strictly ordered sequence of queries: full history, then
    /// (when history exists) an existence check at the newest revision,
    /// then (when absent) the deletion commit's name-only diff. No partial
    /// record is ever returned.
    pub fn analyze_lifecycle(&self, path: &str) -> Result<LifecycleRecord, RelicError> {
        let commits = self
            .provider
            .log(&self.workdir, path, None)
            .map_err(RelicError::HistoryUnavailable)?;

        if commits.is_empty() {
            // A legitimate terminal outcome, not an error.
            return Ok(LifecycleRecord::never_tracked());
        }

        // Newest-first ordering: latest at index 0, oldest at the end.
        let (Some(last), Some(first)) = (commits.first().cloned(), commits.last().cloned()) else {
            return Err(RelicError::IncompleteHistory);
        };

        let exists = match self.provider.read_at_revision(&self.workdir, &last.id, path) {
            Ok(_) => true,
            // Absence from that revision's tree is the deletion signal,
            // not an engine failure.
            Err(HistoryError::NotFound(_)) => false,
            Err(e) => return Err(RelicError::HistoryUnavailable(e)),
        };

        if exists {
            return Ok(LifecycleRecord {
                status: LifecycleStatus::Alive,
                first_seen: Some(first),
                last_seen: Some(last),
                deletion_commit: None,
                related_paths: Vec::new(),
            });
        }

        // The name-only diff is enrichment: when it fails, the record is
        // still a valid deletion classification with no related paths.
        let related_paths = match self.provider.diff_name_only(&self.workdir, &last.id) {
            Ok(paths) => paths.into_iter().filter(|p| p != path).collect(),
            Err(e) => {
                tracing::warn!(path, error = %e, "deletion diff unavailable; related paths omitted");
                Vec::new()
            }
        };

        Ok(LifecycleRecord {
            status: LifecycleStatus::Deleted,
            first_seen: Some(first),
            deletion_commit: Some(last.clone()),
            last_seen: Some(last),
            related_paths,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn commit(id: &str, timestamp: i64, message: &str) -> Commit {
        Commit {
            id: id.to_string(),
            timestamp,
            author: "Dev".to_string(),
            message: message.to_string(),
        }
    }

    /// Scripted stand-in for a real history backend.
    struct ScriptedProvider {
        /// Newest-first history returned by `log`.
        history: Vec<Commit>,
        log_fails: bool,
        /// Whether the path exists at the newest revision.
        exists: bool,
        read_fails: bool,
        diff: Vec<String>,
        diff_fails: bool,
    }

    impl ScriptedProvider {
        fn alive(history: Vec<Commit>) -> Self {
            Self {
                history,
                log_fails: false,
                exists: true,
                read_fails: false,
                diff: Vec::new(),
                diff_fails: false,
            }
        }

        fn deleted(history: Vec<Commit>, diff: Vec<String>) -> Self {
            Self {
                history,
                log_fails: false,
                exists: false,
                read_fails: false,
                diff,
                diff_fails: false,
            }
        }
    }

    impl HistoryProvider for ScriptedProvider {
        fn log(
            &self,
            _workdir: &Path,
            _path: &str,
            _max_entries: Option<usize>,
        ) -> Result<Vec<Commit>, HistoryError> {
            if self.log_fails {
                return Err(HistoryError::Command("not a git repository".into()));
            }
            Ok(self.history.clone())
        }

        fn read_at_revision(
            &self,
            _workdir: &Path,
            _revision: &str,
            path: &str,
        ) -> Result<String, HistoryError> {
            if self.read_fails {
                return Err(HistoryError::Command("object store corrupted".into()));
            }
            if self.exists {
                Ok("contents".into())
            } else {
                Err(HistoryError::NotFound(path.to_string()))
            }
        }

        fn diff_name_only(
            &self,
            _workdir: &Path,
            _revision: &str,
        ) -> Result<Vec<String>, HistoryError> {
            if self.diff_fails {
                return Err(HistoryError::Command("diff failed".into()));
            }
            Ok(self.diff.clone())
        }

        fn show_patch(
            &self,
            _workdir: &Path,
            _revision: &str,
            _path: &str,
        ) -> Result<String, HistoryError> {
            Ok(String::new())
        }
    }

    fn engine(provider: ScriptedProvider) -> RelicEngine {
        RelicEngine::new(Box::new(provider), "/repo")
    }

    #[test]
    fn alive_path_with_two_commits() {
        let a = commit("a", 100, "oldest");
        let b = commit("b", 200, "newest");
        let engine = engine(ScriptedProvider::alive(vec![b.clone(), a.clone()]));

        let record = engine.analyze_lifecycle("kept.rs").unwrap();
        assert_eq!(record.status, LifecycleStatus::Alive);
        assert_eq!(record.first_seen, Some(a));
        assert_eq!(record.last_seen, Some(b));
        assert_eq!(record.deletion_commit, None);
        assert!(record.related_paths.is_empty());
    }

    #[test]
    fn never_tracked_path() {
        let engine = engine(ScriptedProvider::alive(Vec::new()));

        let record = engine.analyze_lifecycle("new.rs").unwrap();
        assert_eq!(record.status, LifecycleStatus::NeverTracked);
        assert_eq!(record.first_seen, None);
        assert_eq!(record.last_seen, None);
        assert_eq!(record.deletion_commit, None);
        assert!(record.related_paths.is_empty());
    }

    #[test]
    fn deleted_path_with_sibling_change() {
        let x = commit("x", 300, "remove module");
        let engine = engine(ScriptedProvider::deleted(
            vec![x.clone()],
            vec!["old.rs".to_string(), "sibling.ts".to_string()],
        ));

        let record = engine.analyze_lifecycle("old.rs").unwrap();
        assert_eq!(record.status, LifecycleStatus::Deleted);
        assert_eq!(record.first_seen, Some(x.clone()));
        assert_eq!(record.last_seen, Some(x.clone()));
        assert_eq!(record.deletion_commit, Some(x));
        assert_eq!(record.related_paths, vec!["sibling.ts".to_string()]);
    }

    #[test]
    fn deletion_commit_equals_last_seen() {
        let a = commit("a", 100, "add");
        let x = commit("x", 300, "remove");
        let engine = engine(ScriptedProvider::deleted(
            vec![x.clone(), a],
            vec!["old.rs".to_string()],
        ));

        let record = engine.analyze_lifecycle("old.rs").unwrap();
        assert_eq!(record.deletion_commit, record.last_seen);
        // The queried path itself is always filtered out.
        assert!(record.related_paths.is_empty());
    }

    #[test]
    fn history_failure_is_not_never_tracked() {
        let mut provider = ScriptedProvider::alive(Vec::new());
        provider.log_fails = true;
        let engine = engine(provider);

        let err = engine.analyze_lifecycle("any.rs").unwrap_err();
        assert!(matches!(err, RelicError::HistoryUnavailable(_)));
    }

    #[test]
    fn existence_check_failure_propagates() {
        let mut provider = ScriptedProvider::alive(vec![commit("a", 100, "add")]);
        provider.read_fails = true;
        let engine = engine(provider);

        let err = engine.analyze_lifecycle("any.rs").unwrap_err();
        assert!(matches!(err, RelicError::HistoryUnavailable(_)));
    }

    #[test]
    fn diff_failure_degrades_instead_of_aborting() {
        let x = commit("x", 300, "remove");
        let mut provider = ScriptedProvider::deleted(vec![x.clone()], Vec::new());
        provider.diff_fails = true;
        let engine = engine(provider);

        let record = engine.analyze_lifecycle("old.rs").unwrap();
        assert_eq!(record.status, LifecycleStatus::Deleted);
        assert_eq!(record.deletion_commit, Some(x));
        assert!(record.related_paths.is_empty());
    }

    #[test]
    fn analysis_is_idempotent() {
        let a = commit("a", 100, "add");
        let b = commit("b", 200, "update");
        let engine = engine(ScriptedProvider::alive(vec![b, a]));

        let one = engine.analyze_lifecycle("kept.rs").unwrap();
        let two = engine.analyze_lifecycle("kept.rs").unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn first_seen_is_not_newer_than_last_seen() {
        let a = commit("a", 100, "add");
        let b = commit("b", 200, "update");
        let engine = engine(ScriptedProvider::alive(vec![b, a]));

        let record = engine.analyze_lifecycle("kept.rs").unwrap();
        let first = record.first_seen.unwrap();
        let last = record.last_seen.unwrap();
        assert!(first.timestamp <= last.timestamp);
    }

    #[test]
    fn single_commit_is_both_first_and_last() {
        let only = commit("solo", 500, "add everything");
        let engine = engine(ScriptedProvider::alive(vec![only.clone()]));

        let record = engine.analyze_lifecycle("kept.rs").unwrap();
        assert_eq!(record.first_seen, Some(only.clone()));
        assert_eq!(record.last_seen, Some(only));
    }

    #[test]
    fn record_serializes_with_kebab_case_status() {
        let engine = engine(ScriptedProvider::alive(Vec::new()));
        let record = engine.analyze_lifecycle("new.rs").unwrap();

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("never-tracked"));
        let back: LifecycleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
