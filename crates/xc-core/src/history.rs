use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when querying version-control history.
///
/// Returned by implementations of [`HistoryProvider`]. The `NotFound`
/// variant is load-bearing: it is the signal the relic engine uses to
/// recognise a deleted path, and it must never be collapsed into the
/// generic `Command` variant.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The path does not exist in the tree of the queried revision.
    ///
    /// This is a legitimate answer to `read_at_revision`, not a transport
    /// failure. Callers treat it as "the path was deleted by (or before)
    /// that revision".
    #[error("path not found at revision: {0}")]
    NotFound(String),

    /// A git query failed: not a repository, bad revision, corrupted
    /// store, or the git binary is missing. The underlying message is
    /// preserved verbatim.
    #[error("git command failed: {0}")]
    Command(String),

    /// Failed to read from or write to the filesystem while querying.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Git output contained invalid UTF-8.
    #[error("utf8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// One historical revision touching a path.
///
/// Immutable once retrieved. Serializable because bounded commit lists are
/// embedded as JSON into assistant prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full revision hash.
    pub id: String,
    /// Commit time, seconds since the epoch.
    pub timestamp: i64,
    pub author: String,
    /// Summary line of the commit message.
    pub message: String,
}

impl Commit {
    /// Abbreviated hash for display.
    pub fn short_id(&self) -> &str {
        let end = self.id.len().min(7);
        &self.id[..end]
    }
}

// ---------------------------------------------------------------------------
// HistoryProvider trait
// ---------------------------------------------------------------------------

/// Read-only history queries over a repository's revision graph.
///
/// This is the single capability the relic engine consumes. It is passed in
/// explicitly (never held as process-global state) so tests can substitute
/// scripted doubles. Implementations must be read-safe for concurrent
/// queries; both implementations here are stateless and open the repository
/// fresh on every call.
pub trait HistoryProvider: Send + Sync {
    /// Full or bounded commit history for `path`, newest-first (index 0 is
    /// the latest revision). An empty vector means the path has no history;
    /// that is an answer, not an error. Errors when `workdir` is not inside
    /// a repository.
    fn log(
        &self,
        workdir: &Path,
        path: &str,
        max_entries: Option<usize>,
    ) -> Result<Vec<Commit>, HistoryError>;

    /// Content of `path` as of `revision`. Fails with
    /// [`HistoryError::NotFound`] when the path is absent from that
    /// revision's tree; any other failure is a distinct error.
    fn read_at_revision(
        &self,
        workdir: &Path,
        revision: &str,
        path: &str,
    ) -> Result<String, HistoryError>;

    /// Paths touched by a single revision relative to its parent,
    /// order-preserving.
    fn diff_name_only(&self, workdir: &Path, revision: &str) -> Result<Vec<String>, HistoryError>;

    /// The patch text one revision introduced for one path. Enrichment for
    /// the blame prompt only; never consulted by the relic engine.
    fn show_patch(
        &self,
        workdir: &Path,
        revision: &str,
        path: &str,
    ) -> Result<String, HistoryError>;
}

// ---------------------------------------------------------------------------
// Shell provider
// ---------------------------------------------------------------------------

/// History provider that shells out to the `git` binary.
///
/// Baseline implementation, always available. Read-path queries prefer the
/// in-process [`crate::git2_history::Git2HistoryProvider`] when the
/// `libgit2` feature is enabled.
pub struct ShellHistoryProvider;

/// Log format: hash, commit time, author name, subject, separated by the
/// ASCII unit separator so subjects containing spaces survive parsing.
const LOG_FORMAT: &str = "%H%x1f%ct%x1f%an%x1f%s";

impl ShellHistoryProvider {
    fn run_git(workdir: &Path, args: &[&str]) -> Result<String, HistoryError> {
        let output = Command::new("git")
            .current_dir(workdir)
            .args(args)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8(output.stderr)
                .unwrap_or_else(|_| "git returned non-utf8 stderr".to_string());
            return Err(HistoryError::Command(stderr.trim().to_string()));
        }

        Ok(String::from_utf8(output.stdout)?)
    }

    fn parse_log_line(line: &str) -> Result<Commit, HistoryError> {
        let mut fields = line.splitn(4, '\u{1f}');
        let (Some(id), Some(ts), Some(author), Some(message)) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            return Err(HistoryError::Command(format!(
                "unexpected git log output: {line}"
            )));
        };

        let timestamp = ts.parse::<i64>().map_err(|_| {
            HistoryError::Command(format!("unexpected git log timestamp: {ts}"))
        })?;

        Ok(Commit {
            id: id.to_string(),
            timestamp,
            author: author.to_string(),
            message: message.to_string(),
        })
    }
}

impl HistoryProvider for ShellHistoryProvider {
    fn log(
        &self,
        workdir: &Path,
        path: &str,
        max_entries: Option<usize>,
    ) -> Result<Vec<Commit>, HistoryError> {
        let format = format!("--format={LOG_FORMAT}");
        let limit = max_entries.map(|n| n.to_string());

        let mut args = vec!["log", format.as_str()];
        if let Some(limit) = limit.as_deref() {
            args.push("-n");
            args.push(limit);
        }
        args.push("--");
        args.push(path);

        let out = Self::run_git(workdir, &args)?;
        out.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(Self::parse_log_line)
            .collect()
    }

    fn read_at_revision(
        &self,
        workdir: &Path,
        revision: &str,
        path: &str,
    ) -> Result<String, HistoryError> {
        let spec = format!("{revision}:{path}");
        let output = Command::new("git")
            .current_dir(workdir)
            // Stable (untranslated) error prose; the NotFound check below
            // matches on it.
            .env("LC_ALL", "C")
            .args(["show", &spec])
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            // git distinguishes "path missing from that tree" only in prose.
            if stderr.contains("does not exist in")
                || stderr.contains("exists on disk, but not in")
            {
                return Err(HistoryError::NotFound(path.to_string()));
            }
            return Err(HistoryError::Command(stderr));
        }

        Ok(String::from_utf8(output.stdout)?)
    }

    fn diff_name_only(&self, workdir: &Path, revision: &str) -> Result<Vec<String>, HistoryError> {
        let out = Self::run_git(
            workdir,
            &[
                "diff-tree",
                "--no-commit-id",
                "--name-only",
                "-r",
                "--root",
                revision,
            ],
        )?;

        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToOwned::to_owned)
            .collect())
    }

    fn show_patch(
        &self,
        workdir: &Path,
        revision: &str,
        path: &str,
    ) -> Result<String, HistoryError> {
        Self::run_git(workdir, &["show", revision, "--", path])
    }
}

// ---------------------------------------------------------------------------
// Default provider selection
// ---------------------------------------------------------------------------

/// Create the best available history provider for the current build.
///
/// Returns the libgit2-backed provider when the `libgit2` feature is
/// enabled, otherwise the shell provider.
pub fn default_provider() -> Box<dyn HistoryProvider> {
    #[cfg(feature = "libgit2")]
    {
        Box::new(crate::git2_history::Git2HistoryProvider)
    }
    #[cfg(not(feature = "libgit2"))]
    {
        Box::new(ShellHistoryProvider)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
