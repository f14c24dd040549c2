//! Remote repository acquisition.
//!
//! Materializes a temporary local checkout for `owner/repo[:subpath]`
//! targets. The checkout lives in a [`tempfile::TempDir`], so removal
//! happens in `Drop` — exactly once, on success, handled failure, and
//! unwind alike.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// `git clone` returned a non-zero exit code (network failure, unknown
    /// repository, auth). Stderr is captured in the message.
    #[error("clone failed: {0}")]
    CloneFailed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// RemoteSpec
// ---------------------------------------------------------------------------

/// A `owner/repo[:subpath]` target.
///
/// Parsing is shape-only; whether a target string should be treated as a
/// remote spec at all is the caller's decision (an existing local path
/// always wins over a spec-shaped string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSpec {
    pub owner: String,
    pub repo: String,
    pub subpath: Option<String>,
}

fn spec_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)(?::(.+))?$")
            .expect("remote spec pattern is valid")
    })
}

impl RemoteSpec {
    pub fn parse(input: &str) -> Option<Self> {
        let captures = spec_pattern().captures(input)?;
        Some(Self {
            owner: captures[1].to_string(),
            repo: captures[2].to_string(),
            subpath: captures.get(3).map(|m| m.as_str().to_string()),
        })
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.repo)
    }
}

impl std::fmt::Display for RemoteSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.subpath {
            Some(subpath) => write!(f, "{}:{}", self.slug(), subpath),
            None => write!(f, "{}", self.slug()),
        }
    }
}

// ---------------------------------------------------------------------------
// TempCheckout
// ---------------------------------------------------------------------------

/// A shallow clone of a remote repository in a temporary directory.
///
/// The directory is deleted when the value is dropped.
#[derive(Debug)]
pub struct TempCheckout {
    spec: RemoteSpec,
    dir: tempfile::TempDir,
}

impl TempCheckout {
    /// Shallow-clone `spec` from GitHub into a fresh temporary directory.
    pub fn clone_shallow(spec: RemoteSpec) -> Result<Self, RemoteError> {
        let url = spec.url();
        Self::clone_from(spec, &url)
    }

    fn clone_from(spec: RemoteSpec, url: &str) -> Result<Self, RemoteError> {
        let dir = tempfile::Builder::new().prefix("excavate-").tempdir()?;
        tracing::info!(spec = %spec, dir = %dir.path().display(), "cloning remote target");

        let output = Command::new("git")
            .args(["clone", "--depth", "1", url])
            .arg(dir.path())
            .output()?;

        if !output.status.success() {
            // `dir` drops here, removing the partial clone.
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RemoteError::CloneFailed(stderr));
        }

        Ok(Self { spec, dir })
    }

    pub fn spec(&self) -> &RemoteSpec {
        &self.spec
    }

    /// Root of the checkout.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The analysis target inside the checkout: the subpath when one was
    /// given, the checkout root otherwise.
    pub fn target_dir(&self) -> PathBuf {
        match &self.spec.subpath {
            Some(subpath) => self.dir.path().join(subpath),
            None => self.dir.path().to_path_buf(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
