//! Source-tree reading for prompt building.
//!
//! Produces one concatenated text blob from a file or directory target.
//! The blob is consumed as opaque text by the prompt builder; nothing in
//! here is consulted by the relic engine.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("path does not exist: {0}")]
    NotFound(String),

    #[error("unsupported file type: {0}")]
    Unsupported(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extensions treated as source code when slurping a directory.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "ts", "js", "py", "java", "c", "cpp", "h", "hpp", "go",
];

/// Project-description files prepended to a directory blob when present.
const PREAMBLE_FILES: &[&str] = &[
    "README.md",
    "Cargo.toml",
    "package.json",
    "pyproject.toml",
    "go.mod",
];

/// Directories that are never worth slurping.
const SKIP_DIRS: &[&str] = &["node_modules", "target", "vendor", "dist", "build"];

/// Read a target into a single text blob.
///
/// A file yields its contents. A directory yields README/manifest content
/// followed by every recognized source file under it, each preceded by a
/// `// FILE: <path>` boundary marker. Hidden entries, gitignored entries,
/// and dependency/build directories are skipped. Files that cannot be read
/// degrade to a placeholder marker instead of failing the walk.
pub fn read_target(target: &Path) -> Result<String, SourceError> {
    let meta = std::fs::metadata(target).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound(target.display().to_string())
        } else {
            SourceError::Io(e)
        }
    })?;

    if meta.is_file() {
        return Ok(read_lossy(target)?);
    }
    if meta.is_dir() {
        return read_tree(target);
    }
    Err(SourceError::Unsupported(target.display().to_string()))
}

fn read_tree(root: &Path) -> Result<String, SourceError> {
    let mut blob = String::new();

    for name in PREAMBLE_FILES {
        let candidate = root.join(name);
        if candidate.is_file() {
            if let Ok(content) = read_lossy(&candidate) {
                blob.push_str(&content);
                blob.push('\n');
            }
        }
    }

    // Deterministic ordering: collect, sort, then read.
    let mut files = collect_source_files(root);
    files.sort();

    for path in files {
        blob.push_str(&format!("\n\n// FILE: {}\n", path.display()));
        match read_lossy(&path) {
            Ok(content) => blob.push_str(&content),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
                blob.push_str("// could not read file (permission or binary)\n");
            }
        }
    }

    Ok(blob)
}

/// Recognized source files under `root`, honouring gitignore and skipping
/// hidden and dependency directories.
pub fn collect_source_files(root: &Path) -> Vec<PathBuf> {
    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(true)
        .filter_entry(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| !SKIP_DIRS.contains(&name))
                .unwrap_or(true)
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "walk error");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if is_source_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files
}

pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn read_lossy(path: &Path) -> Result<String, std::io::Error> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
