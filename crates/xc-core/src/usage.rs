//! Best-effort textual usage scan.
//!
//! Finds source files whose import-like lines mention a target file's
//! stem. This is a heuristic over text, not an import-graph analysis; it
//! trades precision for zero build-system knowledge and feeds the
//! `should-this-exist` verdict only.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::source::collect_source_files;

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("target has no usable file stem: {0}")]
    BadTarget(String),

    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Files under `root` whose import/use/include lines reference the stem of
/// `target`. The target itself is excluded from the result.
pub fn find_usages(target: &Path, root: &Path) -> Result<Vec<PathBuf>, UsageError> {
    let stem = target
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| UsageError::BadTarget(target.display().to_string()))?;

    let pattern = reference_pattern(stem)?;
    let canonical_target = std::fs::canonicalize(target).ok();

    let mut hits = Vec::new();
    for path in collect_source_files(root) {
        if let Some(target) = &canonical_target {
            if std::fs::canonicalize(&path).ok().as_ref() == Some(target) {
                continue;
            }
        }

        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        if pattern.is_match(&content) {
            hits.push(path);
        }
    }

    hits.sort();
    Ok(hits)
}

/// Matches common import shapes across the recognized languages: Rust
/// `use`/`mod`, Python/JS `import`/`from`, C/C++ `#include`, and JS
/// `require(...)`.
fn reference_pattern(stem: &str) -> Result<regex::Regex, regex::Error> {
    let stem = regex::escape(stem);
    regex::Regex::new(&format!(
        r#"(?m)^[\t ]*(?:\#[\t ]*include|(?:pub[\t ]+)?(?:use|mod)|import|from)\b[^\r\n]*\b{stem}\b|require\(['"][^'"]*{stem}['"]\)"#
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
