//! Shared fixture-repository helpers for unit tests.

use std::path::Path;

/// Run a git command in `dir`, panicking with stderr on failure.
pub fn run_git(dir: &Path, args: &[&str]) {
    let out = std::process::Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("git command should run");
    assert!(
        out.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
}

/// Build a repository exercising every lifecycle state:
///
/// - commit 1 adds `kept.txt` and `doomed.txt`
/// - commit 2 updates `kept.txt`
/// - commit 3 deletes `doomed.txt` and adds `sibling.txt` in the same commit
///
/// Leaves `kept.txt` alive at HEAD, `doomed.txt` deleted with a related
/// sibling path, and any other name never tracked.
pub fn init_lifecycle_repo() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path();

    run_git(root, &["init"]);
    run_git(root, &["config", "user.email", "dev@example.com"]);
    run_git(root, &["config", "user.name", "Excavate Dev"]);

    std::fs::write(root.join("kept.txt"), "kept v1\n").expect("write kept");
    std::fs::write(root.join("doomed.txt"), "doomed\n").expect("write doomed");
    run_git(root, &["add", "kept.txt", "doomed.txt"]);
    run_git(root, &["commit", "-m", "add kept and doomed"]);
    run_git(root, &["branch", "-M", "main"]);

    std::fs::write(root.join("kept.txt"), "kept v2\n").expect("update kept");
    run_git(root, &["add", "kept.txt"]);
    run_git(root, &["commit", "-m", "update kept"]);

    std::fs::write(root.join("sibling.txt"), "sibling\n").expect("write sibling");
    run_git(root, &["rm", "doomed.txt"]);
    run_git(root, &["add", "sibling.txt"]);
    run_git(root, &["commit", "-m", "remove doomed"]);

    tmp
}
