//! Best-effort git collaborator
//!
//! Revision and workspace-root lookups shell out to `git` and degrade to
//! `None` / the current directory when git is unavailable or the process runs
//! outside a repository. Failures here never surface to callers.

use std::path::{Path, PathBuf};
use std::process::Command;

fn git_output(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Current commit SHA, if inside a git repository
pub fn git_revision() -> Option<String> {
    git_output(&["rev-parse", "HEAD"])
}

/// Workspace root: the git toplevel, falling back to the current directory
pub fn workspace_root() -> PathBuf {
    git_output(&["rev-parse", "--show-toplevel"])
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Convert an absolute path to a path relative to `root`.
///
/// Paths outside the root (or already relative) are returned unchanged.
pub fn to_relative_path(path: &str, root: &Path) -> String {
    match Path::new(path).strip_prefix(root) {
        Ok(relative) => relative.to_string_lossy().into_owned(),
        Err(_) => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_conversion() {
        let root = Path::new("/home/user/project");
        assert_eq!(
            to_relative_path("/home/user/project/src/main.rs", root),
            "src/main.rs"
        );
    }

    #[test]
    fn test_path_outside_root_unchanged() {
        let root = Path::new("/home/user/project");
        assert_eq!(
            to_relative_path("/other/path/file.rs", root),
            "/other/path/file.rs"
        );
    }

    #[test]
    fn test_already_relative_unchanged() {
        let root = Path::new("/home/user/project");
        assert_eq!(to_relative_path("src/main.rs", root), "src/main.rs");
    }

    #[test]
    fn test_workspace_root_never_panics() {
        let root = workspace_root();
        assert!(!root.as_os_str().is_empty());
    }
}
