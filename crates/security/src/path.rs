//! Path validation — filesystem sandboxing to the workspace directory.
//!
//! File tools may only touch paths that resolve to the workspace root or
//! somewhere under it. Resolution follows symlinks for every component that
//! exists, and dangling links to their target, so a link pointing outside
//! the workspace is caught.

use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Error returned when path validation fails.
#[derive(Debug, thiserror::Error)]
pub enum PathValidationError {
    #[error("path escapes workspace: {path}")]
    PathEscape { path: String },

    #[error("workspace root '{path}' is unusable: {reason}")]
    Workspace { path: String, reason: String },
}

/// Resolve `raw` relative to `root` and check that it stays inside.
///
/// 1. The root is canonicalized
/// 2. `raw` is joined onto it (an absolute `raw` replaces the root)
/// 3. Components are applied one at a time; each prefix that exists on disk
///    is canonicalized, a dangling symlink is replaced by its target, the
///    rest is applied lexically (`.` dropped, `..` pops)
/// 4. The result must equal the root or be under it
///
/// Returns the resolved path on success. Never clamps.
pub fn resolve_in_workspace(root: &Path, raw: &str) -> Result<PathBuf, PathValidationError> {
    let root = root
        .canonicalize()
        .map_err(|e| PathValidationError::Workspace {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;

    match resolve_lenient(&root.join(raw), MAX_LINK_DEPTH) {
        Some(resolved) if resolved == root || resolved.starts_with(&root) => Ok(resolved),
        resolved => {
            debug!(path = %raw, resolved = ?resolved, "Rejected path outside workspace");
            Err(PathValidationError::PathEscape { path: raw.into() })
        }
    }
}

/// Dangling symlinks followed before giving up (Linux `MAXSYMLINKS`).
const MAX_LINK_DEPTH: usize = 40;

/// Resolve a path that may not exist yet. `None` for a symlink loop.
fn resolve_lenient(path: &Path, depth: usize) -> Option<PathBuf> {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                if let Ok(canonical) = resolved.canonicalize() {
                    resolved = canonical;
                } else if let Ok(target) = std::fs::read_link(&resolved) {
                    // Dangling link: writes would create its target.
                    let depth = depth.checked_sub(1)?;
                    resolved.pop();
                    resolved = resolve_lenient(&resolved.join(target), depth)?;
                }
            }
        }
    }
    Some(resolved)
}
