//! File write tool — create or overwrite a UTF-8 file inside the workspace.

use pico_core::error::ToolError;
use std::path::Path;
use tracing::debug;

use crate::sandboxed;

/// Usage text returned for a malformed `/write`.
pub const WRITE_USAGE: &str = "usage: /write <path> <text>";

/// Split `/write` arguments shell-style into `(path, content)`.
///
/// Quoted text stays one word; the content is every word after the path
/// joined by single spaces. Returns `None` when there is no content word or
/// the quoting is unbalanced.
pub fn split_write_args(args: &str) -> Option<(String, String)> {
    let words = shell_words::split(args).ok()?;
    let (path, rest) = words.split_first()?;
    if rest.is_empty() {
        return None;
    }
    Some((path.clone(), rest.join(" ")))
}

/// Write `content` to `raw` (relative to `workspace`), creating parent
/// directories. Returns `wrote <n> chars to <resolved path>`.
pub async fn write_file(workspace: &Path, raw: &str, content: &str) -> Result<String, ToolError> {
    let path = sandboxed(workspace, raw)?;
    let io_err = |e: std::io::Error| ToolError::Io {
        path: raw.into(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(&path, content).await.map_err(io_err)?;

    let chars = content.chars().count();
    debug!(path = %path.display(), chars, "Wrote file");
    Ok(format!("wrote {chars} chars to {}", path.display()))
}
