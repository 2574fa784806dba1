//! File read tool — read a UTF-8 file from inside the workspace.

use pico_core::error::ToolError;
use std::path::Path;
use tracing::debug;

use crate::sandboxed;

/// Read the file at `raw` (relative to `workspace`) as UTF-8 text.
pub async fn read_file(workspace: &Path, raw: &str) -> Result<String, ToolError> {
    let path = sandboxed(workspace, raw)?;
    debug!(path = %path.display(), "Reading file");

    tokio::fs::read_to_string(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ToolError::NotFound { path: raw.into() }
        } else {
            ToolError::Io {
                path: raw.into(),
                reason: e.to_string(),
            }
        }
    })
}
