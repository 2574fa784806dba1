//! Built-in tool shortcuts for pico.
//!
//! Four tools, each reachable through a slash shortcut:
//! read a file, write a file, run a shell command, and tell the time.
//! File paths are sandboxed to the workspace root.

pub mod file_read;
pub mod file_write;
pub mod router;
pub mod shell;
pub mod time;

pub use router::{Routed, Shortcut, route};

use pico_core::error::ToolError;
use pico_security::{PathValidationError, resolve_in_workspace};
use std::path::{Path, PathBuf};

/// Resolve a tool path inside the workspace.
pub(crate) fn sandboxed(workspace: &Path, raw: &str) -> Result<PathBuf, ToolError> {
    resolve_in_workspace(workspace, raw).map_err(|e| match e {
        PathValidationError::PathEscape { path } => ToolError::PathEscape { path },
        PathValidationError::Workspace { path, reason } => ToolError::Io { path, reason },
    })
}
