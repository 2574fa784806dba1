//! Session log — persistent JSON-lines transcript storage.
//!
//! Each line is one `{role, content, timestamp}` message. Writes append a
//! single line; loading replays every line in order. The file is plain text
//! and safe to inspect or edit by hand.

use chrono::Utc;
use pico_core::error::SessionError;
use pico_core::message::Message;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A session file on disk.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Use the session file at `path`. Nothing is touched until the first
    /// append.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A new session in `dir`, named after the current UTC time
    /// (`20261016T120000Z.jsonl`).
    pub fn create_in(dir: &Path) -> Self {
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        Self::open(dir.join(format!("{stamp}.jsonl")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one message, creating the file and its parents if needed.
    pub fn append(&self, message: &Message) -> Result<(), SessionError> {
        let line =
            serde_json::to_string(message).map_err(|e| SessionError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        writeln!(file, "{line}").map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), role = %message.role, "Appended session message");
        Ok(())
    }

    /// Load every message in file order. A missing file is an empty session;
    /// blank lines are skipped; a corrupt line is an error.
    pub fn load(&self) -> Result<Vec<Message>, SessionError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let messages = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str::<Message>(line).map_err(|e| SessionError::Parse {
                    path: self.path.clone(),
                    line: index + 1,
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(path = %self.path.display(), count = messages.len(), "Loaded session");
        Ok(messages)
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
