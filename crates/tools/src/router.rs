//! Shortcut router — recognizes `/read`, `/write`, `/bash` and `/time`.
//!
//! Parsing is pure; [`route`] executes the recognized tool. Tool failures
//! are rendered as `error: <message>` text and never leave the router.

use pico_core::event::EventBus;
use std::path::Path;
use tracing::debug;

use crate::{file_read, file_write, shell, time};

/// Usage text for an empty `/read`.
pub const READ_USAGE: &str = "usage: /read <path>";

/// Usage text for an empty `/bash`.
pub const BASH_USAGE: &str = "usage: /bash <command>";

/// A recognized tool shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortcut {
    Time,
    Read { path: String },
    Write { args: String },
    Bash { command: String },
}

impl Shortcut {
    /// Recognize a shortcut. Prefixes are case-sensitive and checked in
    /// order: `/time` (whole input), `/read `, `/write `, `/bash `.
    pub fn parse(text: &str) -> Option<Self> {
        if text.trim() == "/time" {
            return Some(Self::Time);
        }
        if let Some(rest) = text.strip_prefix("/read ") {
            return Some(Self::Read {
                path: rest.trim().into(),
            });
        }
        if let Some(rest) = text.strip_prefix("/write ") {
            return Some(Self::Write { args: rest.into() });
        }
        if let Some(rest) = text.strip_prefix("/bash ") {
            return Some(Self::Bash {
                command: rest.trim().into(),
            });
        }
        None
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Read { .. } => "read",
            Self::Write { .. } => "write",
            Self::Bash { .. } => "bash",
        }
    }
}

/// Outcome of routing one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    /// A shortcut ran; this is its text result.
    Matched(String),
    /// Not a shortcut; the input goes to the model.
    NoMatch,
}

impl Routed {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    pub fn into_output(self) -> Option<String> {
        match self {
            Self::Matched(out) => Some(out),
            Self::NoMatch => None,
        }
    }
}

/// Route `text`, executing the shortcut it names inside `workspace`.
pub async fn route(workspace: &Path, text: &str, bus: &EventBus) -> Routed {
    let Some(shortcut) = Shortcut::parse(text) else {
        return Routed::NoMatch;
    };
    debug!(tool = shortcut.name(), "Routing tool shortcut");

    let result = match shortcut {
        Shortcut::Time => Ok(time::utc_now()),
        Shortcut::Read { path } if path.is_empty() => Ok(READ_USAGE.into()),
        Shortcut::Read { path } => file_read::read_file(workspace, &path).await,
        Shortcut::Write { args } => match file_write::split_write_args(&args) {
            Some((path, content)) => file_write::write_file(workspace, &path, &content).await,
            None => Ok(file_write::WRITE_USAGE.into()),
        },
        Shortcut::Bash { command } if command.is_empty() => Ok(BASH_USAGE.into()),
        Shortcut::Bash { command } => shell::run_bash(workspace, &command, bus).await,
    };

    Routed::Matched(result.unwrap_or_else(|e| {
        debug!(error = %e, "Tool shortcut failed");
        format!("error: {e}")
    }))
}
