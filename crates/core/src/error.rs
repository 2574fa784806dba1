//! Error types for the pico domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all pico operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The (provider, model id) pair is not in the catalog.
    #[error("unknown model '{provider}/{model_id}'")]
    UnknownModel { provider: String, model_id: String },

    // --- Provider errors ---
    #[error(transparent)]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error(transparent)]
    Tool(#[from] ToolError),

    // --- Session errors ---
    #[error(transparent)]
    Session(#[from] SessionError),

    // --- Serialization ---
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("missing {env_var} for provider '{provider}'")]
    MissingCredential { provider: String, env_var: String },

    #[error("no adapter registered for api '{0}'")]
    NoAdapterRegistered(String),

    #[error("http error {status_code}: {message}")]
    Http { status_code: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("path escapes workspace: {path}")]
    PathEscape { path: String },

    #[error("file not found: {path}")]
    NotFound { path: String },

    #[error("io error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to spawn '{command}': {reason}")]
    Spawn { command: String, reason: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt session line {line} in {path}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("failed to encode session entry: {0}")]
    Serialize(String),
}
