//! Configuration loading, validation, and management for pico.
//!
//! Loads configuration from `<cwd>/.pico/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use pico_core::model::{Model, ModelCatalog};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Directory (relative to the working directory) holding pico state.
pub const STATE_DIR: &str = ".pico";

/// The root configuration structure.
///
/// Maps directly to `.pico/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root for file and shell tools (relative paths are resolved
    /// against the directory the config was loaded for)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>,

    /// Where session files are written (default: `<workspace>/.pico/sessions`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions_dir: Option<PathBuf>,

    /// Default provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model id
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Provider-specific settings
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Extra catalog entries layered over the built-in models
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<Model>,

    /// Directory the relative paths above are resolved against
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_provider() -> String {
    "stub".into()
}
fn default_model() -> String {
    "local-minimal".into()
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key; takes precedence over the provider's environment variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("workspace", &self.workspace)
            .field("sessions_dir", &self.sessions_dir)
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("providers", &self.providers)
            .field("models", &self.models)
            .field("base_dir", &self.base_dir)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

impl AppConfig {
    /// Load configuration for a working directory.
    ///
    /// Reads `<cwd>/.pico/config.toml` when present, then applies
    /// environment overrides:
    /// - `PICO_PROVIDER`
    /// - `PICO_MODEL`
    /// - `PICO_WORKSPACE`
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_path = Self::config_path(cwd);
        let mut config = Self::load_from(&config_path)?;
        config.base_dir = cwd.to_path_buf();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // `.pico/config.toml` sits two levels below the directory it configures
        if let Some(base) = path.parent().and_then(Path::parent) {
            config.base_dir = base.to_path_buf();
        }

        config.validate()?;
        Ok(config)
    }

    /// `<cwd>/.pico/config.toml`
    pub fn config_path(cwd: &Path) -> PathBuf {
        cwd.join(STATE_DIR).join("config.toml")
    }

    /// Apply `PICO_*` overrides using the given variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(provider) = lookup("PICO_PROVIDER").filter(|v| !v.is_empty()) {
            self.default_provider = provider;
        }
        if let Some(model) = lookup("PICO_MODEL").filter(|v| !v.is_empty()) {
            self.default_model = model;
        }
        if let Some(workspace) = lookup("PICO_WORKSPACE").filter(|v| !v.is_empty()) {
            self.workspace = Some(PathBuf::from(workspace));
        }
    }

    /// Resolved workspace root.
    pub fn workspace_dir(&self) -> PathBuf {
        match &self.workspace {
            Some(dir) => self.base_dir.join(dir),
            None => self.base_dir.clone(),
        }
    }

    /// Resolved session directory.
    pub fn sessions_dir(&self) -> PathBuf {
        match &self.sessions_dir {
            Some(dir) => self.base_dir.join(dir),
            None => self.workspace_dir().join(STATE_DIR).join("sessions"),
        }
    }

    /// Create the session directory if it does not exist.
    pub fn ensure_sessions_dir(&self) -> Result<PathBuf, ConfigError> {
        let dir = self.sessions_dir();
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::Io {
            path: dir.clone(),
            reason: e.to_string(),
        })?;
        Ok(dir)
    }

    /// Built-in catalog plus the models declared in this config.
    pub fn catalog(&self) -> ModelCatalog {
        self.models
            .iter()
            .cloned()
            .fold(ModelCatalog::builtin(), ModelCatalog::with_model)
    }

    /// Configured API keys, keyed by provider.
    pub fn api_keys(&self) -> HashMap<String, String> {
        self.providers
            .iter()
            .filter_map(|(name, p)| {
                p.api_key
                    .as_ref()
                    .filter(|k| !k.is_empty())
                    .map(|k| (name.clone(), k.clone()))
            })
            .collect()
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_provider.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "default_provider must not be empty".into(),
            ));
        }

        if self.default_model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "default_model must not be empty".into(),
            ));
        }

        for model in &self.models {
            if model.id.is_empty() || model.provider.is_empty() || model.api.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "model '{}/{}' needs a non-empty id, provider and api",
                    model.provider, model.id
                )));
            }
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: None,
            sessions_dir: None,
            default_provider: default_provider(),
            default_model: default_model(),
            providers: HashMap::new(),
            models: Vec::new(),
            base_dir: PathBuf::from("."),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Failed to prepare {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}
