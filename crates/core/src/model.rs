//! Model records and the read-only model catalog.
//!
//! The catalog is keyed by `(provider, id)` and built once at startup.
//! Extra models can be layered on top of the built-ins before the catalog
//! is shared.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Api kind served by the offline stub adapter.
pub const STUB_LOCAL_API: &str = "stub-local";

/// Api kind served by the OpenAI-compatible chat completions adapter.
pub const OPENAI_CHAT_API: &str = "openai-chat-completions";

/// Metadata for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Model id sent to the provider (e.g., "gpt-4o-mini")
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Provider name (e.g., "openai")
    pub provider: String,

    /// Api kind; selects the adapter
    pub api: String,

    /// Base URL for network adapters
    pub base_url: String,

    #[serde(default)]
    pub reasoning: bool,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

/// Output-token limit for models declared without `max_tokens`.
fn default_max_tokens() -> u32 {
    4096
}

/// Read-only mapping provider → model id → model.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    providers: BTreeMap<String, BTreeMap<String, Model>>,
}

impl ModelCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog shipped with pico.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(Model {
            id: "local-minimal".into(),
            name: "Local Minimal Stub".into(),
            provider: "stub".into(),
            api: STUB_LOCAL_API.into(),
            base_url: "local://stub".into(),
            reasoning: false,
            max_tokens: 2048,
        });
        catalog.insert(Model {
            id: "gpt-4o-mini".into(),
            name: "GPT-4o mini".into(),
            provider: "openai".into(),
            api: OPENAI_CHAT_API.into(),
            base_url: "https://api.openai.com/v1".into(),
            reasoning: false,
            max_tokens: 16384,
        });
        catalog.insert(Model {
            id: "gpt-5-mini".into(),
            name: "GPT-5 mini".into(),
            provider: "openai".into(),
            api: OPENAI_CHAT_API.into(),
            base_url: "https://api.openai.com/v1".into(),
            reasoning: true,
            max_tokens: 16384,
        });
        catalog
    }

    /// Add a model, replacing any model with the same `(provider, id)`.
    pub fn insert(&mut self, model: Model) {
        self.providers
            .entry(model.provider.clone())
            .or_default()
            .insert(model.id.clone(), model);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_model(mut self, model: Model) -> Self {
        self.insert(model);
        self
    }

    /// Provider names, sorted.
    pub fn list_providers(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }

    /// All models for one provider (empty for an unknown provider).
    pub fn list_models(&self, provider: &str) -> Vec<&Model> {
        self.providers
            .get(provider)
            .map(|models| models.values().collect())
            .unwrap_or_default()
    }

    /// Look up one model.
    pub fn get_model(&self, provider: &str, model_id: &str) -> Result<&Model> {
        self.providers
            .get(provider)
            .and_then(|models| models.get(model_id))
            .ok_or_else(|| Error::UnknownModel {
                provider: provider.into(),
                model_id: model_id.into(),
            })
    }

    /// Every model in provider order.
    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.providers.values().flat_map(|models| models.values())
    }
}
