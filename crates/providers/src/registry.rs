//! Adapter registry — maps an api kind to the adapter that serves it.
//!
//! The registry is a plain value: build it, register adapters, then share
//! it behind an `Arc`. Tests build their own registries instead of touching
//! shared state.

use std::collections::HashMap;
use std::sync::Arc;

use pico_core::error::ProviderError;
use pico_core::message::Message;
use pico_core::model::Model;
use pico_core::provider::{Adapter, Context};
use tracing::debug;

use crate::http_chat::HttpChatAdapter;
use crate::stub_local::StubLocalAdapter;

/// Routes completion calls to the adapter registered for a model's api.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in adapters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Register an adapter, replacing any adapter for the same api.
    pub fn register(&mut self, adapter: Arc<dyn Adapter>) {
        let api = adapter.api().to_string();
        debug!(api = %api, "Registering adapter");
        self.adapters.insert(api, adapter);
    }

    /// Get the adapter for an api kind.
    pub fn lookup(&self, api: &str) -> Option<Arc<dyn Adapter>> {
        self.adapters.get(api).cloned()
    }

    /// Remove every adapter.
    pub fn clear(&mut self) {
        self.adapters.clear();
    }

    /// Clear, then register the built-ins again.
    pub fn reset_builtins(&mut self) {
        self.clear();
        self.register_builtins();
    }

    /// Registered api kinds, sorted.
    pub fn apis(&self) -> Vec<&str> {
        let mut apis: Vec<&str> = self.adapters.keys().map(|s| s.as_str()).collect();
        apis.sort_unstable();
        apis
    }

    /// Dispatch one completion to the adapter for `model.api`.
    pub async fn complete(
        &self,
        model: &Model,
        context: &Context,
        api_key: Option<&str>,
    ) -> Result<Message, ProviderError> {
        let adapter = self
            .lookup(&model.api)
            .ok_or_else(|| ProviderError::NoAdapterRegistered(model.api.clone()))?;
        adapter.complete(model, context, api_key).await
    }

    fn register_builtins(&mut self) {
        self.register(Arc::new(StubLocalAdapter::new()));
        self.register(Arc::new(HttpChatAdapter::new()));
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("apis", &self.apis())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pico_core::model::{ModelCatalog, OPENAI_CHAT_API, STUB_LOCAL_API};

    struct FixedAdapter(&'static str);

    #[async_trait]
    impl Adapter for FixedAdapter {
        fn api(&self) -> &str {
            OPENAI_CHAT_API
        }

        async fn complete(
            &self,
            _model: &Model,
            _context: &Context,
            _api_key: Option<&str>,
        ) -> Result<Message, ProviderError> {
            Ok(Message::assistant(self.0))
        }
    }

    fn model(provider: &str, id: &str) -> Model {
        ModelCatalog::builtin().get_model(provider, id).unwrap().clone()
    }

    #[test]
    fn builtins_registered() {
        let registry = AdapterRegistry::with_builtins();
        assert_eq!(registry.apis(), vec![OPENAI_CHAT_API, STUB_LOCAL_API]);
        assert!(registry.lookup(STUB_LOCAL_API).is_some());
        assert!(registry.lookup("nonexistent").is_none());
    }

    #[test]
    fn clear_and_reset() {
        let mut registry = AdapterRegistry::with_builtins();
        registry.clear();
        assert!(registry.apis().is_empty());
        registry.reset_builtins();
        assert_eq!(registry.apis().len(), 2);
    }

    #[tokio::test]
    async fn register_replaces_same_api() {
        let mut registry = AdapterRegistry::with_builtins();
        registry.register(Arc::new(FixedAdapter("canned")));
        assert_eq!(registry.apis().len(), 2);

        let ctx = Context::new(vec![Message::user("hi")]);
        let reply = registry
            .complete(&model("openai", "gpt-4o-mini"), &ctx, None)
            .await
            .unwrap();
        assert_eq!(reply.content, "canned");
    }

    #[tokio::test]
    async fn unregistered_api_is_an_error() {
        let registry = AdapterRegistry::new();
        let ctx = Context::new(vec![Message::user("hi")]);
        let err = registry
            .complete(&model("stub", "local-minimal"), &ctx, None)
            .await
            .unwrap_err();
        match err {
            ProviderError::NoAdapterRegistered(api) => assert_eq!(api, STUB_LOCAL_API),
            other => panic!("Expected NoAdapterRegistered, got: {other}"),
        }
    }

    #[tokio::test]
    async fn dispatches_to_stub() {
        let registry = AdapterRegistry::with_builtins();
        let ctx = Context::new(vec![Message::user("hello")]);
        let reply = registry
            .complete(&model("stub", "local-minimal"), &ctx, None)
            .await
            .unwrap();
        assert!(reply.content.contains("(stub response)"));
        assert!(reply.content.contains("hello"));
    }
}
