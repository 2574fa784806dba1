//! Adapter trait — the abstraction over completion backends.
//!
//! An adapter implements one api kind: it translates a [`Context`] into a
//! backend request and the backend's answer into one assistant [`Message`].
//!
//! Implementations: offline stub, OpenAI-compatible chat completions.

use async_trait::async_trait;
use crate::error::ProviderError;
use crate::message::Message;
use crate::model::Model;

/// The fixed system prompt sent with every provider call.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are pico, a minimal coding assistant. Be concise, practical, and explicit about tool usage.";

/// Input for one provider call: the ordered conversation plus an optional
/// system prompt. Built fresh for every call.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub messages: Vec<Message>,
    pub system_prompt: Option<String>,
}

impl Context {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn latest_user_text(&self) -> &str {
        crate::message::latest_user_text(&self.messages)
    }
}

/// The core Adapter trait.
///
/// The agent never talks to an adapter directly: it resolves the bound
/// model's api kind through an adapter registry and calls `complete()`
/// without knowing which backend answers.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// The api kind this adapter serves (e.g., "stub-local").
    fn api(&self) -> &str;

    /// Produce one assistant message for the given context.
    async fn complete(
        &self,
        model: &Model,
        context: &Context,
        api_key: Option<&str>,
    ) -> std::result::Result<Message, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    struct EchoAdapter;

    #[async_trait]
    impl Adapter for EchoAdapter {
        fn api(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            _model: &Model,
            context: &Context,
            _api_key: Option<&str>,
        ) -> std::result::Result<Message, ProviderError> {
            Ok(Message::assistant(context.latest_user_text()))
        }
    }

    #[test]
    fn context_builder() {
        let ctx = Context::new(vec![Message::user("hi")]).with_system_prompt("rules");
        assert_eq!(ctx.system_prompt.as_deref(), Some("rules"));
        assert_eq!(ctx.latest_user_text(), "hi");
    }

    #[tokio::test]
    async fn adapter_trait_object() {
        let adapter: Box<dyn Adapter> = Box::new(EchoAdapter);
        let model = crate::model::ModelCatalog::builtin()
            .get_model("stub", "local-minimal")
            .unwrap()
            .clone();
        let ctx = Context::new(vec![Message::user("ping")]);
        let reply = adapter.complete(&model, &ctx, None).await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "ping");
        assert_eq!(adapter.api(), "echo");
    }
}
