//! Offline stub adapter for development and demos.
//!
//! Deterministic: the reply depends only on the latest user message. No
//! network, no environment reads.

use async_trait::async_trait;
use pico_core::error::ProviderError;
use pico_core::message::Message;
use pico_core::model::{Model, STUB_LOCAL_API};
use pico_core::provider::{Adapter, Context, DEFAULT_SYSTEM_PROMPT};

/// Adapter for the `stub-local` api kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubLocalAdapter;

impl StubLocalAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// The canned stub reply for `user_text`.
pub fn stub_reply(user_text: &str) -> String {
    format!(
        "{DEFAULT_SYSTEM_PROMPT}\n\n(stub response)\nYou said: {user_text}\n\
         Tool shortcuts: /read <path>, /write <path> <text>, /bash <command>, /time"
    )
}

#[async_trait]
impl Adapter for StubLocalAdapter {
    fn api(&self) -> &str {
        STUB_LOCAL_API
    }

    async fn complete(
        &self,
        _model: &Model,
        context: &Context,
        _api_key: Option<&str>,
    ) -> std::result::Result<Message, ProviderError> {
        Ok(Message::assistant(stub_reply(context.latest_user_text())))
    }
}
