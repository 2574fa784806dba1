//! OpenAI-compatible chat completions adapter.
//!
//! Works with OpenAI and any endpoint exposing `/chat/completions` with the
//! same request and response shape (OpenRouter, Ollama, vLLM, ...).
//! One non-streaming request per call, no retries.

use async_trait::async_trait;
use pico_core::error::ProviderError;
use pico_core::message::{Message, Role};
use pico_core::model::{Model, OPENAI_CHAT_API};
use pico_core::provider::{Adapter, Context};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::credentials::env_var_for;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Adapter for the `openai-chat-completions` api kind.
pub struct HttpChatAdapter {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpChatAdapter {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-request timeout (60 s by default).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// System prompt first (when non-empty), then user and assistant
    /// messages; other roles are dropped.
    fn to_api_messages(context: &Context) -> Vec<ApiMessage<'_>> {
        let system = context
            .system_prompt
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| ApiMessage {
                role: Role::System.as_str(),
                content: p,
            });

        let transcript = context
            .messages
            .iter()
            .filter(|m| matches!(m.role, Role::User | Role::Assistant))
            .map(|m| ApiMessage {
                role: m.role.as_str(),
                content: &m.content,
            });

        system.into_iter().chain(transcript).collect()
    }

    fn request_error(e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

impl Default for HttpChatAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HttpChatAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChatAdapter")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl Adapter for HttpChatAdapter {
    fn api(&self) -> &str {
        OPENAI_CHAT_API
    }

    async fn complete(
        &self,
        model: &Model,
        context: &Context,
        api_key: Option<&str>,
    ) -> std::result::Result<Message, ProviderError> {
        let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
            return Err(ProviderError::MissingCredential {
                provider: model.provider.clone(),
                env_var: env_var_for(&model.provider).unwrap_or_else(|| "API key".into()),
            });
        };

        let url = format!("{}/chat/completions", model.base_url.trim_end_matches('/'));
        let body = ApiRequest {
            model: &model.id,
            messages: Self::to_api_messages(context),
        };

        debug!(provider = %model.provider, model = %model.id, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(Self::request_error)?;

        let status = response.status();
        let text = response.text().await.map_err(Self::request_error)?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %text, "Provider returned error");
            return Err(ProviderError::Http {
                status_code: status.as_u16(),
                message: text,
            });
        }

        let parsed: ApiResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let Some(choice) = parsed.choices.unwrap_or_default().into_iter().next() else {
            return Ok(Message::assistant(format!(
                "(empty model response)\nYou said: {}",
                context.latest_user_text()
            )));
        };

        let content = choice
            .message
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "(empty text response)".into());

        Ok(Message::assistant(content))
    }
}

// --- OpenAI API types ---

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Option<Vec<ApiChoice>>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    #[serde(default)]
    message: Option<ApiResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
