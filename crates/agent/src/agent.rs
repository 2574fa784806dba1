//! The turn orchestrator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pico_core::error::Result;
use pico_core::event::{Event, EventBus};
use pico_core::message::{Message, Role, Transcript};
use pico_core::model::{Model, ModelCatalog};
use pico_core::provider::{Context, DEFAULT_SYSTEM_PROMPT};
use pico_providers::{AdapterRegistry, Credentials};
use pico_tools::{Routed, route};
use tracing::{debug, info, warn};

/// One agent bound to a workspace and a model.
///
/// Holds the transcript for the conversation. Each [`run_turn`](Self::run_turn)
/// appends exactly one user and one assistant message, or nothing at all if
/// the model call fails.
pub struct Agent {
    /// Root for tool shortcuts
    workspace: PathBuf,

    /// The bound model, validated at construction
    model: Model,

    /// Adapter table used for model turns
    adapters: Arc<AdapterRegistry>,

    /// API key lookup for the bound provider
    credentials: Credentials,

    /// Sent with every model call
    system_prompt: String,

    /// Observers of turn events
    events: Arc<EventBus>,

    transcript: Transcript,
}

impl Agent {
    /// Bind an agent to `(provider, model_id)`. Fails with
    /// `Error::UnknownModel` if the catalog has no such model.
    pub fn new(
        workspace: impl Into<PathBuf>,
        catalog: &ModelCatalog,
        adapters: Arc<AdapterRegistry>,
        provider: &str,
        model_id: &str,
    ) -> Result<Self> {
        let model = catalog.get_model(provider, model_id)?.clone();
        let workspace = workspace.into();
        info!(
            provider = %model.provider,
            model = %model.id,
            api = %model.api,
            workspace = %workspace.display(),
            "Agent ready"
        );

        Ok(Self {
            workspace,
            model,
            adapters,
            credentials: Credentials::new(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            events: Arc::new(EventBus::new()),
            transcript: Transcript::new(),
        })
    }

    /// Share an event bus with the caller.
    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Seed the transcript, e.g. from a loaded session.
    pub fn with_history(mut self, messages: Vec<Message>) -> Self {
        self.transcript = Transcript::from(messages);
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Process one user input and return the assistant reply.
    ///
    /// Tool shortcuts are answered locally and never fail. Anything else
    /// goes to the bound model; on a provider error the user message is
    /// removed again and the error is returned.
    pub async fn run_turn(&mut self, text: &str) -> Result<Message> {
        self.transcript.push(Message::user(text));
        self.events.emit(&Event::message_start(Role::User.as_str(), text));

        if let Routed::Matched(output) = route(&self.workspace, text, &self.events).await {
            debug!("Answered by tool shortcut");
            return Ok(self.finish(Message::assistant(output), true));
        }

        self.events.emit(&Event::llm_start());
        let context = Context::new(self.transcript.messages().to_vec())
            .with_system_prompt(self.system_prompt.clone());
        let api_key = self.credentials.resolve(&self.model.provider);

        debug!(
            model = %self.model.id,
            messages = context.messages.len(),
            "Dispatching model turn"
        );
        let result = self
            .adapters
            .complete(&self.model, &context, api_key.as_deref())
            .await;
        self.events.emit(&Event::llm_end());

        match result {
            Ok(reply) => Ok(self.finish(reply, false)),
            Err(e) => {
                warn!(error = %e, "Model turn failed");
                self.transcript.pop();
                Err(e.into())
            }
        }
    }

    fn finish(&mut self, reply: Message, tool_shortcut: bool) -> Message {
        self.transcript.push(reply.clone());
        self.events
            .emit(&Event::message_end(Role::Assistant.as_str(), tool_shortcut));
        reply
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("workspace", &self.workspace)
            .field("model", &format!("{}/{}", self.model.provider, self.model.id))
            .field("messages", &self.transcript.len())
            .finish()
    }
}
