//! End-to-end turn tests: routing, model dispatch, events and persistence.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pico_agent::Agent;
use pico_core::error::{Error, ProviderError};
use pico_core::event::{Event, EventBus, EventKind};
use pico_core::message::{Message, Role};
use pico_core::model::{Model, ModelCatalog, OPENAI_CHAT_API, STUB_LOCAL_API};
use pico_core::provider::{Adapter, Context, DEFAULT_SYSTEM_PROMPT};
use pico_providers::{AdapterRegistry, Credentials, StubLocalAdapter};
use pico_session::SessionStore;

/// Answers any api kind with the stub reply and records what it was sent.
struct RecordingAdapter {
    api: &'static str,
    calls: AtomicUsize,
    last_context: Mutex<Option<Context>>,
}

impl RecordingAdapter {
    fn new(api: &'static str) -> Arc<Self> {
        Arc::new(Self {
            api,
            calls: AtomicUsize::new(0),
            last_context: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Adapter for RecordingAdapter {
    fn api(&self) -> &str {
        self.api
    }

    async fn complete(
        &self,
        model: &Model,
        context: &Context,
        api_key: Option<&str>,
    ) -> Result<Message, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_context.lock().unwrap() = Some(context.clone());
        StubLocalAdapter.complete(model, context, api_key).await
    }
}

fn stub_agent(dir: &std::path::Path) -> Agent {
    Agent::new(
        dir,
        &ModelCatalog::builtin(),
        Arc::new(AdapterRegistry::with_builtins()),
        "stub",
        "local-minimal",
    )
    .unwrap()
}

fn record_events(agent: &Agent) -> Arc<Mutex<Vec<Event>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    agent
        .events()
        .subscribe(Arc::new(move |e: &Event| sink.lock().unwrap().push(e.clone())));
    seen
}

fn kinds(events: &Mutex<Vec<Event>>) -> Vec<EventKind> {
    events.lock().unwrap().iter().map(|e| e.kind).collect()
}

#[tokio::test]
async fn time_shortcut_returns_iso_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let mut agent = stub_agent(dir.path());

    let reply = agent.run_turn("/time").await.unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert!(reply.content.contains('T'));
    assert!(chrono::DateTime::parse_from_rfc3339(&reply.content).is_ok());
}

#[tokio::test]
async fn write_then_read_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let mut agent = stub_agent(dir.path());

    let wrote = agent.run_turn("/write a.txt hello").await.unwrap();
    assert!(wrote.content.starts_with("wrote 5 chars to "));

    let read = agent.run_turn("/read a.txt").await.unwrap();
    assert_eq!(read.content, "hello");
    assert_eq!(agent.transcript().len(), 4);
}

#[cfg(unix)]
#[tokio::test]
async fn bash_shortcut_trims_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut agent = stub_agent(dir.path());

    let reply = agent.run_turn("/bash echo hi").await.unwrap();
    assert_eq!(reply.content, "hi");
}

#[tokio::test]
async fn stub_turn_echoes_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut agent = stub_agent(dir.path());

    let reply = agent.run_turn("hello").await.unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert!(reply.content.contains("(stub response)"));
    assert!(reply.content.contains("hello"));
}

#[tokio::test]
async fn unknown_model_fails_construction() {
    let err = Agent::new(
        ".",
        &ModelCatalog::builtin(),
        Arc::new(AdapterRegistry::with_builtins()),
        "stub",
        "does-not-exist",
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnknownModel { .. }));
}

#[tokio::test]
async fn every_catalog_model_completes_a_turn() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = ModelCatalog::builtin();
    let mut registry = AdapterRegistry::with_builtins();
    registry.register(RecordingAdapter::new(OPENAI_CHAT_API));
    let registry = Arc::new(registry);

    for model in catalog.iter() {
        let mut agent = Agent::new(
            dir.path(),
            &catalog,
            Arc::clone(&registry),
            &model.provider,
            &model.id,
        )
        .unwrap();
        let reply = agent.run_turn("ping").await.unwrap();
        assert_eq!(reply.role, Role::Assistant, "model {}", model.id);
    }
}

#[tokio::test]
async fn plain_text_goes_to_the_model_with_full_context() {
    let dir = tempfile::tempdir().unwrap();
    let adapter = RecordingAdapter::new(STUB_LOCAL_API);
    let mut registry = AdapterRegistry::new();
    registry.register(adapter.clone());

    let mut agent = Agent::new(
        dir.path(),
        &ModelCatalog::builtin(),
        Arc::new(registry),
        "stub",
        "local-minimal",
    )
    .unwrap();

    agent.run_turn("/time").await.unwrap();
    assert_eq!(adapter.calls(), 0);

    agent.run_turn("explain the time").await.unwrap();
    assert_eq!(adapter.calls(), 1);

    let context = adapter.last_context.lock().unwrap().clone().unwrap();
    assert_eq!(context.system_prompt.as_deref(), Some(DEFAULT_SYSTEM_PROMPT));
    assert_eq!(context.messages.len(), 3);
    assert_eq!(context.latest_user_text(), "explain the time");
}

#[tokio::test]
async fn custom_system_prompt_is_sent() {
    let dir = tempfile::tempdir().unwrap();
    let adapter = RecordingAdapter::new(STUB_LOCAL_API);
    let mut registry = AdapterRegistry::new();
    registry.register(adapter.clone());

    let mut agent = Agent::new(
        dir.path(),
        &ModelCatalog::builtin(),
        Arc::new(registry),
        "stub",
        "local-minimal",
    )
    .unwrap()
    .with_system_prompt("answer in haiku");

    agent.run_turn("hi").await.unwrap();
    let context = adapter.last_context.lock().unwrap().clone().unwrap();
    assert_eq!(context.system_prompt.as_deref(), Some("answer in haiku"));
}

#[tokio::test]
async fn sandbox_escape_is_text_and_skips_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let adapter = RecordingAdapter::new(STUB_LOCAL_API);
    let mut registry = AdapterRegistry::new();
    registry.register(adapter.clone());

    let mut agent = Agent::new(
        dir.path().join("ws").as_path(),
        &ModelCatalog::builtin(),
        Arc::new(registry),
        "stub",
        "local-minimal",
    )
    .unwrap();
    std::fs::create_dir(dir.path().join("ws")).unwrap();

    let reply = agent.run_turn("/write ../outside.txt data").await.unwrap();
    assert!(reply.content.starts_with("error: path escapes workspace"));
    assert!(!dir.path().join("outside.txt").exists());
    assert_eq!(adapter.calls(), 0);
}

#[tokio::test]
async fn missing_adapter_rolls_back_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let mut agent = Agent::new(
        dir.path(),
        &ModelCatalog::builtin(),
        Arc::new(AdapterRegistry::new()),
        "stub",
        "local-minimal",
    )
    .unwrap();

    let err = agent.run_turn("hello").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Provider(ProviderError::NoAdapterRegistered(_))
    ));
    assert!(agent.transcript().is_empty());

    // Shortcuts still work without any adapter.
    agent.run_turn("/time").await.unwrap();
    assert_eq!(agent.transcript().len(), 2);
}

#[tokio::test]
async fn missing_credential_is_raised_and_rolled_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut agent = Agent::new(
        dir.path(),
        &ModelCatalog::builtin(),
        Arc::new(AdapterRegistry::with_builtins()),
        "openai",
        "gpt-4o-mini",
    )
    .unwrap()
    .with_credentials(Credentials::new().without_env());

    let before = agent.transcript().len();
    let err = agent.run_turn("hello").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Provider(ProviderError::MissingCredential { .. })
    ));
    assert_eq!(err.to_string(), "missing OPENAI_API_KEY for provider 'openai'");
    assert_eq!(agent.transcript().len(), before);
}

#[tokio::test]
async fn shortcut_turn_events() {
    let dir = tempfile::tempdir().unwrap();
    let mut agent = stub_agent(dir.path());
    let seen = record_events(&agent);

    agent.run_turn("/time").await.unwrap();
    assert_eq!(kinds(&seen), vec![EventKind::MessageStart, EventKind::MessageEnd]);

    let events = seen.lock().unwrap();
    assert_eq!(events[0].get("role").unwrap(), "user");
    assert_eq!(events[0].get("text").unwrap(), "/time");
    assert_eq!(events[1].get("role").unwrap(), "assistant");
    assert_eq!(events[1].get("tool_shortcut").unwrap(), true);
}

#[cfg(unix)]
#[tokio::test]
async fn bash_turn_events() {
    let dir = tempfile::tempdir().unwrap();
    let mut agent = stub_agent(dir.path());
    let seen = record_events(&agent);

    agent.run_turn("/bash echo a; echo b").await.unwrap();
    assert_eq!(
        kinds(&seen),
        vec![
            EventKind::MessageStart,
            EventKind::ToolStart,
            EventKind::ToolStdoutDelta,
            EventKind::ToolStdoutDelta,
            EventKind::ToolEnd,
            EventKind::MessageEnd,
        ]
    );
}

#[tokio::test]
async fn model_turn_events() {
    let dir = tempfile::tempdir().unwrap();
    let mut agent = stub_agent(dir.path());
    let seen = record_events(&agent);

    agent.run_turn("hello").await.unwrap();
    assert_eq!(
        kinds(&seen),
        vec![
            EventKind::MessageStart,
            EventKind::LlmStart,
            EventKind::LlmEnd,
            EventKind::MessageEnd,
        ]
    );
    assert_eq!(
        seen.lock().unwrap()[3].get("tool_shortcut").unwrap(),
        false
    );
}

#[tokio::test]
async fn failed_turn_still_ends_llm_bracket() {
    let dir = tempfile::tempdir().unwrap();
    let bus = Arc::new(EventBus::new());
    let mut agent = Agent::new(
        dir.path(),
        &ModelCatalog::builtin(),
        Arc::new(AdapterRegistry::new()),
        "stub",
        "local-minimal",
    )
    .unwrap()
    .with_event_bus(Arc::clone(&bus));
    let seen = record_events(&agent);

    agent.run_turn("hello").await.unwrap_err();
    assert_eq!(
        kinds(&seen),
        vec![EventKind::MessageStart, EventKind::LlmStart, EventKind::LlmEnd]
    );
    assert_eq!(bus.len(), 1);
}

#[tokio::test]
async fn session_replay_restores_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::create_in(&dir.path().join(".pico/sessions"));

    let mut first = stub_agent(dir.path());
    for input in ["/write notes.txt remember me", "hello"] {
        first.run_turn(input).await.unwrap();
        let (user, assistant) = first.transcript().last_exchange().unwrap();
        store.append(user).unwrap();
        store.append(assistant).unwrap();
    }

    let history = store.load().unwrap();
    assert_eq!(history, first.transcript().messages());

    let mut second = stub_agent(dir.path()).with_history(history);
    assert_eq!(second.transcript().len(), 4);
    let reply = second.run_turn("/read notes.txt").await.unwrap();
    assert_eq!(reply.content, "remember me");
    assert_eq!(second.transcript().len(), 6);
}
