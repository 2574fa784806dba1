//! Turn event system — synchronous observer fan-out.
//!
//! The agent emits an [`Event`] at each step of a turn. Observers are
//! composed into the agent through an [`EventBus`]; delivery happens on the
//! emitting call stack, in subscription order, with no queueing or
//! retention.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// All event kinds emitted during a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    MessageStart,
    MessageEnd,
    LlmStart,
    LlmEnd,
    ToolStart,
    ToolStdoutDelta,
    ToolStderrDelta,
    ToolEnd,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MessageStart => "message_start",
            Self::MessageEnd => "message_end",
            Self::LlmStart => "llm_start",
            Self::LlmEnd => "llm_end",
            Self::ToolStart => "tool_start",
            Self::ToolStdoutDelta => "tool_stdout_delta",
            Self::ToolStderrDelta => "tool_stderr_delta",
            Self::ToolEnd => "tool_end",
        }
    }
}

/// One lifecycle notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,

    #[serde(default)]
    pub payload: Map<String, Value>,

    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Create an event from a kind and a JSON object payload.
    /// A non-object payload is stored as an empty map.
    pub fn new(kind: EventKind, payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            kind,
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn message_start(role: &str, text: &str) -> Self {
        Self::new(EventKind::MessageStart, json!({ "role": role, "text": text }))
    }

    pub fn message_end(role: &str, tool_shortcut: bool) -> Self {
        Self::new(
            EventKind::MessageEnd,
            json!({ "role": role, "tool_shortcut": tool_shortcut }),
        )
    }

    pub fn llm_start() -> Self {
        Self::new(EventKind::LlmStart, json!({}))
    }

    pub fn llm_end() -> Self {
        Self::new(EventKind::LlmEnd, json!({}))
    }

    pub fn tool_start(tool: &str, command: &str) -> Self {
        Self::new(EventKind::ToolStart, json!({ "tool": tool, "command": command }))
    }

    pub fn tool_stdout_delta(line: &str) -> Self {
        Self::new(EventKind::ToolStdoutDelta, json!({ "line": line }))
    }

    pub fn tool_stderr_delta(line: &str) -> Self {
        Self::new(EventKind::ToolStderrDelta, json!({ "line": line }))
    }

    pub fn tool_end(tool: &str, exit_code: i32) -> Self {
        Self::new(EventKind::ToolEnd, json!({ "tool": tool, "exit_code": exit_code }))
    }

    /// Look up a payload value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}

/// Something that wants to hear about turn events.
pub trait Observer: Send + Sync {
    fn notify(&self, event: &Event);
}

impl<F> Observer for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn notify(&self, event: &Event) {
        self(event)
    }
}

/// Logs every event through `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn notify(&self, event: &Event) {
        let payload = Value::Object(event.payload.clone());
        debug!(event = event.kind.as_str(), payload = %payload, "turn event");
    }
}

/// Handle returned by [`EventBus::subscribe`]; pass it to
/// [`EventBus::unsubscribe`] to detach the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Arc<dyn Observer>)>,
}

/// A synchronous publish/subscribe channel for turn events.
///
/// `emit` snapshots the subscriber list before delivering, so observers
/// may subscribe or unsubscribe from inside `notify` without affecting the
/// delivery in progress.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Subscribers>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an observer. Observers are notified in subscription order.
    pub fn subscribe(&self, observer: Arc<dyn Observer>) -> SubscriptionId {
        let mut subs = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        let id = SubscriptionId(subs.next_id);
        subs.next_id += 1;
        subs.entries.push((id, observer));
        id
    }

    /// Detach an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        let before = subs.entries.len();
        subs.entries.retain(|(sub, _)| *sub != id);
        subs.entries.len() != before
    }

    /// Deliver an event to every current observer.
    pub fn emit(&self, event: &Event) {
        let snapshot: Vec<Arc<dyn Observer>> = {
            let subs = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
            subs.entries.iter().map(|(_, o)| Arc::clone(o)).collect()
        };
        for observer in snapshot {
            observer.notify(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.len())
            .finish()
    }
}
