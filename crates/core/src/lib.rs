//! # pico core
//!
//! Domain types, traits, and error definitions for the pico coding agent.
//! This crate defines the domain model that every other crate implements
//! against: messages and transcripts, the model catalog, the provider
//! adapter seam, and the turn event bus.
//!
//! ## Design Philosophy
//!
//! Every pluggable subsystem is a trait here. Implementations live in their
//! respective crates. This enables:
//! - Injecting adapter tables and observers instead of global registration
//! - Easy testing with stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod event;
pub mod message;
pub mod model;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, SessionError, ToolError};
pub use event::{Event, EventBus, EventKind, Observer, SubscriptionId, TracingObserver};
pub use message::{Message, Role, Transcript};
pub use model::{Model, ModelCatalog};
pub use provider::{Adapter, Context, DEFAULT_SYSTEM_PROMPT};
