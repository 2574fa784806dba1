//! Completion adapters for pico.
//!
//! Every adapter implements `pico_core::Adapter` for one api kind. The
//! [`AdapterRegistry`] picks the adapter for a model's api at call time.

pub mod credentials;
pub mod http_chat;
pub mod registry;
pub mod stub_local;

pub use credentials::{Credentials, env_var_for};
pub use http_chat::HttpChatAdapter;
pub use registry::AdapterRegistry;
pub use stub_local::StubLocalAdapter;
