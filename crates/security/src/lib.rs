//! Security module for pico — filesystem sandboxing.
//!
//! Provides:
//! - **Path validation**: every file tool path must resolve under the
//!   workspace root

pub mod path;

pub use path::{PathValidationError, resolve_in_workspace};
