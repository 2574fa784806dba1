//! The pico agent — one turn at a time.
//!
//! A turn takes one line of user input:
//!
//! 1. **Record** the user message and emit `message_start`
//! 2. **Route** it: a tool shortcut (`/read`, `/write`, `/bash`, `/time`)
//!    is answered locally
//! 3. **Otherwise dispatch** to the bound model through the adapter
//!    registry, bracketed by `llm_start` / `llm_end`
//! 4. **Record** the assistant reply and emit `message_end`

pub mod agent;

pub use agent::Agent;
