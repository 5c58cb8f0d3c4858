//! Completion service client (OpenAI-compatible chat completions).
//!
//! The gateway makes exactly one completion call per request; the client is
//! deliberately small: one model, deterministic settings, no streaming.

mod openai;

pub use openai::{CompletionClient, CompletionError};
