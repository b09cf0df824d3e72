//! Counterscope Backend
//!
//! Uniform capability surface over heterogeneous LLM providers:
//! - `ChatBackend`: one conversational exchange against a provider
//! - `OpenAiBackend` / `GeminiBackend`: concrete HTTP clients
//! - `parse_label`: lenient prefix match of replies onto speech labels
//! - `ClassifierClient`: retry/backoff wrapper that maintains the
//!   conversation and extracts the label from each reply

pub mod client;
pub mod gemini;
pub mod openai;
pub mod parse;
pub mod testing;

pub use client::{ChatBackend, ClassifierClient, Exchange};
pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;
pub use parse::parse_label;

use counterscope_core::{BackendConfig, BackendProvider, Result};
use std::sync::Arc;

/// Construct the configured provider backend
pub fn build_backend(config: &BackendConfig) -> Result<Arc<dyn ChatBackend>> {
    Ok(match config.provider {
        BackendProvider::OpenAi => Arc::new(OpenAiBackend::new(config)?),
        BackendProvider::Gemini => Arc::new(GeminiBackend::new(config)?),
    })
}
