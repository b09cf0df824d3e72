//! Backend trait and the retrying classifier client

use crate::parse::parse_label;
use async_trait::async_trait;
use counterscope_core::{ChatTurn, Conversation, Error, Result, RetryPolicy, SpeechLabel};
use std::sync::Arc;
use tracing::{debug, warn};

/// One conversational exchange against an LLM provider.
///
/// Implementations map transport and rate-limit faults to
/// `Error::BackendUnavailable`; retrying is the caller's concern.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the ordered turns and return the reply text
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// A backend reply with its parsed label
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Parsed label (`Unknown` when the reply did not match)
    pub label: SpeechLabel,

    /// Raw reply text, preserved for audit
    pub raw: String,
}

/// Retry/backoff wrapper around a `ChatBackend`.
///
/// Owns no conversation state itself; callers pass the conversation so
/// multi-turn protocols can thread prior exchanges through.
#[derive(Clone)]
pub struct ClassifierClient {
    backend: Arc<dyn ChatBackend>,
    retry: RetryPolicy,
}

impl ClassifierClient {
    /// Create a client over the given backend
    pub fn new(backend: Arc<dyn ChatBackend>, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }

    /// Provider name of the wrapped backend
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Append `prompt` as the next user turn, obtain the backend's
    /// reply, append it as the assistant turn, and return the parsed
    /// exchange.
    ///
    /// Transient faults are retried with bounded exponential backoff;
    /// the sleep suspends only the calling task. After the attempt cap
    /// the last fault propagates as `BackendUnavailable`, and the
    /// conversation is left without the failed user turn so the caller
    /// can retry the whole unit cleanly.
    pub async fn exchange(
        &self,
        conversation: &mut Conversation,
        prompt: impl Into<String>,
    ) -> Result<Exchange> {
        let prompt = prompt.into();
        let mut turns: Vec<ChatTurn> = conversation.turns().to_vec();
        turns.push(ChatTurn::user(prompt.clone()));

        let mut failures = 0u32;
        let raw = loop {
            match self.backend.complete(&turns).await {
                Ok(reply) => break reply,
                Err(err) => {
                    failures += 1;
                    if !self.retry.has_attempts_left(failures) {
                        warn!(
                            backend = self.backend.name(),
                            failures, "backend retries exhausted"
                        );
                        return Err(err);
                    }
                    let delay = self.retry.delay_for(failures - 1);
                    debug!(
                        backend = self.backend.name(),
                        failures,
                        delay_secs = delay.as_secs_f64(),
                        "backend call failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        };

        conversation.push(ChatTurn::user(prompt));
        conversation.push(ChatTurn::assistant(raw.clone()));

        Ok(Exchange {
            label: parse_label(&raw),
            raw,
        })
    }
}

impl std::fmt::Debug for ClassifierClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierClient")
            .field("backend", &self.backend.name())
            .field("retry", &self.retry)
            .finish()
    }
}

/// Map a reqwest transport error to the taxonomy
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    Error::backend(err.to_string())
}
