//! The polymorphism seam between protocol variants

use async_trait::async_trait;
use counterscope_core::{Result, SpeechLabel};

/// Labels for a (parent, reply) pair plus the raw replies kept for
/// audit
#[derive(Debug, Clone)]
pub struct PairOutcome {
    /// Label of the parent speech
    pub parent: SpeechLabel,

    /// Label of the reply, relative to the parent where applicable
    pub reply: SpeechLabel,

    /// Raw backend replies in call order
    pub transcript: Vec<String>,
}

/// Classify a (parent speech, reply) pair.
///
/// Implemented by both protocol variants; callers stay agnostic of
/// whether one or two backend calls are made.
#[async_trait]
pub trait PairClassifier: Send {
    async fn classify_pair(&mut self, parent: &str, reply: &str) -> Result<PairOutcome>;
}
