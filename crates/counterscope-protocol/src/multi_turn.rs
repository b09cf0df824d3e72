//! Multi-turn classification protocol
//!
//! A two-state decision procedure over one growing conversation:
//! `RootPending` until the root speech has been classified, then
//! `RootClassified` with the established label. Reply evaluation is
//! asymmetric by design — a reply can only be counter-hate in relation
//! to an established hate parent; relative-to-neutral framing does not
//! apply, so under a neutral root the reply gets the same independent
//! hate-or-neutral question.

use crate::pair::{PairClassifier, PairOutcome};
use crate::prompts;
use async_trait::async_trait;
use counterscope_backend::ClassifierClient;
use counterscope_core::{Conversation, Result, SpeechLabel};
use tracing::debug;

/// Protocol state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootState {
    Pending,
    Classified(SpeechLabel),
}

/// Stateful multi-turn protocol over one conversation.
///
/// Construct one per unit of work; the conversation accumulates every
/// exchange so later questions are conditioned on earlier answers.
pub struct MultiTurnProtocol {
    client: ClassifierClient,
    conversation: Conversation,
    root: RootState,
    transcript: Vec<String>,
}

impl MultiTurnProtocol {
    /// Create a protocol seeded with the category definitions
    pub fn new(client: ClassifierClient) -> Self {
        Self {
            client,
            conversation: Conversation::with_system(prompts::SYSTEM_PROMPT),
            root: RootState::Pending,
            transcript: Vec::new(),
        }
    }

    /// Classify the root speech (hate-or-neutral question) and
    /// transition to `RootClassified`
    pub async fn classify_root(&mut self, speech: &str) -> Result<SpeechLabel> {
        let exchange = self
            .client
            .exchange(&mut self.conversation, prompts::root_prompt(speech))
            .await?;

        debug!(label = %exchange.label, "root classified");
        self.transcript.push(exchange.raw);
        self.root = RootState::Classified(exchange.label);
        Ok(exchange.label)
    }

    /// The established root label, if any
    pub fn root_label(&self) -> Option<SpeechLabel> {
        match self.root {
            RootState::Pending => None,
            RootState::Classified(label) => Some(label),
        }
    }

    /// Classify a reply.
    ///
    /// With `reference = Some(ancestor)` the reply is judged with the
    /// three-way question conditioned on that hate-classified ancestor
    /// text; with `None` it gets the independent hate-or-neutral
    /// question.
    pub async fn classify_reply(
        &mut self,
        reply: &str,
        reference: Option<&str>,
    ) -> Result<SpeechLabel> {
        let prompt = match reference {
            Some(ancestor) => prompts::conditioned_reply_prompt(reply, ancestor),
            None => prompts::root_prompt(reply),
        };

        let exchange = self.client.exchange(&mut self.conversation, prompt).await?;
        self.transcript.push(exchange.raw);
        Ok(exchange.label)
    }

    /// Raw backend replies in call order
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }
}

#[async_trait]
impl PairClassifier for MultiTurnProtocol {
    async fn classify_pair(&mut self, parent: &str, reply: &str) -> Result<PairOutcome> {
        let parent_label = self.classify_root(parent).await?;

        let reply_label = match parent_label {
            // independent question; reply vocabulary is hate-or-neutral
            SpeechLabel::Neutral => self.classify_reply(reply, None).await?,
            // conditioned three-way question
            SpeechLabel::Hate => self.classify_reply(reply, Some(parent)).await?,
            // unparseable root: the reply is not evaluated
            SpeechLabel::Unknown | SpeechLabel::CounterHate => SpeechLabel::Unknown,
        };

        Ok(PairOutcome {
            parent: parent_label,
            reply: reply_label,
            transcript: self.transcript.clone(),
        })
    }
}
