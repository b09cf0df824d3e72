//! Single-shot classification protocol
//!
//! One self-contained prompt carries both texts; the backend answers
//! with both labels in a single formatted reply:
//!
//! ```text
//! Parent speech is hate speech, Counter speech is counter hate speech, because ...
//! ```
//!
//! An unparseable reply degrades both labels to `Unknown`.

use crate::pair::{PairClassifier, PairOutcome};
use crate::prompts;
use async_trait::async_trait;
use counterscope_backend::{parse_label, ClassifierClient};
use counterscope_core::{Conversation, Result, SpeechLabel};
use regex::Regex;
use std::sync::OnceLock;

fn pair_reply_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Parent speech is a?\s?(.+), Counter speech is a?\s?(.+), because .*")
            .expect("pair reply regex is valid")
    })
}

/// Parse the formatted two-label reply; `(Unknown, Unknown)` when the
/// format does not match
pub fn parse_pair_reply(raw: &str) -> (SpeechLabel, SpeechLabel) {
    match pair_reply_regex().captures(raw) {
        Some(captures) => (
            parse_label(captures.get(1).map_or("", |m| m.as_str())),
            parse_label(captures.get(2).map_or("", |m| m.as_str())),
        ),
        None => (SpeechLabel::Unknown, SpeechLabel::Unknown),
    }
}

/// Stateless single-prompt protocol
pub struct SingleShotProtocol {
    client: ClassifierClient,
}

impl SingleShotProtocol {
    /// Create a protocol over the given client
    pub fn new(client: ClassifierClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PairClassifier for SingleShotProtocol {
    async fn classify_pair(&mut self, parent: &str, reply: &str) -> Result<PairOutcome> {
        let mut conversation = Conversation::new();
        let exchange = self
            .client
            .exchange(&mut conversation, prompts::pair_prompt(parent, reply))
            .await?;

        let (parent_label, reply_label) = parse_pair_reply(&exchange.raw);

        Ok(PairOutcome {
            parent: parent_label,
            reply: reply_label,
            transcript: vec![exchange.raw],
        })
    }
}
