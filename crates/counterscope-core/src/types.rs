//! Core types for counterscope
//!
//! Corpus records mirror the acquisition layer's JSONL schema; the
//! output record mirrors the reference corpus field names so existing
//! downstream tooling keeps working.

use serde::{Deserialize, Serialize};

/// Classification outcome for a single piece of speech.
///
/// `Unknown` is the lenient degradation used when a backend reply
/// cannot be matched against the expected vocabulary. It is a label,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeechLabel {
    #[serde(rename = "hate speech")]
    Hate,
    #[serde(rename = "counter hate speech")]
    CounterHate,
    #[serde(rename = "neutral speech")]
    Neutral,
    #[serde(rename = "unknown")]
    Unknown,
}

impl SpeechLabel {
    /// The corpus phrase for this label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hate => "hate speech",
            Self::CounterHate => "counter hate speech",
            Self::Neutral => "neutral speech",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_hate(&self) -> bool {
        matches!(self, Self::Hate)
    }

    pub fn is_counter_hate(&self) -> bool {
        matches!(self, Self::CounterHate)
    }
}

impl std::fmt::Display for SpeechLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single turn in a backend conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Role of the turn's author
    pub role: ChatRole,

    /// Text content of the turn
    pub content: String,
}

impl ChatTurn {
    /// Create a new turn
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system turn
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// An ordered sequence of conversation turns sent to a backend
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation seeded with a system turn
    pub fn with_system(content: impl Into<String>) -> Self {
        Self {
            turns: vec![ChatTurn::system(content)],
        }
    }

    /// Append a turn
    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    /// The turns in order
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Number of turns so far
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Kind of corpus entity an output record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Comment,
    Reply,
}

/// A top-level comment under a post; the unit of work dispatched by
/// the batch orchestrator. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    /// Stable identifier
    pub id: String,

    /// Identifier of the post this comment belongs to
    pub post_id: String,

    /// Body text
    pub body: String,

    /// Vote score at acquisition time
    #[serde(default)]
    pub score: i64,

    /// Reply count declared by the acquisition layer
    #[serde(default)]
    pub total_replies: u64,
}

/// A nested response to a comment or to another reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyRecord {
    /// Stable identifier
    pub id: String,

    /// Identifier of the parent comment or reply
    pub parent_comment_id: String,

    /// Body text
    pub body: String,
}

/// Aggregate counts over one root comment's subtree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadStats {
    /// Replies classified as hate speech
    pub hate_speech: u64,

    /// Replies classified as counter-hate speech
    pub counter_hate_speech: u64,

    /// All replies visited, transitively
    pub total_replies: u64,
}

impl ThreadStats {
    /// Fold a child subtree's counts into this node's counts
    pub fn absorb(&mut self, other: ThreadStats) {
        self.hate_speech += other.hate_speech;
        self.counter_hate_speech += other.counter_hate_speech;
        self.total_replies += other.total_replies;
    }

    /// Record one directly-visited reply with its label
    pub fn record(&mut self, label: SpeechLabel) {
        self.total_replies += 1;
        match label {
            SpeechLabel::Hate => self.hate_speech += 1,
            SpeechLabel::CounterHate => self.counter_hate_speech += 1,
            SpeechLabel::Neutral | SpeechLabel::Unknown => {}
        }
    }
}

/// One line of the output log: a root comment whose subtree was
/// classified, with aggregate counts. Field names match the reference
/// corpus schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Entity kind (always `comment` for batch output)
    #[serde(rename = "type")]
    pub entity_type: EntityType,

    /// The root comment's text
    pub parent_speech: String,

    /// Hate-speech replies in the subtree
    pub hate_speech_counts: u64,

    /// Counter-hate replies in the subtree
    pub counter_hate_speech_count: u64,

    /// Replies visited in the subtree
    pub total_replies: u64,

    /// Original vote score
    pub score: i64,

    /// Original comment identifier
    pub id: String,

    /// Reply count declared by the acquisition layer
    pub original_total_replies: u64,
}

impl OutputRecord {
    /// Build an output record from a comment and its subtree stats
    pub fn from_comment(comment: &CommentRecord, stats: ThreadStats) -> Self {
        Self {
            entity_type: EntityType::Comment,
            parent_speech: comment.body.clone(),
            hate_speech_counts: stats.hate_speech,
            counter_hate_speech_count: stats.counter_hate_speech,
            total_replies: stats.total_replies,
            score: comment.score,
            id: comment.id.clone(),
            original_total_replies: comment.total_replies,
        }
    }
}
