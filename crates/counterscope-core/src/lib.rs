//! Counterscope Core
//!
//! Shared building blocks for the counterscope thread-classification
//! pipeline:
//! - Speech labels, corpus records, and conversation types
//! - Error types and result handling
//! - Retry policy used around backend calls and units of work
//! - Runtime configuration loaded from YAML plus CLI overrides

pub mod config;
pub mod error;
pub mod retry;
pub mod types;

pub use config::{AppConfig, BackendConfig, BackendProvider, JobConfig};
pub use error::{Error, Result};
pub use retry::RetryPolicy;
pub use types::{
    ChatRole, ChatTurn, CommentRecord, Conversation, EntityType, OutputRecord, ReplyRecord,
    SpeechLabel, ThreadStats,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{AppConfig, BackendConfig, BackendProvider, JobConfig};
    pub use crate::error::{Error, Result};
    pub use crate::retry::RetryPolicy;
    pub use crate::types::{
        ChatRole, ChatTurn, CommentRecord, Conversation, EntityType, OutputRecord, ReplyRecord,
        SpeechLabel, ThreadStats,
    };
}
