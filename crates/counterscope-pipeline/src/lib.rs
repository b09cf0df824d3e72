//! Counterscope Pipeline
//!
//! The checkpointed, parallel tree-classification pipeline:
//! - `corpus`: JSONL corpus IO and the parent-id reply index
//! - `checkpoint`: durable last-completed-index store
//! - `walker`: recursive subtree classification with per-unit
//!   deduplication and a depth guard
//! - `orchestrator`: batch partitioning, bounded worker pool, output
//!   log, and checkpoint advancement

pub mod checkpoint;
pub mod corpus;
pub mod orchestrator;
pub mod walker;

pub use checkpoint::CheckpointStore;
pub use corpus::{append_jsonl, read_jsonl, ReplyIndex};
pub use orchestrator::{BatchAnalyzer, JobSummary};
pub use walker::TreeWalker;
