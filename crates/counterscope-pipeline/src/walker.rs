//! Recursive subtree classification
//!
//! Walks one root comment's reply tree, applying the classification
//! protocol to every unvisited node and aggregating counts bottom-up.
//! Recursion is expressed through boxed futures so depth is bounded by
//! the heap, with an explicit depth guard on top.
//!
//! Context propagation: each reply is judged against the nearest
//! ancestor that was classified hate speech (the original root if none
//! nearer). A reply judged hate becomes the reference for its own
//! subtree; a neutral reply does not reset the reference.

use crate::corpus::ReplyIndex;
use counterscope_core::{CommentRecord, Result, SpeechLabel, ThreadStats};
use counterscope_protocol::MultiTurnProtocol;
use futures::future::BoxFuture;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Bodies the acquisition layer substitutes for removed content
const TOMBSTONE_BODIES: [&str; 2] = ["[removed]", "[deleted]"];

/// Walks one unit of work's reply tree.
///
/// The visited set is scoped to this walker, so a fresh walker per
/// unit attempt re-classifies the whole subtree; within one traversal
/// a node identifier is never submitted to the backend twice, even if
/// it is reachable along more than one path.
pub struct TreeWalker<'a> {
    index: &'a ReplyIndex,
    max_depth: usize,
    visited: HashSet<String>,
}

impl<'a> TreeWalker<'a> {
    /// Create a walker over the read-only reply index
    pub fn new(index: &'a ReplyIndex, max_depth: usize) -> Self {
        Self {
            index,
            max_depth,
            visited: HashSet::new(),
        }
    }

    /// Classify a root comment and, when it is hate speech, its whole
    /// subtree.
    ///
    /// Returns `None` for tombstoned bodies, already-visited roots,
    /// and roots not classified as hate speech — only hate-rooted
    /// subtrees produce output records.
    pub async fn analyze_root(
        &mut self,
        comment: &CommentRecord,
        protocol: &mut MultiTurnProtocol,
    ) -> Result<Option<ThreadStats>> {
        let body = comment.body.trim();
        if body.is_empty() || TOMBSTONE_BODIES.contains(&body) {
            debug!(id = %comment.id, "skipping tombstoned root");
            return Ok(None);
        }
        if !self.visited.insert(comment.id.clone()) {
            return Ok(None);
        }

        let label = protocol.classify_root(body).await?;
        if label != SpeechLabel::Hate {
            return Ok(None);
        }

        let stats = self
            .walk(protocol, comment.id.clone(), comment.body.clone(), 1)
            .await?;
        Ok(Some(stats))
    }

    /// Visit every unvisited child of `parent_id`, classify it against
    /// `reference` (the nearest hate ancestor's text), and recurse
    fn walk<'b>(
        &'b mut self,
        protocol: &'b mut MultiTurnProtocol,
        parent_id: String,
        reference: String,
        depth: usize,
    ) -> BoxFuture<'b, Result<ThreadStats>> {
        Box::pin(async move {
            let mut stats = ThreadStats::default();

            if depth > self.max_depth {
                warn!(
                    parent = %parent_id,
                    max_depth = self.max_depth,
                    "reply thread exceeds depth guard, not descending"
                );
                return Ok(stats);
            }

            let children = self.index.children(&parent_id).to_vec();
            for reply in children {
                // mark before recursing so repeated reachability never
                // resubmits a node
                if !self.visited.insert(reply.id.clone()) {
                    debug!(id = %reply.id, "reply already visited, skipping");
                    continue;
                }

                let label = protocol
                    .classify_reply(&reply.body, Some(reference.as_str()))
                    .await?;
                stats.record(label);

                let next_reference = if label == SpeechLabel::Hate {
                    reply.body.clone()
                } else {
                    reference.clone()
                };

                let subtree = self
                    .walk(protocol, reply.id, next_reference, depth + 1)
                    .await?;
                stats.absorb(subtree);
            }

            Ok(stats)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use counterscope_backend::{ChatBackend, ClassifierClient};
    use counterscope_core::{ChatTurn, Error, ReplyRecord, RetryPolicy};
    use std::sync::{Arc, Mutex};

    /// Keyword-driven backend that also records every prompt it saw
    struct RecordingBackend {
        prompts: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingBackend {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        fn failing_on(keyword: &'static str) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail_on: Some(keyword),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for RecordingBackend {
        async fn complete(&self, turns: &[ChatTurn]) -> counterscope_core::Result<String> {
            let prompt = turns.last().map(|t| t.content.clone()).unwrap_or_default();
            if let Some(keyword) = self.fail_on {
                if prompt.contains(keyword) {
                    return Err(Error::backend("injected fault"));
                }
            }
            self.prompts.lock().unwrap().push(prompt.clone());
            Ok(counterscope_backend::testing::keyword_reply(&prompt))
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn protocol_over(backend: Arc<dyn ChatBackend>) -> MultiTurnProtocol {
        MultiTurnProtocol::new(ClassifierClient::new(
            backend,
            RetryPolicy {
                max_attempts: 1,
                base_delay_secs: 0,
                multiplier: 1.0,
                max_delay_secs: 0,
            },
        ))
    }

    fn comment(id: &str, body: &str) -> CommentRecord {
        CommentRecord {
            id: id.to_string(),
            post_id: "p1".to_string(),
            body: body.to_string(),
            score: 0,
            total_replies: 0,
        }
    }

    fn reply(id: &str, parent: &str, body: &str) -> ReplyRecord {
        ReplyRecord {
            id: id.to_string(),
            parent_comment_id: parent.to_string(),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_non_hate_root_yields_nothing() {
        let index = ReplyIndex::build(vec![reply("r1", "c1", "COUNTER reply")]);
        let backend = Arc::new(RecordingBackend::new());
        let mut protocol = protocol_over(backend.clone());
        let mut walker = TreeWalker::new(&index, 128);

        let result = walker
            .analyze_root(&comment("c1", "a calm observation"), &mut protocol)
            .await
            .unwrap();

        assert!(result.is_none());
        // only the root question was asked
        assert_eq!(backend.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_hate_root_aggregates_subtree() {
        // c1 (hate) -> r1 (counter), r2 (hate) -> r3 (neutral)
        let index = ReplyIndex::build(vec![
            reply("r1", "c1", "COUNTER this nonsense"),
            reply("r2", "c1", "more HATE here"),
            reply("r3", "r2", "something mild"),
        ]);
        let backend = Arc::new(RecordingBackend::new());
        let mut protocol = protocol_over(backend.clone());
        let mut walker = TreeWalker::new(&index, 128);

        let stats = walker
            .analyze_root(&comment("c1", "pure HATE root"), &mut protocol)
            .await
            .unwrap()
            .expect("hate root must produce stats");

        assert_eq!(stats.hate_speech, 1);
        assert_eq!(stats.counter_hate_speech, 1);
        assert_eq!(stats.total_replies, 3);
    }

    #[tokio::test]
    async fn test_counter_reply_under_hate_root() {
        let index = ReplyIndex::build(vec![reply(
            "r1",
            "c1",
            "That would discourage reporting COUNTER",
        )]);
        let backend = Arc::new(RecordingBackend::new());
        let mut protocol = protocol_over(backend);
        let mut walker = TreeWalker::new(&index, 128);

        let stats = walker
            .analyze_root(&comment("c1", "Group X should be jailed HATE"), &mut protocol)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stats.counter_hate_speech, 1);
        assert_eq!(stats.hate_speech, 0);
        assert_eq!(stats.total_replies, 1);
    }

    #[tokio::test]
    async fn test_repeated_reachability_classified_once() {
        // the same reply id appears under two parents; it must be
        // submitted to the backend only once
        let index = ReplyIndex::build(vec![
            reply("r1", "c1", "HATE again"),
            reply("r2", "c1", "COUNTER speech"),
            reply("r2", "r1", "COUNTER speech"),
        ]);
        let backend = Arc::new(RecordingBackend::new());
        let mut protocol = protocol_over(backend.clone());
        let mut walker = TreeWalker::new(&index, 128);

        let stats = walker
            .analyze_root(&comment("c1", "HATE root"), &mut protocol)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stats.total_replies, 2);
        assert_eq!(stats.counter_hate_speech, 1);
        // root + r1 + r2, nothing twice
        assert_eq!(backend.prompts().len(), 3);
    }

    #[tokio::test]
    async fn test_reference_is_nearest_hate_ancestor() {
        // c1 (hate) -> r1 (neutral) -> r2; r2 must be judged against
        // the root, not the neutral r1.
        // c1 (hate) -> r3 (hate) -> r4; r4 must be judged against r3.
        let index = ReplyIndex::build(vec![
            reply("r1", "c1", "neutral middle"),
            reply("r2", "r1", "deep reply one"),
            reply("r3", "c1", "HATE middle"),
            reply("r4", "r3", "deep reply two"),
        ]);
        let backend = Arc::new(RecordingBackend::new());
        let mut protocol = protocol_over(backend.clone());
        let mut walker = TreeWalker::new(&index, 128);

        walker
            .analyze_root(&comment("c1", "HATE root text"), &mut protocol)
            .await
            .unwrap()
            .unwrap();

        let prompts = backend.prompts();
        let for_r2 = prompts
            .iter()
            .find(|p| p.contains("deep reply one"))
            .unwrap();
        assert!(for_r2.contains("HATE root text"));
        assert!(!for_r2.contains("neutral middle"));

        let for_r4 = prompts
            .iter()
            .find(|p| p.contains("deep reply two"))
            .unwrap();
        assert!(for_r4.contains("HATE middle"));
        assert!(!for_r4.contains("HATE root text"));
    }

    #[tokio::test]
    async fn test_depth_guard_stops_descent() {
        let index = ReplyIndex::build(vec![
            reply("r1", "c1", "level one"),
            reply("r2", "r1", "level two"),
            reply("r3", "r2", "level three"),
        ]);
        let backend = Arc::new(RecordingBackend::new());
        let mut protocol = protocol_over(backend.clone());
        let mut walker = TreeWalker::new(&index, 2);

        let stats = walker
            .analyze_root(&comment("c1", "HATE root"), &mut protocol)
            .await
            .unwrap()
            .unwrap();

        // r3 sits at depth 3 and is never visited
        assert_eq!(stats.total_replies, 2);
        assert!(!backend.prompts().iter().any(|p| p.contains("level three")));
    }

    #[tokio::test]
    async fn test_tombstoned_root_skipped_without_backend_call() {
        let index = ReplyIndex::build(vec![]);
        let backend = Arc::new(RecordingBackend::new());
        let mut protocol = protocol_over(backend.clone());
        let mut walker = TreeWalker::new(&index, 128);

        let result = walker
            .analyze_root(&comment("c1", "[removed]"), &mut protocol)
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(backend.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_deep_failure_aborts_unit_without_partial_result() {
        let index = ReplyIndex::build(vec![
            reply("r1", "c1", "COUNTER fine"),
            reply("r2", "r1", "POISON deep down"),
        ]);
        let backend = Arc::new(RecordingBackend::failing_on("POISON"));
        let mut protocol = protocol_over(backend);
        let mut walker = TreeWalker::new(&index, 128);

        let err = walker
            .analyze_root(&comment("c1", "HATE root"), &mut protocol)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::BackendUnavailable(_)));
    }
}
