//! Batch orchestration
//!
//! Partitions the ordered root-comment sequence into fixed-size
//! batches, dispatches each batch to a bounded worker pool, appends
//! the batch's qualifying records to the output log, and only then
//! advances the checkpoint. A crash between append and checkpoint
//! write therefore duplicates at most one batch of output on resume
//! and never loses progress.
//!
//! Failure isolation: a unit of work that cannot complete after its
//! attempt budget is logged and omitted from the batch's results; a
//! worker panic is a batch fault and aborts the job with the
//! checkpoint intact.

use crate::checkpoint::CheckpointStore;
use crate::corpus::{append_jsonl, ReplyIndex};
use crate::walker::TreeWalker;
use counterscope_backend::ClassifierClient;
use counterscope_core::{
    CommentRecord, Error, JobConfig, OutputRecord, ReplyRecord, Result, RetryPolicy,
};
use counterscope_protocol::MultiTurnProtocol;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Totals reported after a run completes
#[derive(Debug, Clone, Copy)]
pub struct JobSummary {
    /// Root comments in the corpus
    pub total_roots: usize,

    /// Absolute index the run resumed from
    pub resumed_from: usize,

    /// Output records appended by this run
    pub emitted: usize,
}

/// Drives the whole batch job. Owns the checkpoint store and output
/// log exclusively; workers never touch either.
pub struct BatchAnalyzer {
    comments: Vec<CommentRecord>,
    index: Arc<ReplyIndex>,
    client: ClassifierClient,
    checkpoint: CheckpointStore,
    output_path: PathBuf,
    batch_size: usize,
    workers: usize,
    max_depth: usize,
    unit_retry: RetryPolicy,
}

impl BatchAnalyzer {
    /// Build an analyzer over a loaded corpus
    pub fn new(
        comments: Vec<CommentRecord>,
        replies: Vec<ReplyRecord>,
        client: ClassifierClient,
        job: &JobConfig,
    ) -> Self {
        Self {
            comments,
            index: Arc::new(ReplyIndex::build(replies)),
            client,
            checkpoint: CheckpointStore::new(&job.checkpoint_path),
            output_path: job.output_path.clone(),
            batch_size: job.batch_size.max(1),
            workers: job.workers.max(1),
            max_depth: job.max_depth,
            unit_retry: RetryPolicy {
                max_attempts: job.unit_attempts.max(1),
                ..RetryPolicy::unit_default()
            },
        }
    }

    /// Run the job from the last checkpoint to the end of the corpus
    pub async fn process(&self) -> Result<JobSummary> {
        let start = (self.checkpoint.read()? + 1).max(0) as usize;
        info!(
            total = self.comments.len(),
            replies = self.index.len(),
            start,
            backend = self.client.backend_name(),
            "starting batch job"
        );

        let mut emitted = 0usize;
        let mut cursor = start;
        while cursor < self.comments.len() {
            let end = (cursor + self.batch_size).min(self.comments.len());
            let batch = &self.comments[cursor..end];

            let batch_started = Instant::now();
            let records = self.process_batch(batch).await?;
            emitted += records.len();

            // append before checkpointing: at-least-once at batch
            // granularity, never lost progress
            append_jsonl(&records, &self.output_path)?;
            let last_index = (end - 1) as i64;
            self.checkpoint.write(last_index)?;

            info!(
                processed = end,
                emitted,
                last_index,
                batch_secs = batch_started.elapsed().as_secs_f64(),
                "batch committed"
            );
            cursor = end;
        }

        Ok(JobSummary {
            total_roots: self.comments.len(),
            resumed_from: start,
            emitted,
        })
    }

    /// Run one batch through the bounded worker pool and collect the
    /// qualifying records in pool-completion order
    async fn process_batch(&self, batch: &[CommentRecord]) -> Result<Vec<OutputRecord>> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(batch.len());

        for comment in batch {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| Error::batch("worker pool closed"))?;
            let comment = comment.clone();
            let index = Arc::clone(&self.index);
            let client = self.client.clone();
            let max_depth = self.max_depth;
            let unit_retry = self.unit_retry;

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                process_unit(&comment, &index, client, max_depth, unit_retry).await
            }));
        }

        let mut records = Vec::new();
        for handle in handles {
            let outcome = handle
                .await
                .map_err(|err| Error::batch(format!("worker panicked: {err}")))?;
            if let Some(record) = outcome {
                records.push(record);
            }
        }
        Ok(records)
    }
}

/// Classify one root comment's subtree, retrying the whole unit with a
/// fresh protocol and visited set on each attempt. Exhausting the
/// attempt budget drops the unit from the batch's results.
async fn process_unit(
    comment: &CommentRecord,
    index: &ReplyIndex,
    client: ClassifierClient,
    max_depth: usize,
    retry: RetryPolicy,
) -> Option<OutputRecord> {
    let mut failures = 0u32;
    loop {
        let mut protocol = MultiTurnProtocol::new(client.clone());
        let mut walker = TreeWalker::new(index, max_depth);

        match walker.analyze_root(comment, &mut protocol).await {
            Ok(Some(stats)) => {
                debug!(id = %comment.id, ?stats, "unit emitted");
                return Some(OutputRecord::from_comment(comment, stats));
            }
            Ok(None) => return None,
            Err(err) => {
                failures += 1;
                if !retry.has_attempts_left(failures) {
                    warn!(id = %comment.id, %err, failures, "unit of work dropped");
                    return None;
                }
                let delay = retry.delay_for(failures - 1);
                debug!(
                    id = %comment.id,
                    failures,
                    delay_secs = delay.as_secs_f64(),
                    "unit attempt failed, retrying whole unit"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counterscope_backend::testing::{FailingBackend, KeywordBackend};
    use std::path::Path;

    fn fast_client(backend: Arc<dyn counterscope_backend::ChatBackend>) -> ClassifierClient {
        ClassifierClient::new(
            backend,
            RetryPolicy {
                max_attempts: 1,
                base_delay_secs: 0,
                multiplier: 1.0,
                max_delay_secs: 0,
            },
        )
    }

    fn job_config(dir: &Path, batch_size: usize) -> JobConfig {
        JobConfig {
            output_path: dir.join("output.jsonl"),
            checkpoint_path: dir.join("checkpoint.txt"),
            batch_size,
            workers: 4,
            unit_attempts: 1,
            ..JobConfig::default()
        }
    }

    fn comment(id: &str, body: &str) -> CommentRecord {
        CommentRecord {
            id: id.to_string(),
            post_id: "p1".to_string(),
            body: body.to_string(),
            score: 3,
            total_replies: 1,
        }
    }

    #[tokio::test]
    async fn test_only_hate_roots_are_emitted() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_config(dir.path(), 10);

        let comments = vec![
            comment("c1", "HATE speech here"),
            comment("c2", "a neutral remark"),
            comment("c3", "[deleted]"),
        ];
        let replies = vec![ReplyRecord {
            id: "r1".into(),
            parent_comment_id: "c1".into(),
            body: "COUNTER point".into(),
        }];

        let analyzer =
            BatchAnalyzer::new(comments, replies, fast_client(Arc::new(KeywordBackend::new())), &job);
        let summary = analyzer.process().await.unwrap();

        assert_eq!(summary.emitted, 1);
        let records: Vec<OutputRecord> = crate::read_jsonl(&job.output_path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "c1");
        assert_eq!(records[0].counter_hate_speech_count, 1);
        assert_eq!(records[0].total_replies, 1);
    }

    #[tokio::test]
    async fn test_checkpoint_advances_per_batch() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_config(dir.path(), 2);

        let comments = vec![
            comment("c1", "HATE one"),
            comment("c2", "neutral"),
            comment("c3", "HATE two"),
        ];

        let analyzer =
            BatchAnalyzer::new(comments, vec![], fast_client(Arc::new(KeywordBackend::new())), &job);
        analyzer.process().await.unwrap();

        let checkpoint = CheckpointStore::new(&job.checkpoint_path);
        assert_eq!(checkpoint.read().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unit_failures_are_dropped_but_batch_commits() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_config(dir.path(), 10);

        let comments = vec![comment("c1", "anything")];
        let analyzer =
            BatchAnalyzer::new(comments, vec![], fast_client(Arc::new(FailingBackend)), &job);

        let summary = analyzer.process().await.unwrap();
        assert_eq!(summary.emitted, 0);
        // the batch still committed past the failed unit
        assert_eq!(CheckpointStore::new(&job.checkpoint_path).read().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_completed_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_config(dir.path(), 2);

        let comments = vec![comment("c1", "HATE one"), comment("c2", "HATE two")];

        let analyzer = BatchAnalyzer::new(
            comments.clone(),
            vec![],
            fast_client(Arc::new(KeywordBackend::new())),
            &job,
        );
        let first = analyzer.process().await.unwrap();
        assert_eq!(first.emitted, 2);

        // a second invocation resumes past the end and emits nothing
        let analyzer = BatchAnalyzer::new(
            comments,
            vec![],
            fast_client(Arc::new(KeywordBackend::new())),
            &job,
        );
        let second = analyzer.process().await.unwrap();
        assert_eq!(second.emitted, 0);
        assert_eq!(second.resumed_from, 2);

        let records: Vec<OutputRecord> = crate::read_jsonl(&job.output_path).unwrap();
        assert_eq!(records.len(), 2);
    }
}
