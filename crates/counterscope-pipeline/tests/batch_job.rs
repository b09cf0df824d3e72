//! End-to-end batch job tests over a scripted backend
//!
//! Exercises the resumability contract: stopping after a batch and
//! re-invoking must never lose a committed record, and re-running a
//! finished job must not reprocess anything.

use counterscope_backend::testing::KeywordBackend;
use counterscope_backend::ClassifierClient;
use counterscope_core::{CommentRecord, JobConfig, OutputRecord, ReplyRecord, RetryPolicy};
use counterscope_pipeline::{read_jsonl, BatchAnalyzer, CheckpointStore};
use std::path::Path;
use std::sync::Arc;

fn client() -> ClassifierClient {
    ClassifierClient::new(
        Arc::new(KeywordBackend::new()),
        RetryPolicy {
            max_attempts: 1,
            base_delay_secs: 0,
            multiplier: 1.0,
            max_delay_secs: 0,
        },
    )
}

fn job(dir: &Path, batch_size: usize) -> JobConfig {
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
        score: 0,
        total_replies: 0,
    }
}

fn corpus() -> (Vec<CommentRecord>, Vec<ReplyRecord>) {
    let comments = vec![
        comment("c1", "HATE the first"),
        comment("c2", "a neutral aside"),
        comment("c3", "HATE the second"),
        comment("c4", "HATE the third"),
    ];
    let replies = vec![
        ReplyRecord {
            id: "r1".into(),
            parent_comment_id: "c1".into(),
            body: "COUNTER argument".into(),
        },
        ReplyRecord {
            id: "r2".into(),
            parent_comment_id: "c3".into(),
            body: "more HATE".into(),
        },
        ReplyRecord {
            id: "r3".into(),
            parent_comment_id: "r2".into(),
            body: "COUNTER to the nested one".into(),
        },
    ];
    (comments, replies)
}

fn emitted_ids(path: &Path) -> Vec<String> {
    let records: Vec<OutputRecord> = read_jsonl(path).unwrap();
    records.into_iter().map(|r| r.id).collect()
}

#[tokio::test]
async fn interrupted_run_resumes_without_losing_records() {
    let (comments, replies) = corpus();

    // uninterrupted baseline
    let baseline_dir = tempfile::tempdir().unwrap();
    let baseline_job = job(baseline_dir.path(), 2);
    BatchAnalyzer::new(comments.clone(), replies.clone(), client(), &baseline_job)
        .process()
        .await
        .unwrap();
    let baseline = emitted_ids(&baseline_job.output_path);

    // interrupted run: only the first batch's worth of comments is
    // processed before the "crash"
    let dir = tempfile::tempdir().unwrap();
    let interrupted_job = job(dir.path(), 2);
    BatchAnalyzer::new(
        comments[..2].to_vec(),
        replies.clone(),
        client(),
        &interrupted_job,
    )
    .process()
    .await
    .unwrap();
    assert_eq!(
        CheckpointStore::new(&interrupted_job.checkpoint_path)
            .read()
            .unwrap(),
        1
    );

    // resume with the full corpus against the same paths
    let summary = BatchAnalyzer::new(comments, replies, client(), &interrupted_job)
        .process()
        .await
        .unwrap();
    assert_eq!(summary.resumed_from, 2);

    assert_eq!(emitted_ids(&interrupted_job.output_path), baseline);
}

#[tokio::test]
async fn finished_job_reinvocation_is_a_no_op() {
    let (comments, replies) = corpus();
    let dir = tempfile::tempdir().unwrap();
    let config = job(dir.path(), 3);

    BatchAnalyzer::new(comments.clone(), replies.clone(), client(), &config)
        .process()
        .await
        .unwrap();
    let after_first = emitted_ids(&config.output_path);

    let summary = BatchAnalyzer::new(comments, replies, client(), &config)
        .process()
        .await
        .unwrap();

    assert_eq!(summary.emitted, 0);
    assert_eq!(emitted_ids(&config.output_path), after_first);
}

#[tokio::test]
async fn subtree_counts_survive_the_full_pipeline() {
    let (comments, replies) = corpus();
    let dir = tempfile::tempdir().unwrap();
    let config = job(dir.path(), 10);

    BatchAnalyzer::new(comments, replies, client(), &config)
        .process()
        .await
        .unwrap();

    let records: Vec<OutputRecord> = read_jsonl(&config.output_path).unwrap();
    let c3 = records.iter().find(|r| r.id == "c3").unwrap();
    assert_eq!(c3.hate_speech_counts, 1);
    assert_eq!(c3.counter_hate_speech_count, 1);
    assert_eq!(c3.total_replies, 2);

    let c4 = records.iter().find(|r| r.id == "c4").unwrap();
    assert_eq!(c4.total_replies, 0);
}
