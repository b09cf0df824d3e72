//! Corpus IO and the reply index
//!
//! The acquisition layer delivers two flat JSONL collections: comments
//! (root nodes) and replies. Replies are re-keyed once at load time
//! into a parent-id index for O(1) child lookup; the index is
//! read-only during processing.

use counterscope_core::{ReplyRecord, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Read a line-delimited JSON file into records
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

/// Append records to a line-delimited JSON file, creating it if needed
pub fn append_jsonl<T: Serialize>(records: &[T], path: &Path) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);

    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Mapping from parent identifier to its ordered direct replies.
///
/// Built once at load time. Every reply lands in exactly one bucket
/// (its parent's), preserving input order within the bucket.
#[derive(Debug, Default)]
pub struct ReplyIndex {
    buckets: HashMap<String, Vec<ReplyRecord>>,
    total: usize,
}

impl ReplyIndex {
    /// Build the index from flat reply records
    pub fn build(replies: Vec<ReplyRecord>) -> Self {
        let total = replies.len();
        let mut buckets: HashMap<String, Vec<ReplyRecord>> = HashMap::new();
        for reply in replies {
            buckets
                .entry(reply.parent_comment_id.clone())
                .or_default()
                .push(reply);
        }
        Self { buckets, total }
    }

    /// Ordered direct replies of the given parent
    pub fn children(&self, parent_id: &str) -> &[ReplyRecord] {
        self.buckets
            .get(parent_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total replies indexed
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
