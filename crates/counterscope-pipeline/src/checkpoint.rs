//! Durable last-completed-index store
//!
//! A single text file holding one ASCII decimal integer: the absolute
//! index of the last fully-committed batch boundary. Always a
//! whole-file overwrite, never an append. Owned exclusively by the
//! batch orchestrator; not safe for concurrent writers.

use counterscope_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Value reported when no checkpoint has been written yet
pub const NO_PROGRESS: i64 = -1;

/// File-backed checkpoint store
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Create a store over the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the last committed index; `NO_PROGRESS` when the file does
    /// not exist
    pub fn read(&self) -> Result<i64> {
        if !self.path.exists() {
            return Ok(NO_PROGRESS);
        }
        let content = std::fs::read_to_string(&self.path)?;
        content
            .trim()
            .parse()
            .map_err(|_| Error::internal(format!("invalid checkpoint value: {:?}", content.trim())))
    }

    /// Durably overwrite the stored index
    pub fn write(&self, index: i64) -> Result<()> {
        std::fs::write(&self.path, index.to_string())?;
        debug!(index, path = %self.path.display(), "checkpoint written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_no_progress() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.txt"));
        assert_eq!(store.read().unwrap(), NO_PROGRESS);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.txt"));

        store.write(799).unwrap();
        assert_eq!(store.read().unwrap(), 799);

        // whole-file overwrite, not append
        store.write(1599).unwrap();
        assert_eq!(store.read().unwrap(), 1599);
    }

    #[test]
    fn test_values_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.txt");

        CheckpointStore::new(&path).write(42).unwrap();
        assert_eq!(CheckpointStore::new(&path).read().unwrap(), 42);
    }

    #[test]
    fn test_garbage_content_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.txt");
        std::fs::write(&path, "not a number").unwrap();

        assert!(CheckpointStore::new(&path).read().is_err());
    }

    #[test]
    fn test_monotone_sequence_of_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.txt"));

        let mut last = NO_PROGRESS;
        for index in [99, 199, 299, 399] {
            store.write(index).unwrap();
            let read = store.read().unwrap();
            assert!(read >= last);
            last = read;
        }
    }
}
