//! Error types for counterscope

/// Result type alias using counterscope's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for counterscope operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transient transport or rate-limit fault, surfaced after the
    /// backend retry budget is exhausted
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A root node's subtree classification could not complete
    #[error("unit of work failed: {0}")]
    UnitOfWork(String),

    /// An uncaught fault escaped the worker pool for a whole batch
    #[error("batch failed: {0}")]
    Batch(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new backend-unavailable error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Create a new unit-of-work error
    pub fn unit(msg: impl Into<String>) -> Self {
        Self::UnitOfWork(msg.into())
    }

    /// Create a new batch error
    pub fn batch(msg: impl Into<String>) -> Self {
        Self::Batch(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
