//! Error taxonomy shared by every docindex operation.
//!
//! Each variant maps to one failure class of the ingestion/retrieval
//! pipeline and carries a human-readable message. [`IndexError::kind`]
//! gives a stable machine-readable tag for transports (HTTP, tool calls).

use thiserror::Error;

use crate::models::EmbeddingSpace;

/// Result type alias for docindex operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Every failure the loader, chunker, and index store can report.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The source file could not be opened, read, or decoded.
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },

    /// The source file is not a valid document of its declared type.
    #[error("cannot parse {path}: {message}")]
    Parse { path: String, message: String },

    /// The embedding provider was unreachable or returned malformed output.
    #[error("embedding provider failed: {0}")]
    Embedding(String),

    /// A query was issued before anything was ingested.
    #[error("no documents have been indexed yet")]
    EmptyIndex,

    /// The provider's embedding space differs from the one the index was built with.
    #[error("embedding space mismatch: index was built with {stored}, provider produces {requested}")]
    EmbeddingMismatch {
        stored: EmbeddingSpace,
        requested: EmbeddingSpace,
    },

    /// Invalid parameters or configuration (chunk sizes, type tags, ...).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The persistent store failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl IndexError {
    /// Stable tag for this error class.
    pub fn kind(&self) -> &'static str {
        match self {
            IndexError::Io { .. } => "io_error",
            IndexError::Parse { .. } => "parse_error",
            IndexError::Embedding(_) => "embedding_error",
            IndexError::EmptyIndex => "empty_index",
            IndexError::EmbeddingMismatch { .. } => "embedding_mismatch",
            IndexError::Config(_) => "config_error",
            IndexError::Storage(_) => "storage_error",
        }
    }

    /// `true` for the expected first-use state, which callers should
    /// treat as "no results available".
    pub fn is_empty_index(&self) -> bool {
        matches!(self, IndexError::EmptyIndex)
    }

    pub fn io(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        IndexError::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub fn parse(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        IndexError::Parse {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        IndexError::Storage(err.to_string())
    }
}
