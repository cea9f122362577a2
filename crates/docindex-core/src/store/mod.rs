//! Storage abstraction for the document index.
//!
//! The [`VectorStore`] trait defines the append-only persistence the
//! index store needs: record the embedding space, commit entries
//! atomically, and scan everything back in insertion order. Backends:
//! SQLite (app crate) and [`memory::InMemoryStore`].
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;

use crate::error::{IndexError, Result};
use crate::models::{EmbeddingSpace, IndexEntry, PendingEntry};

/// Abstract append-only vector storage.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`embedding_space`](VectorStore::embedding_space) | Space recorded by the first commit |
/// | [`append`](VectorStore::append) | Commit a batch of entries, all or nothing |
/// | [`entries`](VectorStore::entries) | Every committed entry, by insertion order |
/// | [`count`](VectorStore::count) | Number of committed entries |
/// | [`source_count`](VectorStore::source_count) | Number of distinct source documents |
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The embedding space recorded by the first successful append, if any.
    async fn embedding_space(&self) -> Result<Option<EmbeddingSpace>>;

    /// Append entries atomically. Records `space` if none is recorded yet.
    ///
    /// Either every entry is committed or none is. Returns the number of
    /// entries committed.
    async fn append(&self, space: &EmbeddingSpace, entries: &[PendingEntry]) -> Result<usize>;

    /// All committed entries ordered by ascending `seq`.
    async fn entries(&self) -> Result<Vec<IndexEntry>>;

    /// Number of committed entries.
    async fn count(&self) -> Result<usize>;

    /// Number of distinct sources among committed entries.
    async fn source_count(&self) -> Result<usize>;
}

/// Fail with [`IndexError::EmbeddingMismatch`] when a recorded space
/// differs from the provider's.
pub fn ensure_same_space(stored: Option<&EmbeddingSpace>, requested: &EmbeddingSpace) -> Result<()> {
    match stored {
        Some(stored) if stored != requested => Err(IndexError::EmbeddingMismatch {
            stored: stored.clone(),
            requested: requested.clone(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_space_passes() {
        let space = EmbeddingSpace::new("m", 4);
        assert!(ensure_same_space(None, &space).is_ok());
        assert!(ensure_same_space(Some(&space.clone()), &space).is_ok());
    }

    #[test]
    fn test_dims_or_model_change_is_mismatch() {
        let stored = EmbeddingSpace::new("m", 4);
        let err = ensure_same_space(Some(&stored), &EmbeddingSpace::new("m", 8)).unwrap_err();
        assert_eq!(err.kind(), "embedding_mismatch");
        let err = ensure_same_space(Some(&stored), &EmbeddingSpace::new("n", 4)).unwrap_err();
        assert_eq!(err.kind(), "embedding_mismatch");
    }
}
