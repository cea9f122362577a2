//! In-memory [`VectorStore`] implementation for testing and embedding.
//!
//! Keeps entries in a `Vec` behind `std::sync::RwLock`. Nothing survives
//! the process; use the SQLite store for durability.

use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{IndexError, Result};
use crate::models::{EmbeddingSpace, IndexEntry, PendingEntry};

use super::VectorStore;

#[derive(Default)]
struct Inner {
    space: Option<EmbeddingSpace>,
    entries: Vec<IndexEntry>,
    next_seq: i64,
}

/// In-memory store for tests and ephemeral indexes.
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_seq: 1,
                ..Inner::default()
            }),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> IndexError {
    IndexError::storage("in-memory store lock poisoned")
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn embedding_space(&self) -> Result<Option<EmbeddingSpace>> {
        Ok(self.inner.read().map_err(poisoned)?.space.clone())
    }

    async fn append(&self, space: &EmbeddingSpace, entries: &[PendingEntry]) -> Result<usize> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        super::ensure_same_space(inner.space.as_ref(), space)?;
        if entries.is_empty() {
            return Ok(0);
        }
        if inner.space.is_none() {
            inner.space = Some(space.clone());
        }
        for pending in entries {
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.entries.push(IndexEntry {
                seq,
                chunk_id: pending.chunk.id.clone(),
                text: pending.chunk.text.clone(),
                provenance: pending.chunk.provenance.clone(),
                vector: pending.vector.clone(),
            });
        }
        Ok(entries.len())
    }

    async fn entries(&self) -> Result<Vec<IndexEntry>> {
        Ok(self.inner.read().map_err(poisoned)?.entries.clone())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.read().map_err(poisoned)?.entries.len())
    }

    async fn source_count(&self) -> Result<usize> {
        let inner = self.inner.read().map_err(poisoned)?;
        let sources: HashSet<&str> = inner
            .entries
            .iter()
            .map(|e| e.provenance.source.as_str())
            .collect();
        Ok(sources.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::make_chunk;
    use crate::models::Provenance;

    fn pending(source: &str, text: &str) -> PendingEntry {
        let provenance = Provenance {
            source: source.to_string(),
            page: None,
            segment_index: 0,
            offset: 0,
        };
        PendingEntry {
            chunk: make_chunk(0, text, provenance),
            vector: vec![1.0, 0.0],
        }
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_seq() {
        let store = InMemoryStore::new();
        let space = EmbeddingSpace::new("m", 2);
        store
            .append(&space, &[pending("a", "one"), pending("a", "two")])
            .await
            .unwrap();
        store.append(&space, &[pending("b", "three")]).await.unwrap();

        let entries = store.entries().await.unwrap();
        let seqs: Vec<i64> = entries.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(store.count().await.unwrap(), 3);
        assert_eq!(store.source_count().await.unwrap(), 2);
        assert_eq!(store.embedding_space().await.unwrap(), Some(space));
    }

    #[tokio::test]
    async fn test_empty_append_records_nothing() {
        let store = InMemoryStore::new();
        let n = store.append(&EmbeddingSpace::new("m", 2), &[]).await.unwrap();
        assert_eq!(n, 0);
        assert_eq!(store.embedding_space().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_foreign_space_is_rejected() {
        let store = InMemoryStore::new();
        store
            .append(&EmbeddingSpace::new("m", 2), &[pending("a", "one")])
            .await
            .unwrap();
        let err = store
            .append(&EmbeddingSpace::new("other", 2), &[pending("a", "two")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "embedding_mismatch");
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
