//! The index store handle.
//!
//! [`IndexStore`] owns a [`VectorStore`] backend and the
//! [`EmbeddingProvider`] used to embed both chunks and queries. It is
//! constructed explicitly and shared by reference (usually in an `Arc`)
//! between ingestion, retrieval, the tool registry, and the HTTP server.
//!
//! # Consistency
//!
//! - `upsert` holds the write side of an internal lock, `query` and
//!   `stats` hold the read side. Two upserts never interleave and a query
//!   sees the index either before or after an upsert, never in between.
//! - `upsert` embeds every chunk before touching storage and commits all
//!   entries in one transaction, so a failed call commits nothing.
//! - The embedding space of the first commit is recorded; a provider with
//!   a different `(model, dims)` is rejected with
//!   [`IndexError::EmbeddingMismatch`].

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use docindex_core::embedding::{validate_vectors, EmbeddingProvider};
use docindex_core::models::{Chunk, EmbeddingSpace, PendingEntry, QueryHit};
use docindex_core::search::rank_entries;
use docindex_core::store::{ensure_same_space, VectorStore};
use docindex_core::{IndexError, Result};

use crate::config::Config;
use crate::embedding::create_provider;
use crate::sqlite_store::SqliteStore;

/// Summary of what an index holds.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IndexStats {
    pub entries: usize,
    pub sources: usize,
    pub space: Option<EmbeddingSpace>,
}

pub struct IndexStore {
    store: Arc<dyn VectorStore>,
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    gate: RwLock<()>,
}

impl IndexStore {
    /// Wrap a backend and a provider. `batch_size` bounds the number of
    /// texts sent to the provider per `embed` call.
    pub fn new(
        store: Arc<dyn VectorStore>,
        provider: Arc<dyn EmbeddingProvider>,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            provider,
            batch_size: batch_size.max(1),
            gate: RwLock::new(()),
        }
    }

    /// Open the SQLite store at `config.store.path` (creating it if
    /// missing) with the configured embedding provider.
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let provider = create_provider(&config.embedding)?;
        let store = SqliteStore::open(&config.store.path).await?;
        tracing::debug!(
            path = %config.store.path.display(),
            provider = %provider.space(),
            "opened index store"
        );
        Ok(Self::new(
            Arc::new(store),
            provider,
            config.embedding.batch_size,
        ))
    }

    pub fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    /// Embed `chunks` and append them as new entries.
    ///
    /// Returns the number of entries committed. An empty slice is a no-op.
    ///
    /// # Errors
    ///
    /// - [`IndexError::EmbeddingMismatch`] if the provider's space differs from the recorded one.
    /// - [`IndexError::Embedding`] if the provider fails or returns malformed output.
    /// - [`IndexError::Storage`] if the commit fails.
    ///
    /// In every error case no entry from this call is committed.
    pub async fn upsert(&self, chunks: &[Chunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let _guard = self.gate.write().await;
        let space = self.provider.space();
        let stored = self.store.embedding_space().await?;
        ensure_same_space(stored.as_ref(), &space)?;

        let mut pending = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.provider.embed(&texts).await?;
            validate_vectors(texts.len(), space.dims, &vectors)?;

            pending.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(vectors)
                    .map(|(chunk, vector)| PendingEntry { chunk, vector }),
            );
        }

        let committed = self.store.append(&space, &pending).await?;
        tracing::info!(committed, space = %space, "upsert committed");
        Ok(committed)
    }

    /// Return the `k` entries most similar to `text`, best first.
    ///
    /// Fewer than `k` entries yields all of them; `k == 0` yields none.
    ///
    /// # Errors
    ///
    /// - [`IndexError::EmptyIndex`] if nothing has been committed yet.
    /// - [`IndexError::EmbeddingMismatch`] if the provider's space differs from the recorded one.
    /// - [`IndexError::Embedding`] if embedding the query fails.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<QueryHit>> {
        let _guard = self.gate.read().await;

        let stored = match self.store.embedding_space().await? {
            Some(space) => space,
            None => return Err(IndexError::EmptyIndex),
        };
        if self.store.count().await? == 0 {
            return Err(IndexError::EmptyIndex);
        }

        let space = self.provider.space();
        ensure_same_space(Some(&stored), &space)?;

        if k == 0 {
            return Ok(Vec::new());
        }

        let vectors = self.provider.embed(&[text.to_string()]).await?;
        validate_vectors(1, space.dims, &vectors)?;

        let entries = self.store.entries().await?;
        let hits = rank_entries(&vectors[0], &entries, k);
        tracing::debug!(k, candidates = entries.len(), returned = hits.len(), "query");
        Ok(hits)
    }

    pub async fn stats(&self) -> Result<IndexStats> {
        let _guard = self.gate.read().await;
        Ok(IndexStats {
            entries: self.store.count().await?,
            sources: self.store.source_count().await?,
            space: self.store.embedding_space().await?,
        })
    }
}
