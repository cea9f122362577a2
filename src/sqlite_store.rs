//! SQLite-backed [`VectorStore`] implementation.
//!
//! Entries live in one append-only table; the embedding space lives in a
//! single-row `index_meta` table written by the first commit. Every
//! [`append`](VectorStore::append) runs inside one transaction.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::path::Path;

use docindex_core::embedding::{blob_to_vec, vec_to_blob};
use docindex_core::models::{EmbeddingSpace, IndexEntry, PendingEntry, Provenance};
use docindex_core::store::{ensure_same_space, VectorStore};
use docindex_core::IndexError;

use crate::db;
use crate::migrate;

/// SQLite implementation of the [`VectorStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the index database at `path` and bring
    /// its schema up to date.
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = db::connect(path).await?;
        migrate::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn storage(err: sqlx::Error) -> IndexError {
    IndexError::storage(err)
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn embedding_space(&self) -> docindex_core::Result<Option<EmbeddingSpace>> {
        let row = sqlx::query("SELECT model, dims FROM index_meta WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        Ok(row.map(|r| {
            let dims: i64 = r.get("dims");
            EmbeddingSpace::new(r.get::<String, _>("model"), dims as usize)
        }))
    }

    async fn append(
        &self,
        space: &EmbeddingSpace,
        entries: &[PendingEntry],
    ) -> docindex_core::Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await.map_err(storage)?;

        // Read inside the transaction so a concurrent writer cannot record
        // a different space between the check and the insert.
        let stored = sqlx::query("SELECT model, dims FROM index_meta WHERE id = 1")
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage)?
            .map(|r| {
                let dims: i64 = r.get("dims");
                EmbeddingSpace::new(r.get::<String, _>("model"), dims as usize)
            });
        ensure_same_space(stored.as_ref(), space)?;

        if stored.is_none() {
            sqlx::query("INSERT INTO index_meta (id, model, dims, created_at) VALUES (1, ?, ?, ?)")
                .bind(&space.model)
                .bind(space.dims as i64)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(storage)?;
        }

        for pending in entries {
            let chunk = &pending.chunk;
            sqlx::query(
                r#"
                INSERT INTO entries (chunk_id, source, page, segment_index, chunk_index,
                                     char_offset, text, hash, embedding, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&chunk.id)
            .bind(&chunk.provenance.source)
            .bind(chunk.provenance.page.map(i64::from))
            .bind(chunk.provenance.segment_index as i64)
            .bind(chunk.chunk_index as i64)
            .bind(chunk.provenance.offset as i64)
            .bind(&chunk.text)
            .bind(&chunk.hash)
            .bind(vec_to_blob(&pending.vector))
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        }

        tx.commit().await.map_err(storage)?;
        Ok(entries.len())
    }

    async fn entries(&self) -> docindex_core::Result<Vec<IndexEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT seq, chunk_id, source, page, segment_index, char_offset, text, embedding
            FROM entries
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(rows
            .iter()
            .map(|row| {
                let page: Option<i64> = row.get("page");
                let segment_index: i64 = row.get("segment_index");
                let offset: i64 = row.get("char_offset");
                let blob: Vec<u8> = row.get("embedding");
                IndexEntry {
                    seq: row.get("seq"),
                    chunk_id: row.get("chunk_id"),
                    text: row.get("text"),
                    provenance: Provenance {
                        source: row.get("source"),
                        page: page.map(|p| p as u32),
                        segment_index: segment_index as usize,
                        offset: offset as usize,
                    },
                    vector: blob_to_vec(&blob),
                }
            })
            .collect())
    }

    async fn count(&self) -> docindex_core::Result<usize> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries")
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        Ok(n as usize)
    }

    async fn source_count(&self) -> docindex_core::Result<usize> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT source) FROM entries")
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        Ok(n as usize)
    }
}
