//! Ingestion pipeline orchestration.
//!
//! Coordinates the flow for one file: loader → chunker → index store.
//! Chunks are committed in groups of `ingest.upsert_batch`, so a failure
//! midway through a large document keeps the groups already committed.
//! Loader and chunker errors abort before anything is written.

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

use docindex_core::chunk::{chunk_document, ChunkParams};
use docindex_core::models::DocType;
use docindex_core::IndexError;

use crate::config::Config;
use crate::index::IndexStore;
use crate::loader::load_document;

/// Outcome of ingesting one file.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub source: String,
    pub doc_type: DocType,
    pub segments: usize,
    pub chunks: usize,
    pub indexed: usize,
    pub batches: usize,
}

/// Load, chunk, and index one file.
///
/// The loader runs on a blocking thread. A panic inside it (the PDF
/// parser does this on some inputs) is reported as [`IndexError::Parse`].
pub async fn ingest_file(
    index: &IndexStore,
    path: &Path,
    doc_type: DocType,
    params: &ChunkParams,
    upsert_batch: usize,
) -> docindex_core::Result<IngestReport> {
    let owned: PathBuf = path.to_path_buf();
    let doc = tokio::task::spawn_blocking(move || load_document(&owned, doc_type))
        .await
        .map_err(|e| IndexError::parse(path.display(), format!("loader task failed: {}", e)))??;

    let chunks = chunk_document(&doc, params);
    tracing::info!(
        source = %doc.source,
        segments = doc.segments.len(),
        chunks = chunks.len(),
        "chunked document"
    );

    let mut indexed = 0;
    let mut batches = 0;
    for group in chunks.chunks(upsert_batch.max(1)) {
        indexed += index.upsert(group).await?;
        batches += 1;
        tracing::debug!(source = %doc.source, batch = batches, indexed, "committed batch");
    }

    Ok(IngestReport {
        source: doc.source,
        doc_type,
        segments: doc.segments.len(),
        chunks: chunks.len(),
        indexed,
        batches,
    })
}

/// `dix ingest`: index one file and print a summary.
pub async fn run_ingest(config: &Config, path: &Path, file_type: &str) -> Result<()> {
    let doc_type: DocType = file_type.parse()?;
    let params = config.chunking.params()?;
    let index = IndexStore::open(config).await?;

    let report = ingest_file(&index, path, doc_type, &params, config.ingest.upsert_batch).await?;

    println!("ingest {} ({})", report.source, report.doc_type);
    println!("  segments: {}", report.segments);
    println!("  chunks: {}", report.chunks);
    println!("  indexed: {} in {} batch(es)", report.indexed, report.batches);
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docindex_core::embedding::{EmbeddingProvider, HashProvider};
    use docindex_core::store::memory::InMemoryStore;
    use docindex_core::store::VectorStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FailOn(HashProvider, &'static str);

    #[async_trait]
    impl EmbeddingProvider for FailOn {
        fn model_name(&self) -> &str {
            self.0.model_name()
        }
        fn dims(&self) -> usize {
            self.0.dims()
        }
        async fn embed(&self, texts: &[String]) -> docindex_core::Result<Vec<Vec<f32>>> {
            if texts.iter().any(|t| t.contains(self.1)) {
                return Err(IndexError::Embedding("connection reset".to_string()));
            }
            self.0.embed(texts).await
        }
    }

    fn write(tmp: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = tmp.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_ingest_text_file() {
        let tmp = TempDir::new().unwrap();
        let text: String = "abcdefghij".repeat(270);
        let path = write(&tmp, "long.txt", &text);

        let store = Arc::new(InMemoryStore::new());
        let index = IndexStore::new(store.clone(), Arc::new(HashProvider::new(64).unwrap()), 16);
        let params = ChunkParams::new(1000, 200).unwrap();

        let report = ingest_file(&index, &path, DocType::Text, &params, 2)
            .await
            .unwrap();
        assert_eq!(report.segments, 1);
        assert_eq!(report.chunks, 4);
        assert_eq!(report.indexed, 4);
        assert_eq!(report.batches, 2);

        let entries = store.entries().await.unwrap();
        let offsets: Vec<usize> = entries.iter().map(|e| e.provenance.offset).collect();
        let lengths: Vec<usize> = entries.iter().map(|e| e.text.chars().count()).collect();
        assert_eq!(offsets, vec![0, 800, 1600, 2400]);
        assert_eq!(lengths, vec![1000, 1000, 1000, 300]);
    }

    #[tokio::test]
    async fn test_loader_failure_leaves_index_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "fake.pdf", "not a pdf at all");

        let store = Arc::new(InMemoryStore::new());
        let index = IndexStore::new(store.clone(), Arc::new(HashProvider::new(16).unwrap()), 16);
        let err = ingest_file(&index, &path, DocType::Pdf, &ChunkParams::default(), 8)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "parse_error");
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mid_document_failure_keeps_earlier_batches() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "poison.txt", "aaaaaaaaaabbbbbbbbbbPOISONccccdddddddddd");

        let store = Arc::new(InMemoryStore::new());
        let provider = FailOn(HashProvider::new(16).unwrap(), "POISON");
        let index = IndexStore::new(store.clone(), Arc::new(provider), 16);
        let params = ChunkParams::new(10, 0).unwrap();

        let err = ingest_file(&index, &path, DocType::Text, &params, 2)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "embedding_error");

        let texts: Vec<String> = store
            .entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.text)
            .collect();
        assert_eq!(texts, vec!["aaaaaaaaaa", "bbbbbbbbbb"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let store = Arc::new(InMemoryStore::new());
        let index = IndexStore::new(store, Arc::new(HashProvider::new(16).unwrap()), 16);
        let err = ingest_file(
            &index,
            Path::new("/nonexistent/notes.txt"),
            DocType::Text,
            &ChunkParams::default(),
            8,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "io_error");
    }
}
