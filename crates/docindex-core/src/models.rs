//! Core data models used throughout docindex.
//!
//! These types represent the documents, chunks, and index entries that
//! flow through the ingestion and retrieval pipeline:
//!
//! ```text
//! Document ──▶ Segment* ──▶ Chunk* ──▶ PendingEntry* ──▶ IndexEntry* ──▶ QueryHit*
//!   (load)                   (chunk)     (embed)           (commit)        (query)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// Declared type of a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Text,
    Pdf,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Text => "text",
            DocType::Pdf => "pdf",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = IndexError;

    /// Accepts `text`/`txt` and `pdf`, case-insensitively. Anything else is
    /// rejected rather than silently treated as text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(DocType::Text),
            "pdf" => Ok(DocType::Pdf),
            other => Err(IndexError::Config(format!(
                "unsupported document type '{}': expected text, txt, or pdf",
                other
            ))),
        }
    }
}

/// One raw span of loaded text: a whole text file, or one PDF page.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    /// 1-based page number for PDF pages, `None` for plain text.
    pub page: Option<u32>,
}

/// A loaded source document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Source path as given by the caller.
    pub source: String,
    pub doc_type: DocType,
    /// Segments in document order.
    pub segments: Vec<Segment>,
}

/// Where a chunk came from within its source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub source: String,
    pub page: Option<u32>,
    /// Index of the segment within the document.
    pub segment_index: usize,
    /// Character offset of the chunk within its segment.
    pub offset: usize,
}

/// A bounded window of one segment's text.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    /// Position of the chunk within its document, contiguous from 0.
    pub chunk_index: usize,
    pub text: String,
    /// SHA-256 hex digest of `text`.
    pub hash: String,
    pub provenance: Provenance,
}

/// Identity of an embedding space: vectors are only comparable when
/// both model and dimensionality match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmbeddingSpace {
    pub model: String,
    pub dims: usize,
}

impl EmbeddingSpace {
    pub fn new(model: impl Into<String>, dims: usize) -> Self {
        Self {
            model: model.into(),
            dims,
        }
    }
}

impl fmt::Display for EmbeddingSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.model, self.dims)
    }
}

/// A chunk paired with its embedding, waiting to be committed.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// A committed (chunk text, vector, provenance) triple.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Insertion sequence; earlier entries have smaller values.
    pub seq: i64,
    pub chunk_id: String,
    pub text: String,
    pub provenance: Provenance,
    pub vector: Vec<f32>,
}

/// A ranked retrieval result.
#[derive(Debug, Clone, Serialize)]
pub struct QueryHit {
    pub seq: i64,
    pub text: String,
    pub provenance: Provenance,
    /// Cosine similarity to the query vector.
    pub score: f32,
}
