//! Sliding-window text chunker.
//!
//! Splits each [`Segment`] of a [`Document`] into overlapping windows of at
//! most `max_chars` characters. Consecutive windows start `max_chars -
//! overlap_chars` characters apart, so each chunk repeats the tail of its
//! predecessor. Windows never cross a segment boundary.
//!
//! Lengths and offsets count Unicode scalar values, not bytes, so a window
//! never splits a multi-byte character.
//!
//! Each chunk receives a random UUID plus a SHA-256 hash of its text.
//!
//! # Example
//!
//! ```rust
//! use docindex_core::chunk::{chunk_text, ChunkParams};
//!
//! let params = ChunkParams::new(10, 4).unwrap();
//! let windows = chunk_text("abcdefghijklmnop", &params);
//! assert_eq!(windows, vec![(0, "abcdefghij"), (6, "ghijklmnop"), (12, "mnop")]);
//! ```

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{IndexError, Result};
use crate::models::{Chunk, Document, Provenance};

/// Window length and overlap, validated so every step makes progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    max_chars: usize,
    overlap_chars: usize,
}

impl ChunkParams {
    /// # Errors
    ///
    /// [`IndexError::Config`] if `max_chars` is zero or the overlap is not
    /// strictly smaller than `max_chars`.
    pub fn new(max_chars: usize, overlap_chars: usize) -> Result<Self> {
        if max_chars == 0 {
            return Err(IndexError::Config("max_chars must be > 0".to_string()));
        }
        if overlap_chars >= max_chars {
            return Err(IndexError::Config(format!(
                "overlap_chars ({}) must be smaller than max_chars ({})",
                overlap_chars, max_chars
            )));
        }
        Ok(Self {
            max_chars,
            overlap_chars,
        })
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn overlap_chars(&self) -> usize {
        self.overlap_chars
    }

    /// Distance between consecutive window starts.
    pub fn step(&self) -> usize {
        self.max_chars - self.overlap_chars
    }
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            max_chars: 1000,
            overlap_chars: 200,
        }
    }
}

/// Slide the window over one text, returning `(char_offset, window)` pairs.
///
/// Emits a window at every start `0, step, 2·step, …` below the text
/// length; the last window may be shorter than `max_chars`. Empty text
/// yields no windows.
pub fn chunk_text<'a>(text: &'a str, params: &ChunkParams) -> Vec<(usize, &'a str)> {
    // Byte position of every char boundary, including the end of the text.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = bounds.len() - 1;

    let mut windows = Vec::with_capacity(char_len / params.step() + 1);
    let mut start = 0;
    while start < char_len {
        let end = (start + params.max_chars).min(char_len);
        windows.push((start, &text[bounds[start]..bounds[end]]));
        start += params.step();
    }
    windows
}

/// Chunk every segment of a document, in order.
///
/// Chunk indices are contiguous from 0 across the whole document.
pub fn chunk_document(doc: &Document, params: &ChunkParams) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for (segment_index, segment) in doc.segments.iter().enumerate() {
        for (offset, window) in chunk_text(&segment.text, params) {
            let provenance = Provenance {
                source: doc.source.clone(),
                page: segment.page,
                segment_index,
                offset,
            };
            chunks.push(make_chunk(chunks.len(), window, provenance));
        }
    }
    chunks
}

/// Build a chunk with a fresh id and a content hash.
pub fn make_chunk(chunk_index: usize, text: &str, provenance: Provenance) -> Chunk {
    Chunk {
        id: Uuid::new_v4().to_string(),
        chunk_index,
        text: text.to_string(),
        hash: content_hash(text),
        provenance,
    }
}

/// SHA-256 hex digest of a chunk's text.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocType, Segment};

    fn params(l: usize, o: usize) -> ChunkParams {
        ChunkParams::new(l, o).unwrap()
    }

    fn text_of_len(n: usize) -> String {
        (0..n)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect()
    }

    #[test]
    fn test_rejects_overlap_not_below_length() {
        assert!(ChunkParams::new(100, 100).is_err());
        assert!(ChunkParams::new(100, 150).is_err());
        assert!(ChunkParams::new(0, 0).is_err());
        assert!(ChunkParams::new(100, 99).is_ok());
    }

    #[test]
    fn test_short_segment_single_chunk() {
        let windows = chunk_text("Hello, world!", &params(1000, 200));
        assert_eq!(windows, vec![(0, "Hello, world!")]);
    }

    #[test]
    fn test_empty_segment_no_chunks() {
        assert!(chunk_text("", &params(1000, 200)).is_empty());
    }

    #[test]
    fn test_2700_chars_matches_reference_layout() {
        let text = text_of_len(2700);
        let windows = chunk_text(&text, &params(1000, 200));
        let starts: Vec<usize> = windows.iter().map(|(s, _)| *s).collect();
        let lens: Vec<usize> = windows.iter().map(|(_, w)| w.chars().count()).collect();
        assert_eq!(starts, vec![0, 800, 1600, 2400]);
        assert_eq!(lens, vec![1000, 1000, 1000, 300]);
    }

    #[test]
    fn test_2500_chars_layout() {
        let text = text_of_len(2500);
        let windows = chunk_text(&text, &params(1000, 200));
        let starts: Vec<usize> = windows.iter().map(|(s, _)| *s).collect();
        let lens: Vec<usize> = windows.iter().map(|(_, w)| w.chars().count()).collect();
        assert_eq!(starts, vec![0, 800, 1600, 2400]);
        assert_eq!(lens, vec![1000, 1000, 900, 100]);
    }

    #[test]
    fn test_overlap_repeats_previous_tail() {
        let text = text_of_len(1500);
        let windows = chunk_text(&text, &params(1000, 200));
        let first_tail: String = windows[0].1.chars().skip(800).collect();
        let second_head: String = windows[1].1.chars().take(200).collect();
        assert_eq!(first_tail, second_head);
    }

    #[test]
    fn test_prefixes_reconstruct_segment() {
        let samples = [
            text_of_len(1),
            text_of_len(999),
            text_of_len(1000),
            text_of_len(1001),
            text_of_len(4321),
            "héllo wörld — ünïcode ✓ ".repeat(40),
        ];
        for (l, o) in [(1000, 200), (7, 3), (5, 0), (2, 1)] {
            let p = params(l, o);
            for text in &samples {
                let rebuilt: String = chunk_text(text, &p)
                    .iter()
                    .flat_map(|(_, w)| w.chars().take(p.step()))
                    .collect();
                assert_eq!(&rebuilt, text, "L={} O={}", l, o);
            }
        }
    }

    #[test]
    fn test_multibyte_boundaries() {
        let text = "日本語のテキストを分割する";
        let windows = chunk_text(text, &params(4, 1));
        assert_eq!(windows[0], (0, "日本語の"));
        assert_eq!(windows[1], (3, "のテキス"));
        for (_, w) in &windows {
            assert!(w.chars().count() <= 4);
        }
    }

    #[test]
    fn test_document_chunks_stay_within_segments() {
        let doc = Document {
            source: "report.pdf".to_string(),
            doc_type: DocType::Pdf,
            segments: vec![
                Segment {
                    text: "a".repeat(15),
                    page: Some(1),
                },
                Segment {
                    text: String::new(),
                    page: Some(2),
                },
                Segment {
                    text: "b".repeat(6),
                    page: Some(3),
                },
            ],
        };
        let chunks = chunk_document(&doc, &params(10, 2));
        let layout: Vec<(usize, Option<u32>, usize, usize)> = chunks
            .iter()
            .map(|c| {
                (
                    c.chunk_index,
                    c.provenance.page,
                    c.provenance.offset,
                    c.text.len(),
                )
            })
            .collect();
        assert_eq!(
            layout,
            vec![
                (0, Some(1), 0, 10),
                (1, Some(1), 8, 7),
                (2, Some(3), 0, 6),
            ]
        );
        assert!(chunks.iter().all(|c| !c.text.contains('a') || !c.text.contains('b')));
        assert_eq!(chunks[2].provenance.segment_index, 2);
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(content_hash("alpha"), content_hash("alpha"));
        assert_ne!(content_hash("alpha"), content_hash("beta"));
        assert_eq!(content_hash("alpha").len(), 64);
    }
}
