//! Document loading.
//!
//! Turns a file on disk into a [`Document`]: one segment for a UTF-8 text
//! file, one segment per page (numbered from 1) for a PDF. Loading has no
//! side effects beyond reading the file.

use std::path::Path;

use docindex_core::models::{DocType, Document, Segment};
use docindex_core::{IndexError, Result};

/// Load `path` as a document of type `doc_type`.
///
/// # Errors
///
/// - [`IndexError::Io`] if the file cannot be read, or a text file is not valid UTF-8.
/// - [`IndexError::Parse`] if a PDF cannot be parsed. This includes inputs
///   that make the PDF parser panic; the panic message still appears on
///   stderr before the error is returned.
pub fn load_document(path: &Path, doc_type: DocType) -> Result<Document> {
    let source = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|e| IndexError::io(&source, e))?;

    let segments = match doc_type {
        DocType::Text => vec![Segment {
            text: decode_text(&source, bytes)?,
            page: None,
        }],
        DocType::Pdf => pdf_segments(&source, &bytes)?,
    };

    tracing::debug!(source = %source, %doc_type, segments = segments.len(), "loaded document");

    Ok(Document {
        source,
        doc_type,
        segments,
    })
}

fn decode_text(source: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| IndexError::io(source, format!("not valid UTF-8: {}", e)))
}

fn pdf_segments(source: &str, bytes: &[u8]) -> Result<Vec<Segment>> {
    // pdf-extract panics on some malformed inputs instead of returning Err.
    // The panic is reported as Parse, but the default panic hook has
    // already written its `thread panicked at` message to stderr.
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| IndexError::parse(source, "PDF parser aborted on malformed input"))?
        .map_err(|e| IndexError::parse(source, e))?;

    Ok(pages
        .into_iter()
        .enumerate()
        .map(|(i, text)| Segment {
            text,
            page: Some(i as u32 + 1),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_text_file_is_one_segment() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, "héllo wörld\nsecond line").unwrap();

        let doc = load_document(&path, DocType::Text).unwrap();
        assert_eq!(doc.doc_type, DocType::Text);
        assert_eq!(doc.segments.len(), 1);
        assert_eq!(doc.segments[0].text, "héllo wörld\nsecond line");
        assert_eq!(doc.segments[0].page, None);
        assert!(doc.source.ends_with("notes.txt"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_document(Path::new("/nonexistent/file.txt"), DocType::Text).unwrap_err();
        assert_eq!(err.kind(), "io_error");

        let err = load_document(Path::new("/nonexistent/file.pdf"), DocType::Pdf).unwrap_err();
        assert_eq!(err.kind(), "io_error");
    }

    #[test]
    fn test_invalid_utf8_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("latin1.txt");
        std::fs::write(&path, [0x66, 0x6f, 0xff, 0xfe]).unwrap();

        let err = load_document(&path, DocType::Text).unwrap_err();
        assert_eq!(err.kind(), "io_error");
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_invalid_pdf_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = load_document(&path, DocType::Pdf).unwrap_err();
        assert_eq!(err.kind(), "parse_error");
    }
}
