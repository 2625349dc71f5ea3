//! Document loading.
//!
//! The format is chosen from the file extension. PDF text extraction is
//! delegated to `pdf-extract`; every other file is read as UTF-8 text
//! verbatim. Any failure is a [`RagError::Input`] and aborts the whole
//! document: there is no partial extraction.

use std::path::{Path, PathBuf};

use pocket_rag_core::RagError;
use walkdir::WalkDir;

/// Format tag derived from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    PlainText,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Self {
        if ext.eq_ignore_ascii_case("pdf") {
            Self::Pdf
        } else {
            Self::PlainText
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::PlainText)
    }
}

/// Why a document's bytes could not be turned into text.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("not valid UTF-8 text: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Load a document's plain text.
pub fn load_document(path: &Path) -> Result<String, RagError> {
    let format = DocumentFormat::from_path(path);
    tracing::debug!(path = %path.display(), ?format, "loading document");

    let bytes = std::fs::read(path).map_err(|e| RagError::input(path, e))?;
    extract_text(&bytes, format).map_err(|e| RagError::input(path, e))
}

/// Extract plain text from in-memory bytes.
pub fn extract_text(bytes: &[u8], format: DocumentFormat) -> Result<String, ExtractError> {
    match format {
        DocumentFormat::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::Pdf(e.to_string())),
        DocumentFormat::PlainText => Ok(String::from_utf8(bytes.to_vec())?),
    }
}

/// Expand a path into the documents it names.
///
/// A file is returned as-is. A directory is walked recursively (following
/// symlinks, skipping hidden entries) and its regular files are returned in
/// sorted order so ingestion order is deterministic.
pub fn collect_documents(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        return vec![root.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()))
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                tracing::warn!("skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.pdf")), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_path(Path::new("A.PDF")), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_path(Path::new("a.md")), DocumentFormat::PlainText);
        assert_eq!(DocumentFormat::from_path(Path::new("README")), DocumentFormat::PlainText);
    }

    #[test]
    fn plain_text_is_verbatim() {
        let text = extract_text("  keep\n\nwhitespace  ".as_bytes(), DocumentFormat::PlainText).unwrap();
        assert_eq!(text, "  keep\n\nwhitespace  ");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = extract_text(&[0xff, 0xfe, 0x00], DocumentFormat::PlainText).unwrap_err();
        assert!(matches!(err, ExtractError::Utf8(_)));
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let err = extract_text(b"not a pdf", DocumentFormat::Pdf).unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
        assert!(err.to_string().starts_with("PDF extraction failed"));
    }

    #[test]
    fn extract_errors_become_input_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, [b'c', b'a', b'f', 0xe9]).unwrap();

        match load_document(&path).unwrap_err() {
            RagError::Input { path: p, reason } => {
                assert_eq!(p, path);
                assert!(reason.starts_with("not valid UTF-8 text"), "{}", reason);
            }
            other => panic!("expected Input error, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = load_document(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, RagError::Input { .. }));
    }
}
