//! Source documents and page handles
//!
//! A [`SourceDocument`] is parsed once per contract and then only read. Page
//! workers borrow it concurrently through [`Page`] handles.

use crate::error::DocumentError;
use lopdf::Document;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the document bytes came from. OCR needs a file to hand to the renderer.
#[derive(Debug)]
pub enum Origin {
    File(PathBuf),
    Memory(Vec<u8>),
}

/// A parsed contract PDF. Page indices are 0-based and follow the original order.
#[derive(Debug)]
pub struct SourceDocument {
    inner: Document,
    page_count: u32,
    origin: Origin,
}

impl SourceDocument {
    /// Open and parse a PDF from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let inner = Document::load_mem(&bytes).map_err(|e| DocumentError::Parse(e.to_string()))?;
        Self::from_parts(inner, Origin::File(path.to_path_buf()))
    }

    /// Parse a PDF held in memory
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DocumentError> {
        let inner = Document::load_mem(&bytes).map_err(|e| DocumentError::Parse(e.to_string()))?;
        Self::from_parts(inner, Origin::Memory(bytes))
    }

    fn from_parts(inner: Document, origin: Origin) -> Result<Self, DocumentError> {
        let page_count = inner.get_pages().len() as u32;
        if page_count == 0 {
            return Err(DocumentError::Empty);
        }
        Ok(Self {
            inner,
            page_count,
            origin,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Handle for the page at `index`, or `None` past the end
    pub fn page(&self, index: u32) -> Option<Page<'_>> {
        (index < self.page_count).then_some(Page {
            document: self,
            index,
        })
    }

    pub fn pages(&self) -> impl Iterator<Item = Page<'_>> + '_ {
        (0..self.page_count).map(move |index| Page {
            document: self,
            index,
        })
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// File name for reports, or `<memory>` for in-memory documents
    pub fn name(&self) -> String {
        match &self.origin {
            Origin::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Origin::Memory(_) => "<memory>".to_string(),
        }
    }

    pub(crate) fn lopdf(&self) -> &Document {
        &self.inner
    }
}

/// Borrowed handle to one page of a [`SourceDocument`]
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    document: &'a SourceDocument,
    index: u32,
}

impl<'a> Page<'a> {
    pub fn index(&self) -> u32 {
        self.index
    }

    /// 1-based page number, as lopdf and poppler count pages
    pub fn number(&self) -> u32 {
        self.index + 1
    }

    pub fn document(&self) -> &'a SourceDocument {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_pdf_with_lines, create_test_pdf};

    #[test]
    fn test_from_bytes_counts_pages() {
        let doc = SourceDocument::from_bytes(create_test_pdf(7)).unwrap();
        assert_eq!(doc.page_count(), 7);
        assert_eq!(doc.pages().count(), 7);
        assert_eq!(doc.name(), "<memory>");
    }

    #[test]
    fn test_page_handles_are_zero_based() {
        let doc = SourceDocument::from_bytes(create_test_pdf(3)).unwrap();
        let page = doc.page(2).unwrap();
        assert_eq!(page.index(), 2);
        assert_eq!(page.number(), 3);
        assert!(doc.page(3).is_none());
    }

    #[test]
    fn test_garbage_bytes_fail_to_parse() {
        let result = SourceDocument::from_bytes(b"not a pdf".to_vec());
        assert!(matches!(result, Err(DocumentError::Parse(_))));
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let result = SourceDocument::open("/definitely/not/here.pdf");
        assert!(matches!(result, Err(DocumentError::Io { .. })));
    }

    #[test]
    fn test_open_reports_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contract.pdf");
        fs::write(&path, create_test_pdf(2)).unwrap();

        let doc = SourceDocument::open(&path).unwrap();
        assert_eq!(doc.name(), "contract.pdf");
        assert!(matches!(doc.origin(), Origin::File(p) if p == &path));
    }

    #[test]
    fn test_zero_page_document_is_rejected() {
        let result = SourceDocument::from_bytes(create_pdf_with_lines(&[]));
        assert!(matches!(result, Err(DocumentError::Empty)));
    }
}
