//! Page text extraction
//!
//! Two extractors sit behind [`PageExtractor`]:
//! - [`TextLayerExtractor`]: reads the embedded text layer through lopdf (cheap)
//! - [`TesseractOcr`]: renders the page with poppler and runs tesseract (expensive fallback)

pub mod ocr;
pub mod text;

pub use ocr::TesseractOcr;
pub use text::{usable_chars, TextLayerExtractor};

use crate::document::Page;
use crate::error::ExtractionFailure;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Reads the text of a single page.
///
/// Implementations are called from many page workers at once and must not
/// rely on any state shared between pages.
pub trait PageExtractor: Send + Sync {
    fn extract(&self, page: Page<'_>) -> Result<String, ExtractionFailure>;
}

impl<T: PageExtractor + ?Sized> PageExtractor for Arc<T> {
    fn extract(&self, page: Page<'_>) -> Result<String, ExtractionFailure> {
        (**self).extract(page)
    }
}

impl<T: PageExtractor + ?Sized> PageExtractor for Box<T> {
    fn extract(&self, page: Page<'_>) -> Result<String, ExtractionFailure> {
        (**self).extract(page)
    }
}

/// Which extractor produced the text a page was classified on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Text,
    Ocr,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::Text => write!(f, "text"),
            ExtractionMethod::Ocr => write!(f, "ocr"),
        }
    }
}
