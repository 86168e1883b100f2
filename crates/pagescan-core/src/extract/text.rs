//! Embedded text layer extraction

use super::PageExtractor;
use crate::document::Page;
use crate::error::ExtractionFailure;
use tracing::debug;

/// Reads a page's text layer and rejects it when it is too thin to trust
#[derive(Debug, Clone)]
pub struct TextLayerExtractor {
    min_text_chars: usize,
}

impl TextLayerExtractor {
    pub fn new(min_text_chars: usize) -> Self {
        Self { min_text_chars }
    }

    /// Accept `text` or say why it is unusable
    pub fn judge(&self, text: &str) -> Result<(), ExtractionFailure> {
        if text.trim().is_empty() {
            return Err(ExtractionFailure::NoTextLayer);
        }
        let usable = usable_chars(text);
        if usable < self.min_text_chars {
            return Err(ExtractionFailure::Garbled {
                usable_chars: usable,
                required: self.min_text_chars,
                text: text.to_string(),
            });
        }
        Ok(())
    }
}

impl PageExtractor for TextLayerExtractor {
    fn extract(&self, page: Page<'_>) -> Result<String, ExtractionFailure> {
        let text = match page.document().lopdf().extract_text(&[page.number()]) {
            Ok(text) => text,
            Err(e) => {
                debug!(page = page.number(), error = %e, "text layer could not be decoded");
                return Err(ExtractionFailure::NoTextLayer);
            }
        };
        self.judge(&text)?;
        Ok(text)
    }
}

/// Number of ASCII alphanumeric characters in `text`
pub fn usable_chars(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_alphanumeric()).count()
}
