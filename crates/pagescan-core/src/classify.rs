//! Per-page importance classification
//!
//! Each page goes through a short fallback chain: text layer first, OCR only
//! when the text layer is missing or too thin. A page that neither extractor
//! can read is not important. Classification itself never fails.

use crate::document::Page;
use crate::error::ExtractionFailure;
use crate::extract::{ExtractionMethod, PageExtractor};
use crate::rules::RuleSet;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Outcome for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub page_index: u32,
    pub is_important: bool,
    pub matched_rule_ids: BTreeSet<String>,
    pub extraction_method: ExtractionMethod,
    /// Text layer was present but garbled and OCR failed too
    pub needs_review: bool,
}

/// Where the fallback chain ended for a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageText {
    Read {
        text: String,
        method: ExtractionMethod,
    },
    Unreadable {
        text_failure: ExtractionFailure,
        /// `None` when no OCR fallback is configured
        ocr_failure: Option<ExtractionFailure>,
    },
}

pub struct PageClassifier {
    text: Box<dyn PageExtractor>,
    ocr: Option<Box<dyn PageExtractor>>,
}

impl PageClassifier {
    pub fn new(text: impl PageExtractor + 'static, ocr: impl PageExtractor + 'static) -> Self {
        Self {
            text: Box::new(text),
            ocr: Some(Box::new(ocr)),
        }
    }

    /// Classifier with no OCR fallback
    pub fn text_only(text: impl PageExtractor + 'static) -> Self {
        Self {
            text: Box::new(text),
            ocr: None,
        }
    }

    /// Run the text → OCR fallback chain for one page
    pub fn read(&self, page: Page<'_>) -> PageText {
        let text_failure = match self.text.extract(page) {
            Ok(text) => {
                return PageText::Read {
                    text,
                    method: ExtractionMethod::Text,
                }
            }
            Err(failure) => failure,
        };

        let Some(ocr) = &self.ocr else {
            debug!(page = page.number(), reason = %text_failure, "text layer unusable, OCR disabled");
            return PageText::Unreadable {
                text_failure,
                ocr_failure: None,
            };
        };

        debug!(page = page.number(), reason = %text_failure, "falling back to OCR");
        match ocr.extract(page) {
            Ok(text) => PageText::Read {
                text,
                method: ExtractionMethod::Ocr,
            },
            Err(ocr_failure) => {
                warn!(page = page.number(), error = %ocr_failure, "OCR fallback failed");
                PageText::Unreadable {
                    text_failure,
                    ocr_failure: Some(ocr_failure),
                }
            }
        }
    }

    pub fn classify(&self, page: Page<'_>, rules: &RuleSet) -> ClassificationResult {
        match self.read(page) {
            PageText::Read { text, method } => Self::matched(page, rules, &text, method),
            // No OCR to try: a sparse page may still be a bare section header
            PageText::Unreadable {
                text_failure: ExtractionFailure::Garbled { text, .. },
                ocr_failure: None,
            } => {
                debug!(page = page.number(), "matching sparse text layer, OCR disabled");
                Self::matched(page, rules, &text, ExtractionMethod::Text)
            }
            PageText::Unreadable {
                text_failure,
                ocr_failure,
            } => {
                let needs_review = matches!(text_failure, ExtractionFailure::Garbled { .. })
                    && ocr_failure.is_some();
                if needs_review {
                    warn!(
                        page = page.number(),
                        reason = %text_failure,
                        "garbled text layer and OCR failed; counting page as not important, needs manual review"
                    );
                }
                ClassificationResult {
                    page_index: page.index(),
                    is_important: false,
                    matched_rule_ids: BTreeSet::new(),
                    extraction_method: ExtractionMethod::Text,
                    needs_review,
                }
            }
        }
    }

    fn matched(
        page: Page<'_>,
        rules: &RuleSet,
        text: &str,
        method: ExtractionMethod,
    ) -> ClassificationResult {
        let matched = rules.matches(text);
        if !matched.is_empty() {
            debug!(page = page.number(), ?method, rules = ?matched, "important page");
        }
        ClassificationResult {
            page_index: page.index(),
            is_important: !matched.is_empty(),
            matched_rule_ids: matched,
            extraction_method: method,
            needs_review: false,
        }
    }
}
