//! Contract page scanning and short-document assembly
//!
//! Finds the pages of a long contract PDF that carry key clauses and builds a
//! smaller PDF holding only those pages.
//!
//! - [`extract`]: text layer first, OCR only when the text layer is missing or garbled
//! - [`classify`]: per-page importance against a [`RuleSet`]
//! - [`scan`]: every page classified concurrently on a bounded rayon pool
//! - [`select`] and [`subset`]: widen the important set and write the short PDF
//! - [`pipeline`]: the three steps for one contract, driven by [`PipelineConfig`]

pub mod classify;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod rules;
pub mod scan;
pub mod select;
pub mod subset;

#[cfg(test)]
mod test_support;

pub use classify::{ClassificationResult, PageClassifier, PageText};
pub use config::{OcrConfig, PipelineConfig, ScanConfig};
pub use document::{Origin, Page, SourceDocument};
pub use error::{
    DocumentError, ExtractionFailure, ProcessError, RuleError, ScanError, SubsetFailure,
};
pub use extract::{ExtractionMethod, PageExtractor, TesseractOcr, TextLayerExtractor};
pub use pipeline::{ContractOutcome, ContractProcessor, ContractReport, OutcomeKind, PageSummary};
pub use rules::{contract_rules, MatchRule, PatternKind, RuleSet};
pub use scan::{CancelToken, ImportantPageSet, ScanCoordinator, ScanOutcome, ScanReport};
pub use select::{select_pages, NoMatchPolicy, SelectionConfig};
pub use subset::{subset, ShortDocument};
