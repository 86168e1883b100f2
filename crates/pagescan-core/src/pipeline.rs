//! One contract end to end: scan, select, subset

use crate::classify::{ClassificationResult, PageClassifier};
use crate::config::PipelineConfig;
use crate::document::SourceDocument;
use crate::error::ProcessError;
use crate::extract::{ExtractionMethod, PageExtractor, TesseractOcr, TextLayerExtractor};
use crate::rules::RuleSet;
use crate::scan::{CancelToken, ScanCoordinator, ScanOutcome};
use crate::select::{select_pages, SelectionConfig};
use crate::subset::{subset, ShortDocument};
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::info;

#[derive(Debug)]
pub enum ContractOutcome {
    Shortened {
        short: ShortDocument,
        report: ContractReport,
    },
    /// Nothing matched and the no-match policy says skip
    Skipped { report: ContractReport },
}

impl ContractOutcome {
    pub fn report(&self) -> &ContractReport {
        match self {
            ContractOutcome::Shortened { report, .. } | ContractOutcome::Skipped { report } => report,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    Found,
    NoneFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub page: u32,
    pub method: ExtractionMethod,
    pub matched: BTreeSet<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub needs_review: bool,
}

impl From<&ClassificationResult> for PageSummary {
    fn from(result: &ClassificationResult) -> Self {
        Self {
            page: result.page_index,
            method: result.extraction_method,
            matched: result.matched_rule_ids.clone(),
            needs_review: result.needs_review,
        }
    }
}

/// Per-contract summary. Page numbers are 0-based indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractReport {
    pub file: String,
    pub page_count: u32,
    pub outcome: OutcomeKind,
    pub important_pages: Vec<u32>,
    /// Empty when the contract was skipped
    pub selected_pages: Vec<u32>,
    pub pages: Vec<PageSummary>,
    pub elapsed_ms: u64,
}

pub struct ContractProcessor {
    coordinator: ScanCoordinator,
    rules: RuleSet,
    selection: SelectionConfig,
}

impl ContractProcessor {
    /// Build the extractors, worker pool and rules described by `config`
    pub fn new(config: PipelineConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let rules = config.rule_set()?;

        let text = TextLayerExtractor::new(config.scan.min_text_chars);
        let classifier = if config.ocr.enabled {
            PageClassifier::new(text, TesseractOcr::new(config.ocr.clone()))
        } else {
            PageClassifier::text_only(text)
        };

        Self::with_classifier(classifier, rules, &config)
    }

    /// Like [`ContractProcessor::new`] but with caller-supplied extractors
    pub fn with_extractors(
        config: PipelineConfig,
        text: impl PageExtractor + 'static,
        ocr: Option<Box<dyn PageExtractor>>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let rules = config.rule_set()?;
        let classifier = match ocr {
            Some(ocr) => PageClassifier::new(text, ocr),
            None => PageClassifier::text_only(text),
        };
        Self::with_classifier(classifier, rules, &config)
    }

    fn with_classifier(
        classifier: PageClassifier,
        rules: RuleSet,
        config: &PipelineConfig,
    ) -> anyhow::Result<Self> {
        let mut coordinator = ScanCoordinator::new(classifier, config.scan.max_workers)?;
        if let Some(timeout) = config.scan.timeout() {
            coordinator = coordinator.with_timeout(timeout);
        }
        Ok(Self {
            coordinator,
            rules,
            selection: config.selection.clone(),
        })
    }

    pub fn classifier(&self) -> &PageClassifier {
        self.coordinator.classifier()
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn process(&self, document: &SourceDocument) -> Result<ContractOutcome, ProcessError> {
        self.process_with_cancel(document, &CancelToken::new())
    }

    pub fn process_with_cancel(
        &self,
        document: &SourceDocument,
        cancel: &CancelToken,
    ) -> Result<ContractOutcome, ProcessError> {
        let started = Instant::now();
        let scan = self.coordinator.scan_with_cancel(document, &self.rules, cancel)?;
        let selected = select_pages(&scan.outcome, document.page_count(), &self.selection);

        let mut report = ContractReport {
            file: document.name(),
            page_count: document.page_count(),
            outcome: match scan.outcome {
                ScanOutcome::Found(_) => OutcomeKind::Found,
                ScanOutcome::NoneFound => OutcomeKind::NoneFound,
            },
            important_pages: scan
                .outcome
                .important_pages()
                .map(|set| set.to_vec())
                .unwrap_or_default(),
            selected_pages: selected.clone().unwrap_or_default(),
            pages: scan.results.iter().map(PageSummary::from).collect(),
            elapsed_ms: 0,
        };

        let Some(selected) = selected else {
            report.elapsed_ms = started.elapsed().as_millis() as u64;
            info!(document = %report.file, "no important pages, contract skipped");
            return Ok(ContractOutcome::Skipped { report });
        };

        let short = subset(document, &selected)?;
        report.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            document = %report.file,
            important = report.important_pages.len(),
            kept = short.page_count(),
            of = report.page_count,
            elapsed_ms = report.elapsed_ms,
            "contract shortened"
        );
        Ok(ContractOutcome::Shortened { short, report })
    }
}
