//! Concurrent page scanning
//!
//! The coordinator owns a fixed-width rayon pool and runs one classification
//! task per page. Tasks share only the read-only document and rule set; each
//! returns its own result and the results are merged once at the end, so the
//! outcome does not depend on scheduling or pool width.

use crate::classify::{ClassificationResult, PageClassifier};
use crate::document::SourceDocument;
use crate::error::ScanError;
use crate::rules::RuleSet;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Non-empty set of important page indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportantPageSet(BTreeSet<u32>);

impl ImportantPageSet {
    /// `None` when `indices` is empty
    pub fn new(indices: impl IntoIterator<Item = u32>) -> Option<Self> {
        let set: BTreeSet<u32> = indices.into_iter().collect();
        (!set.is_empty()).then_some(Self(set))
    }

    pub fn contains(&self, index: u32) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Indices in ascending order
    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Found(ImportantPageSet),
    /// No page matched any rule. Callers must pick a fallback explicitly.
    NoneFound,
}

impl ScanOutcome {
    pub fn important_pages(&self) -> Option<&ImportantPageSet> {
        match self {
            ScanOutcome::Found(set) => Some(set),
            ScanOutcome::NoneFound => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    /// One result per page, ordered by page index
    pub results: Vec<ClassificationResult>,
}

/// Cooperative stop signal. Checked before each page starts; pages already
/// running are always allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct ScanCoordinator {
    classifier: PageClassifier,
    pool: ThreadPool,
    max_workers: usize,
    timeout: Option<Duration>,
}

impl ScanCoordinator {
    pub fn new(classifier: PageClassifier, max_workers: usize) -> Result<Self, ScanError> {
        if max_workers == 0 {
            return Err(ScanError::WorkerPool("max_workers must be at least 1".into()));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(max_workers)
            .thread_name(|i| format!("pagescan-{}", i))
            .build()
            .map_err(|e| ScanError::WorkerPool(e.to_string()))?;

        Ok(Self {
            classifier,
            pool,
            max_workers,
            timeout: None,
        })
    }

    /// Stop starting new pages once `timeout` has elapsed since the scan began
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn classifier(&self) -> &PageClassifier {
        &self.classifier
    }

    pub fn scan(&self, document: &SourceDocument, rules: &RuleSet) -> Result<ScanReport, ScanError> {
        self.scan_with_cancel(document, rules, &CancelToken::new())
    }

    pub fn scan_with_cancel(
        &self,
        document: &SourceDocument,
        rules: &RuleSet,
        cancel: &CancelToken,
    ) -> Result<ScanReport, ScanError> {
        let started = Instant::now();
        let deadline = self.timeout.map(|t| started + t);
        let total = document.page_count() as usize;

        info!(
            document = %document.name(),
            pages = total,
            workers = self.max_workers,
            "scanning pages"
        );

        let results: Vec<Option<ClassificationResult>> = self.pool.install(|| {
            (0..document.page_count())
                .into_par_iter()
                .map(|index| {
                    let expired = deadline.is_some_and(|d| Instant::now() >= d);
                    if cancel.is_cancelled() || expired {
                        return None;
                    }
                    let page = document.page(index)?;
                    Some(self.classifier.classify(page, rules))
                })
                .collect()
        });

        let completed = results.iter().filter(|r| r.is_some()).count();
        if completed < total {
            warn!(completed, total, "scan stopped before every page was classified");
            return Err(ScanError::Interrupted { completed, total });
        }

        let mut results: Vec<ClassificationResult> = results.into_iter().flatten().collect();
        results.sort_by_key(|r| r.page_index);

        let important = results
            .iter()
            .filter(|r| r.is_important)
            .map(|r| r.page_index);
        let outcome = match ImportantPageSet::new(important) {
            Some(set) => ScanOutcome::Found(set),
            None => ScanOutcome::NoneFound,
        };

        info!(
            document = %document.name(),
            important = outcome.important_pages().map_or(0, |s| s.len()),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan finished"
        );

        Ok(ScanReport { outcome, results })
    }
}
