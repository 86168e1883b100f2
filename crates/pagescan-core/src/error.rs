use thiserror::Error;

/// Why a single page could not be read by one extractor.
///
/// These never escape the classifier; a page that cannot be read is simply
/// not important.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error("page has no usable text layer")]
    NoTextLayer,

    #[error("text layer looks garbled ({usable_chars} usable characters, need {required})")]
    Garbled {
        usable_chars: usize,
        required: usize,
        /// The sparse text itself, still matchable when there is no OCR fallback
        text: String,
    },

    #[error("OCR engine failed: {0}")]
    OcrEngine(String),
}

/// Building a short document failed. Fatal for the current contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubsetFailure {
    #[error("no pages selected")]
    EmptySelection,

    #[error("page index {index} is out of range (document has {page_count} pages)")]
    IndexOutOfRange { index: u32, page_count: u32 },

    #[error("failed to write short document: {0}")]
    Write(String),
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("could not start page workers: {0}")]
    WorkerPool(String),

    #[error("scan interrupted after {completed} of {total} pages")]
    Interrupted { completed: usize, total: usize },
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse PDF: {0}")]
    Parse(String),

    #[error("document has no pages")]
    Empty,
}

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("rule '{0}' has an empty pattern")]
    EmptyPattern(String),

    #[error("duplicate rule id '{0}'")]
    DuplicateId(String),

    #[error("rule '{id}' has an invalid regex: {message}")]
    InvalidRegex { id: String, message: String },
}

/// Everything that can stop one contract from producing an outcome.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Subset(#[from] SubsetFailure),
}
