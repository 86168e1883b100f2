//! Pipeline configuration
//!
//! TOML-backed settings for scanning, OCR, page selection and match rules.
//! Every section is optional; a missing section takes its defaults.

use crate::rules::{contract_rules, MatchRule, RuleSet};
use crate::select::{NoMatchPolicy, SelectionConfig};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration handed to [`crate::ContractProcessor`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Empty means the built-in contract rules
    #[serde(default)]
    pub rules: Vec<MatchRule>,
}

impl PipelineConfig {
    /// Load and validate configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or a value fails [`PipelineConfig::validate`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pagescan_core::config::PipelineConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = PipelineConfig::from_file("contract-scan.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// ```
    /// use pagescan_core::config::PipelineConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = PipelineConfig::from_str(r#"
    ///     [scan]
    ///     max_workers = 4
    ///
    ///     [ocr]
    ///     enabled = false
    /// "#)?;
    /// assert_eq!(config.scan.max_workers, 4);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.scan.max_workers == 0 {
            bail!("scan.max_workers must be at least 1");
        }
        if self.ocr.enabled && self.ocr.dpi == 0 {
            bail!("ocr.dpi must be greater than 0");
        }
        if self.selection.no_match == NoMatchPolicy::LeadingPages
            && self.selection.leading_pages == 0
        {
            bail!("selection.no_match = \"leading-pages\" needs selection.leading_pages >= 1");
        }
        self.rule_set().context("Invalid match rules")?;
        Ok(())
    }

    /// Compiled rules, falling back to the built-in contract rules when none are configured
    pub fn rule_set(&self) -> anyhow::Result<RuleSet> {
        let rules = if self.rules.is_empty() {
            contract_rules()
        } else {
            self.rules.clone()
        };
        Ok(RuleSet::new(rules)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Page workers per contract (default: available parallelism)
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Alphanumeric characters a text layer needs before it is trusted (default: 50)
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
    /// Stop starting new pages after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ScanConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            min_text_chars: default_min_text_chars(),
            timeout_secs: None,
        }
    }
}

fn default_max_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

fn default_min_text_chars() -> usize {
    50
}

/// External OCR tools. Paths may be bare names resolved through `PATH`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Render resolution (default: 200)
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Tesseract language code (default: "eng")
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_pdftoppm")]
    pub pdftoppm: String,
    #[serde(default = "default_tesseract")]
    pub tesseract: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dpi: default_dpi(),
            language: default_language(),
            pdftoppm: default_pdftoppm(),
            tesseract: default_tesseract(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_dpi() -> u32 {
    200
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_pdftoppm() -> String {
    "pdftoppm".to_string()
}

fn default_tesseract() -> String {
    "tesseract".to_string()
}
