//! contract-scan: shorten contract PDFs to the pages that carry key clauses
//!
//! stdout carries only JSON report lines (`scan`) or page dumps (`pages`);
//! all logging goes to stderr.

mod inputs;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pagescan_core::{
    ContractOutcome, ContractProcessor, ContractReport, PageText, PipelineConfig, SourceDocument,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "contract-scan")]
#[command(version, about = "Find the key clause pages of contract PDFs and write short copies")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan contracts and write `<name>_short.pdf` next to each one
    Scan(ScanArgs),
    /// Print the text of specific pages as the scanner sees it
    Pages(PagesArgs),
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page workers per contract
    #[arg(short, long)]
    workers: Option<usize>,

    /// Never fall back to OCR
    #[arg(long)]
    no_ocr: bool,

    /// Alphanumeric characters a text layer needs before it is trusted
    #[arg(long)]
    min_text_chars: Option<usize>,

    /// Rebuild short documents that already exist
    #[arg(long)]
    force: bool,

    /// Contract PDFs or directories of them
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct PagesArgs {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    pdf: PathBuf,

    /// 1-based page numbers
    #[arg(required = true)]
    pages: Vec<u32>,
}

/// One stdout line per contract
#[derive(Serialize)]
#[serde(untagged)]
enum ReportLine<'a> {
    Processed {
        #[serde(flatten)]
        report: &'a ContractReport,
        short_pdf: Option<String>,
    },
    Reused {
        file: String,
        short_pdf: String,
        reused: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ok = match cli.command {
        Commands::Scan(args) => run_scan(args)?,
        Commands::Pages(args) => run_pages(args)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(path),
        None => Ok(PipelineConfig::default()),
    }
}

/// Returns `false` if any contract failed
fn run_scan(args: ScanArgs) -> Result<bool> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(workers) = args.workers {
        config.scan.max_workers = workers;
    }
    if args.no_ocr {
        config.ocr.enabled = false;
    }
    if let Some(min_text_chars) = args.min_text_chars {
        config.scan.min_text_chars = min_text_chars;
    }

    let processor = ContractProcessor::new(config).context("Invalid configuration")?;
    let contracts = inputs::expand_inputs(&args.inputs)?;
    if contracts.is_empty() {
        warn!("no contract PDFs found");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0usize;
    let mut reused = 0usize;

    for contract in &contracts {
        let short = inputs::short_path(contract);
        if !args.force && inputs::is_reusable(&short) {
            info!(contract = %contract.display(), short = %short.display(), "short document exists, reusing");
            let line = ReportLine::Reused {
                file: file_name(contract),
                short_pdf: short.display().to_string(),
                reused: true,
            };
            serde_json::to_writer(&mut out, &line)?;
            writeln!(out)?;
            reused += 1;
            continue;
        }

        match process_contract(&processor, contract, &short) {
            Ok((report, written)) => {
                let line = ReportLine::Processed {
                    report: &report,
                    short_pdf: written.map(|p| p.display().to_string()),
                };
                serde_json::to_writer(&mut out, &line)?;
                writeln!(out)?;
            }
            Err(e) => {
                error!(contract = %contract.display(), error = %format!("{:#}", e), "contract failed");
                failed += 1;
            }
        }
    }

    info!(total = contracts.len(), reused, failed, "batch finished");
    Ok(failed == 0)
}

fn process_contract(
    processor: &ContractProcessor,
    contract: &Path,
    short_path: &Path,
) -> Result<(ContractReport, Option<PathBuf>)> {
    let document = SourceDocument::open(contract)?;
    match processor.process(&document)? {
        ContractOutcome::Shortened { short, report } => {
            inputs::write_short(short_path, short.bytes())?;
            Ok((report, Some(short_path.to_path_buf())))
        }
        ContractOutcome::Skipped { report } => Ok((report, None)),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn run_pages(args: PagesArgs) -> Result<bool> {
    let config = load_config(args.config.as_deref())?;
    let processor = ContractProcessor::new(config).context("Invalid configuration")?;
    let document = SourceDocument::open(&args.pdf)?;
    let page_count = document.page_count();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "--- {} ({} pages) ---", document.name(), page_count)?;

    for &number in &args.pages {
        let Some(page) = number.checked_sub(1).and_then(|index| document.page(index)) else {
            writeln!(out, "\n--- Page {}: not found (document has {} pages) ---", number, page_count)?;
            continue;
        };

        match processor.classifier().read(page) {
            PageText::Read { text, method } => {
                let matched = processor.rules().matches(&text);
                let matched: Vec<&str> = matched.iter().map(String::as_str).collect();
                writeln!(
                    out,
                    "\n--- Page {} [{}] matched: [{}] ---",
                    number,
                    method,
                    matched.join(", ")
                )?;
                writeln!(out, "{}", text.trim_end())?;
            }
            PageText::Unreadable {
                text_failure,
                ocr_failure,
            } => {
                let ocr = ocr_failure.map_or_else(|| "disabled".to_string(), |e| e.to_string());
                writeln!(
                    out,
                    "\n--- Page {}: unreadable (text: {}; OCR: {}) ---",
                    number, text_failure, ocr
                )?;
            }
        }
    }

    Ok(true)
}
