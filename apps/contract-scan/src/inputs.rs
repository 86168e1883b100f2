//! Resolving command-line inputs to contract files, and writing their short copies

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const SHORT_SUFFIX: &str = "_short";

/// Expand files and directories into the contracts to process.
///
/// A directory contributes its `*.pdf` files (not recursing, skipping earlier
/// `*_short.pdf` output) sorted by name. Files are taken as given.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut contracts = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let entries = fs::read_dir(input)
                .with_context(|| format!("Failed to list directory: {}", input.display()))?;
            let mut found: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_contract_pdf(path))
                .collect();
            found.sort();
            contracts.extend(found);
        } else if input.is_file() {
            contracts.push(input.clone());
        } else {
            bail!("Input not found: {}", input.display());
        }
    }
    Ok(contracts)
}

/// `.pdf` (any case) that is not itself a short document
pub fn is_contract_pdf(path: &Path) -> bool {
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    let is_short = path
        .file_stem()
        .is_some_and(|stem| stem.to_string_lossy().to_lowercase().ends_with(SHORT_SUFFIX));
    is_pdf && !is_short
}

/// `<dir>/<stem>_short.pdf` next to the contract
pub fn short_path(contract: &Path) -> PathBuf {
    let stem = contract.file_stem().unwrap_or_default().to_string_lossy();
    contract.with_file_name(format!("{}{}.pdf", stem, SHORT_SUFFIX))
}

/// An earlier run already left a non-empty short document here
pub fn is_reusable(short: &Path) -> bool {
    fs::metadata(short).is_ok_and(|meta| meta.is_file() && meta.len() > 0)
}

/// Write `bytes` to `path` through a sibling temp file, so an interrupted run
/// never leaves a truncated short document behind
pub fn write_short(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    staged
        .write_all(bytes)
        .and_then(|_| staged.as_file().sync_all())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    staged
        .persist(path)
        .with_context(|| format!("Failed to move short document into {}", path.display()))?;
    Ok(())
}
