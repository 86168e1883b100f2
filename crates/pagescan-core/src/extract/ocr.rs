//! OCR fallback: poppler renders one page, tesseract reads it
//!
//! Both tools run as child processes inside a scratch directory that is
//! removed when the call returns, so concurrent pages never share files.

use super::PageExtractor;
use crate::config::OcrConfig;
use crate::document::{Origin, Page};
use crate::error::ExtractionFailure;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TesseractOcr {
    config: OcrConfig,
}

impl TesseractOcr {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    fn render_page(&self, pdf: &Path, page: u32, workdir: &Path) -> Result<PathBuf, ExtractionFailure> {
        let prefix = workdir.join("page");
        let page_arg = page.to_string();
        run(
            Command::new(&self.config.pdftoppm)
                .arg("-f")
                .arg(&page_arg)
                .arg("-l")
                .arg(&page_arg)
                .arg("-r")
                .arg(self.config.dpi.to_string())
                .args(["-png", "-singlefile"])
                .arg(pdf)
                .arg(&prefix),
            &self.config.pdftoppm,
        )?;

        let image = prefix.with_extension("png");
        if !image.exists() {
            return Err(ExtractionFailure::OcrEngine(format!(
                "{} produced no image for page {}",
                self.config.pdftoppm, page
            )));
        }
        Ok(image)
    }

    fn recognize(&self, image: &Path) -> Result<String, ExtractionFailure> {
        let stdout = run(
            Command::new(&self.config.tesseract)
                .arg(image)
                .arg("stdout")
                .arg("-l")
                .arg(&self.config.language),
            &self.config.tesseract,
        )?;
        decode_text(&self.config.tesseract, stdout)
    }
}

impl PageExtractor for TesseractOcr {
    fn extract(&self, page: Page<'_>) -> Result<String, ExtractionFailure> {
        let workdir = tempfile::tempdir()
            .map_err(|e| ExtractionFailure::OcrEngine(format!("scratch directory: {}", e)))?;

        let pdf = match page.document().origin() {
            Origin::File(path) => path.clone(),
            Origin::Memory(bytes) => {
                let path = workdir.path().join("source.pdf");
                fs::write(&path, bytes)
                    .map_err(|e| ExtractionFailure::OcrEngine(format!("spooling PDF: {}", e)))?;
                path
            }
        };

        debug!(page = page.number(), dpi = self.config.dpi, "running OCR");
        let image = self.render_page(&pdf, page.number(), workdir.path())?;
        self.recognize(&image)
    }
}

/// Run a tool to completion and return its stdout
fn run(command: &mut Command, tool: &str) -> Result<Vec<u8>, ExtractionFailure> {
    let output = command
        .output()
        .map_err(|e| ExtractionFailure::OcrEngine(format!("failed to launch {}: {}", tool, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractionFailure::OcrEngine(format!(
            "{} exited with {}: {}",
            tool,
            output.status,
            stderr.trim()
        )));
    }
    Ok(output.stdout)
}

fn decode_text(tool: &str, stdout: Vec<u8>) -> Result<String, ExtractionFailure> {
    String::from_utf8(stdout)
        .map_err(|_| ExtractionFailure::OcrEngine(format!("{} returned non-UTF-8 text", tool)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SourceDocument;
    use crate::test_support::create_test_pdf;

    fn config() -> OcrConfig {
        OcrConfig {
            pdftoppm: "/nonexistent/bin/pdftoppm".into(),
            tesseract: "/nonexistent/bin/tesseract".into(),
            ..OcrConfig::default()
        }
    }

    #[test]
    fn test_missing_renderer_is_engine_error() {
        let doc = SourceDocument::from_bytes(create_test_pdf(1)).unwrap();
        let ocr = TesseractOcr::new(config());

        match ocr.extract(doc.page(0).unwrap()) {
            Err(ExtractionFailure::OcrEngine(message)) => {
                assert!(message.contains("pdftoppm"), "message: {}", message)
            }
            other => panic!("expected OCR engine error, got {:?}", other),
        }
    }

    #[test]
    fn test_renderer_without_image_is_engine_error() {
        let doc = SourceDocument::from_bytes(create_test_pdf(1)).unwrap();
        let ocr = TesseractOcr::new(OcrConfig {
            pdftoppm: "true".into(),
            ..config()
        });

        match ocr.extract(doc.page(0).unwrap()) {
            Err(ExtractionFailure::OcrEngine(message)) => {
                assert!(message.contains("produced no image"), "message: {}", message)
            }
            other => panic!("expected OCR engine error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_utf8_output_is_engine_error() {
        assert_eq!(
            decode_text("tesseract", vec![0x53, 0xff, 0xfe]),
            Err(ExtractionFailure::OcrEngine(
                "tesseract returned non-UTF-8 text".into()
            ))
        );
        assert_eq!(
            decode_text("tesseract", b"ARTICLE 19\n".to_vec()),
            Ok("ARTICLE 19\n".to_string())
        );
    }
}
