//! Shared fixtures for unit tests

use crate::document::Page;
use crate::error::ExtractionFailure;
use crate::extract::PageExtractor;
use lopdf::{content::Content, content::Operation, dictionary, Document, Object, Stream};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Build a PDF where page `i` carries the text lines `pages[i]`
pub fn create_pdf_with_lines(pages: &[Vec<&str>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut page_ids = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for (row, line) in lines.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
            ));
            operations.push(Operation::new(
                "Td",
                vec![Object::Integer(72), Object::Integer(720 - 16 * row as i64)],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(line.as_bytes().to_vec())],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            lopdf::Dictionary::new(),
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => page_ids.len() as i64,
        "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// `num_pages` pages, each reading "Page N" (1-based)
pub fn create_test_pdf(num_pages: u32) -> Vec<u8> {
    let labels: Vec<String> = (1..=num_pages).map(|n| format!("Page {}", n)).collect();
    let pages: Vec<Vec<&str>> = labels.iter().map(|l| vec![l.as_str()]).collect();
    create_pdf_with_lines(&pages)
}

/// First `Tj` string on every page, in page order
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|page_id| {
            let data = doc.get_page_content(*page_id).unwrap();
            let content = Content::decode(&data).unwrap();
            content
                .operations
                .iter()
                .find(|op| op.operator == "Tj")
                .and_then(|op| op.operands.first())
                .and_then(|operand| operand.as_str().ok())
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .unwrap_or_default()
        })
        .collect()
}

/// Extractor that answers from a fixed per-page script and counts calls
pub struct ScriptedExtractor {
    responses: HashMap<u32, Result<String, ExtractionFailure>>,
    fallback: Result<String, ExtractionFailure>,
    calls: AtomicUsize,
}

impl ScriptedExtractor {
    pub fn failing(failure: ExtractionFailure) -> Self {
        Self {
            responses: HashMap::new(),
            fallback: Err(failure),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_page(mut self, index: u32, response: Result<&str, ExtractionFailure>) -> Self {
        self.responses
            .insert(index, response.map(|text| text.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PageExtractor for ScriptedExtractor {
    fn extract(&self, page: Page<'_>) -> Result<String, ExtractionFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(&page.index())
            .unwrap_or(&self.fallback)
            .clone()
    }
}

