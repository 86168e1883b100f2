//! Helpers shared by the integration tests

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use pagescan_core::{ExtractionFailure, Page, PageExtractor};
use std::collections::HashMap;

/// Build a PDF with one page per entry; `\n` splits a page into text lines
pub fn contract_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for text in pages {
        let mut operations = Vec::new();
        for (row, line) in text.lines().enumerate() {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), Object::Integer(11)]),
                Operation::new(
                    "Td",
                    vec![Object::Integer(60), Object::Integer(740 - 14 * row as i64)],
                ),
                Operation::new("Tj", vec![Object::string_literal(line)]),
                Operation::new("ET", vec![]),
            ]);
        }
        let content = Content { operations }.encode().unwrap();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// `count` pages whose only line is "Page N" (1-based)
pub fn numbered_pdf(count: u32) -> Vec<u8> {
    let labels: Vec<String> = (1..=count).map(|n| format!("Page {}", n)).collect();
    let pages: Vec<&str> = labels.iter().map(String::as_str).collect();
    contract_pdf(&pages)
}

/// First line of text on each page of a saved PDF, in page order
pub fn first_lines(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            content
                .operations
                .iter()
                .find(|op| op.operator == "Tj")
                .and_then(|op| op.operands.first())
                .and_then(|operand| operand.as_str().ok())
                .map(|raw| String::from_utf8_lossy(raw).into_owned())
                .unwrap_or_default()
        })
        .collect()
}

/// Fake extractor: fixed text for listed pages, `NoTextLayer` for the rest
#[derive(Debug, Default)]
pub struct FixedText(HashMap<u32, String>);

impl FixedText {
    pub fn new(pages: impl IntoIterator<Item = (u32, &'static str)>) -> Self {
        Self(
            pages
                .into_iter()
                .map(|(index, text)| (index, text.to_string()))
                .collect(),
        )
    }
}

impl PageExtractor for FixedText {
    fn extract(&self, page: Page<'_>) -> Result<String, ExtractionFailure> {
        self.0
            .get(&page.index())
            .cloned()
            .ok_or(ExtractionFailure::NoTextLayer)
    }
}
