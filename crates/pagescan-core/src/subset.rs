//! Short document assembly
//!
//! Builds the derivative PDF by whitelist: clone the parsed source, rebuild the
//! page tree as a single flat node holding the selected pages, drop the rest and
//! prune what only they referenced. Kept pages retain their original objects, so
//! their content is untouched.

use crate::document::SourceDocument;
use crate::error::SubsetFailure;
use lopdf::{Document, Object, ObjectId};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Derivative PDF holding only the selected pages, in original order
#[derive(Debug, Clone, Serialize)]
pub struct ShortDocument {
    #[serde(skip)]
    bytes: Vec<u8>,
    source_pages: Vec<u32>,
}

impl ShortDocument {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Original 0-based index of each page, ascending
    pub fn source_pages(&self) -> &[u32] {
        &self.source_pages
    }

    pub fn page_count(&self) -> usize {
        self.source_pages.len()
    }
}

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Assemble a short document from `page_indices` (0-based, any order, duplicates allowed)
pub fn subset(document: &SourceDocument, page_indices: &[u32]) -> Result<ShortDocument, SubsetFailure> {
    let selected: BTreeSet<u32> = page_indices.iter().copied().collect();
    if selected.is_empty() {
        return Err(SubsetFailure::EmptySelection);
    }

    let page_count = document.page_count();
    if let Some(&index) = selected.iter().find(|&&index| index >= page_count) {
        return Err(SubsetFailure::IndexOutOfRange { index, page_count });
    }

    let mut short = document.lopdf().clone();
    let pages = short.get_pages();
    let (kept, dropped): (Vec<(u32, ObjectId)>, Vec<(u32, ObjectId)>) = pages
        .into_iter()
        .partition(|(number, _)| selected.contains(&(number - 1)));

    // Flatten the page tree: every kept page hangs directly off the root
    let root_id = page_tree_root(&short)?;
    for &(_, page_id) in &kept {
        let inherited = inherited_attributes(&short, page_id);
        let page = short
            .get_dictionary_mut(page_id)
            .map_err(|e| SubsetFailure::Write(format!("page object {:?}: {}", page_id, e)))?;
        for (key, value) in inherited {
            page.set(key, value);
        }
        page.set("Parent", Object::Reference(root_id));
    }

    let root = short
        .get_dictionary_mut(root_id)
        .map_err(|e| SubsetFailure::Write(format!("page tree root: {}", e)))?;
    root.set(
        "Kids",
        kept.iter()
            .map(|&(_, id)| Object::Reference(id))
            .collect::<Vec<_>>(),
    );
    root.set("Count", kept.len() as i64);

    for (_, page_id) in &dropped {
        short.objects.remove(page_id);
    }
    short.prune_objects();

    let mut bytes = Vec::new();
    short
        .save_to(&mut bytes)
        .map_err(|e| SubsetFailure::Write(e.to_string()))?;

    debug!(
        kept = kept.len(),
        dropped = dropped.len(),
        size = bytes.len(),
        "short document assembled"
    );

    Ok(ShortDocument {
        bytes,
        source_pages: selected.into_iter().collect(),
    })
}

fn page_tree_root(document: &Document) -> Result<ObjectId, SubsetFailure> {
    document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .and_then(|catalog| document.get_dictionary(catalog))
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| SubsetFailure::Write(format!("page tree root: {}", e)))
}

/// Inheritable attributes the page lacks, taken from its nearest ancestor that has them
fn inherited_attributes(document: &Document, page_id: ObjectId) -> Vec<(Vec<u8>, Object)> {
    let mut found = Vec::new();
    let Ok(page) = document.get_dictionary(page_id) else {
        return found;
    };
    let mut missing: Vec<&[u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();

    let mut visited = HashSet::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    while let Some(node_id) = parent {
        if missing.is_empty() || !visited.insert(node_id) {
            break;
        }
        let Ok(node) = document.get_dictionary(node_id) else {
            break;
        };
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    found
}
