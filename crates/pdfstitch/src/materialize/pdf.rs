//! Passthrough of PDF pages.

use lopdf::{Document, Object, ObjectId};
use std::path::Path;

use crate::{Result, StitchError};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Deepest page tree accepted when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

/// Copy inherited attributes onto every page and return the page ids in
/// document order.
///
/// Once flattened, a page no longer depends on its original `Parent` chain
/// and can be moved under a different page tree.
pub(crate) fn flatten_pages(path: &Path, document: &mut Document) -> Result<Vec<ObjectId>> {
    let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
    if page_ids.is_empty() {
        return Err(StitchError::corrupt_document(path, "document has no pages"));
    }

    for &page_id in &page_ids {
        flatten_inherited(document, page_id)
            .map_err(|e| StitchError::corrupt_document(path, e.to_string()))?;
    }

    Ok(page_ids)
}

fn flatten_inherited(document: &mut Document, page_id: ObjectId) -> lopdf::Result<()> {
    let page = document.get_dictionary(page_id)?;
    let mut missing: Vec<&'static [u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    let mut inherited: Vec<(&'static [u8], Object)> = Vec::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(node_id) = parent {
        if depth >= MAX_TREE_DEPTH || missing.is_empty() {
            break;
        }
        depth += 1;

        let Ok(node) = document.get_dictionary(node_id) else {
            break;
        };

        missing.retain(|&key| match node.get(key) {
            Ok(value) => {
                inherited.push((key, value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    if inherited.is_empty() {
        return Ok(());
    }

    let page = document.get_dictionary_mut(page_id)?;
    for (key, value) in inherited {
        page.set(key, value);
    }
    Ok(())
}
