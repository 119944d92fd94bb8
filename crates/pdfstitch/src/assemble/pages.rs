//! Grafting pages into the output document.
//!
//! Imported pages are copied together with everything they reference and
//! renumbered into the output's object space. Image pages are built from
//! scratch around a single image XObject.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::materialize::ImagePage;
use crate::{Result, StitchError};

/// Resource name of the image on a synthesized page.
const IMAGE_NAME: &[u8] = b"Im0";

/// Copy `pages` from `source` into `target`, placing them under `parent`.
///
/// Every object reachable from the pages is copied once, even when shared
/// between pages. References into the source's catalog or page tree are
/// not followed and become `null`. Returns the new page ids in input order.
pub(crate) fn graft_pages(
    target: &mut Document,
    source: &Document,
    pages: &[ObjectId],
    parent: ObjectId,
) -> Vec<ObjectId> {
    let page_set: HashSet<ObjectId> = pages.iter().copied().collect();
    let reachable = reachable_objects(source, pages, &page_set);

    let mapping: BTreeMap<ObjectId, ObjectId> = reachable
        .iter()
        .map(|&old| (old, target.new_object_id()))
        .collect();

    for (old, &new) in &mapping {
        let Ok(object) = source.get_object(*old) else {
            continue;
        };
        let mut object = object.clone();
        remap_references(&mut object, &mapping);

        if page_set.contains(old)
            && let Object::Dictionary(dict) = &mut object
        {
            dict.set("Parent", parent);
        }

        target.objects.insert(new, object);
    }

    pages
        .iter()
        .filter_map(|page| mapping.get(page).copied())
        .collect()
}

/// Ids of every object reachable from `pages`, excluding page tree nodes
/// and the catalog.
fn reachable_objects(
    source: &Document,
    pages: &[ObjectId],
    page_set: &HashSet<ObjectId>,
) -> BTreeSet<ObjectId> {
    let mut reachable = BTreeSet::new();
    let mut stack: Vec<ObjectId> = pages.to_vec();

    while let Some(id) = stack.pop() {
        if reachable.contains(&id) {
            continue;
        }
        let Ok(object) = source.get_object(id) else {
            continue;
        };

        let is_page = page_set.contains(&id);
        if !is_page && is_tree_node(object) {
            continue;
        }

        reachable.insert(id);
        collect_references(object, is_page, &mut stack);
    }

    reachable
}

fn is_tree_node(object: &Object) -> bool {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return false,
    };

    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(b"Catalog" | b"Pages" | b"Page")
    )
}

fn collect_references(object: &Object, skip_parent: bool, out: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => out.push(*id),
        Object::Array(items) => {
            for item in items {
                collect_references(item, false, out);
            }
        }
        Object::Dictionary(dict) => {
            for (key, value) in dict.iter() {
                if skip_parent && key.as_slice() == b"Parent" {
                    continue;
                }
                collect_references(value, false, out);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter() {
                collect_references(value, false, out);
            }
        }
        _ => {}
    }
}

fn remap_references(object: &mut Object, mapping: &BTreeMap<ObjectId, ObjectId>) {
    match object {
        Object::Reference(id) => {
            *object = match mapping.get(id) {
                Some(&new) => Object::Reference(new),
                None => Object::Null,
            };
        }
        Object::Array(items) => {
            for item in items {
                remap_references(item, mapping);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                remap_references(value, mapping);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                remap_references(value, mapping);
            }
        }
        _ => {}
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Add a page showing `page.image` at its placement, under `parent`.
pub(crate) fn insert_image_page(
    target: &mut Document,
    page: &ImagePage,
    parent: ObjectId,
) -> Result<ObjectId> {
    let (mut image, soft_mask) = page.image.to_streams();
    if let Some(mask) = soft_mask {
        let mask_id = target.add_object(mask);
        image.dict.set("SMask", mask_id);
    }
    let image_id = target.add_object(image);

    let placement = page.placement;
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    real(placement.width),
                    0.into(),
                    0.into(),
                    real(placement.height),
                    real(placement.x),
                    real(placement.y),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content = content
        .encode()
        .map_err(|e| StitchError::other(format!("Failed to encode page content: {e}")))?;
    let content_id = target.add_object(Stream::new(dictionary! {}, content));

    let mut xobjects = lopdf::Dictionary::new();
    xobjects.set(IMAGE_NAME, image_id);

    Ok(target.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "MediaBox" => vec![0.into(), 0.into(), real(page.page_width), real(page.page_height)],
        "Resources" => dictionary! { "XObject" => xobjects },
        "Contents" => content_id,
    }))
}
