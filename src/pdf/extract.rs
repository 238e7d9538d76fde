//! Page range extraction using lopdf
//!
//! A chapter is written by cloning the source document, hanging the selected
//! pages off a fresh page tree and catalog, and pruning everything that is no
//! longer reachable from the trailer.

use std::path::Path;
use lopdf::{Dictionary, Document, Object, ObjectId};
use crate::error::{Error, Result};

/// Page attributes that may be inherited from ancestor Pages nodes
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Copy inheritable attributes from the page's ancestors onto the page itself
///
/// Needed because the page is about to be re-parented under a new Pages node
/// that carries none of the original tree's attributes.
fn flatten_inherited_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();

    {
        let page = doc.get_dictionary(page_id)?;
        let mut parent_ref = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;

        while let Some(parent_id) = parent_ref {
            // Guard against malformed cyclic trees
            depth += 1;
            if depth > 64 {
                break;
            }

            let Ok(parent) = doc.get_dictionary(parent_id) else {
                break;
            };

            for key in INHERITABLE_KEYS {
                let already_set = page.has(key) || inherited.iter().any(|(k, _)| *k == key);
                if !already_set {
                    if let Ok(value) = parent.get(key) {
                        inherited.push((key, value.clone()));
                    }
                }
            }

            parent_ref = parent.get(b"Parent").and_then(Object::as_reference).ok();
        }
    }

    if inherited.is_empty() {
        return Ok(());
    }

    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in inherited {
        page.set(key.to_vec(), value);
    }

    Ok(())
}

/// Catalog or intermediate Pages node of the original tree
fn is_tree_root_or_node(object: &Object) -> bool {
    object
        .as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .is_ok_and(|name| name == b"Pages" || name == b"Catalog")
}

/// Extract an inclusive, 0-based page range into a new document
///
/// The source document is left untouched. Outlines, named destinations and
/// other catalog-level structures are not carried over, since they point at
/// pages outside the range.
pub fn extract_page_range(source: &Document, start: usize, end: usize) -> Result<Document> {
    let pages = source.get_pages();
    let total = pages.len();

    if start > end || end >= total {
        return Err(Error::InvalidPageRange { start, end, total });
    }

    let page_ids: Vec<ObjectId> = pages
        .values()
        .skip(start)
        .take(end - start + 1)
        .copied()
        .collect();

    let mut doc = source.clone();

    for &page_id in &page_ids {
        flatten_inherited_attributes(&mut doc, page_id)?;
    }

    // Kept pages may link to pages outside the range. Those references are
    // left dangling so the old tree cannot pull the whole book back in.
    let mut dropped: Vec<ObjectId> = pages
        .values()
        .copied()
        .filter(|id| !page_ids.contains(id))
        .collect();
    dropped.extend(
        doc.objects
            .iter()
            .filter(|(_, object)| is_tree_root_or_node(object))
            .map(|(id, _)| *id),
    );
    for id in dropped {
        doc.objects.remove(&id);
    }

    // New page tree and catalog get IDs above every existing object
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = page_ids
        .iter()
        .map(|&id| Object::Reference(id))
        .collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));

    let catalog_id = doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    doc.objects.insert(pages_id, Object::Dictionary(pages_object));
    doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(ref mut dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    // Drops outlines, name trees and resources only the removed pages used
    doc.prune_objects();
    doc.renumber_objects();

    Ok(doc)
}

/// Compress and save a document, then verify a non-empty file landed on disk
pub fn write_document(mut doc: Document, path: &Path) -> Result<()> {
    doc.compress();
    doc.save(path)?;

    let written = std::fs::metadata(path)
        .map(|m| m.len())
        .unwrap_or(0);

    if written == 0 {
        return Err(Error::General(format!(
            "Output file missing or empty: {}",
            path.display()
        )));
    }

    Ok(())
}
