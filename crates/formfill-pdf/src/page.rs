//! Page-tree lookups shared by the writer and the extractor

use formfill_types::PageSize;
use lopdf::{Document, Object, ObjectId};

/// Guard against cyclic /Parent chains in malformed files
const MAX_TREE_DEPTH: usize = 16;

/// Follow an indirect reference; other objects are returned unchanged
pub fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Look up `key` on the page, then on its ancestors in the page tree
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(resolve(doc, value));
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_object(parent).ok()?.as_dict().ok()?;
    }
    None
}

pub fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Page size from /MediaBox, inherited if needed; US Letter when absent
pub fn page_size(doc: &Document, page_id: ObjectId) -> PageSize {
    let bounds = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|object| object.as_array().ok())
        .filter(|arr| arr.len() == 4)
        .map(|arr| {
            arr.iter()
                .map(|o| number(resolve(doc, o)))
                .collect::<Option<Vec<f64>>>()
        });

    match bounds {
        Some(Some(b)) => PageSize::new((b[2] - b[0]).abs(), (b[3] - b[1]).abs()),
        _ => PageSize::LETTER,
    }
}
