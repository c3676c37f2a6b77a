//! Template serialization.
//!
//! A template is the flat element sequence as a JSON array, one object per
//! element, with no envelope. Variant fields sit next to the shared base
//! fields and the `type` key selects the variant:
//!
//! ```json
//! [
//!   { "id": "g1", "type": "group", "x": 40, "y": 40, "width": 100, "height": 100 },
//!   { "id": "c1", "type": "circle", "x": 50, "y": 50, "radius": 50, "groupId": "g1", "isClippingMask": true },
//!   { "id": "p1", "type": "image", "x": 0, "y": 0, "src": "photo.png", "groupId": "g1" }
//! ]
//! ```

use crate::model::{Document, Element};
use crate::propagate;
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("invalid template: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("invalid template: element id `{0}` is used more than once")]
    DuplicateId(String),
    #[error("failed to encode template: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Parse the raw element list without validating it.
///
/// Used by tooling that wants to report problems (see `lint`) instead of
/// rejecting the file.
pub fn parse_elements(json: &str) -> Result<Vec<Element>, TemplateError> {
    serde_json::from_str(json).map_err(TemplateError::Parse)
}

/// Parse and validate a template.
///
/// # Errors
/// `Parse` for malformed JSON or records, `DuplicateId` when two records
/// share an id.
pub fn from_json(json: &str) -> Result<Document, TemplateError> {
    let elements = parse_elements(json)?;
    let mut seen = HashSet::with_capacity(elements.len());
    for element in &elements {
        if !seen.insert(element.id()) {
            return Err(TemplateError::DuplicateId(element.id().to_string()));
        }
    }
    log::debug!("loaded template with {} elements", elements.len());
    Ok(Document::from_elements(elements))
}

pub fn to_json(doc: &Document) -> Result<String, TemplateError> {
    serde_json::to_string(doc.elements()).map_err(TemplateError::Encode)
}

pub fn to_json_pretty(doc: &Document) -> Result<String, TemplateError> {
    serde_json::to_string_pretty(doc.elements()).map_err(TemplateError::Encode)
}

/// Re-apply the derivation rules to every element (line points, square
/// height). Returns how many elements changed.
pub fn normalize_document(doc: &Document) -> (Document, usize) {
    let mut changed = 0;
    let elements = doc
        .iter()
        .map(|element| {
            let mut normalized = element.clone();
            propagate::normalize(&mut normalized);
            if normalized != *element {
                log::trace!("normalized {}", element.id());
                changed += 1;
            }
            normalized
        })
        .collect();
    (Document::from_elements(elements), changed)
}
