//! Hit testing: point → element lookup.
//!
//! Reverse-walks each container (front-to-back) to find which element is at
//! a canvas position. Members of a masked group only count where the point
//! also falls inside the group's clip region. Masks themselves are never
//! hit.

use crate::clip::ClipCache;
use kurbo::{Point, Shape};
use pk_core::id::ElementId;
use pk_core::model::*;

/// Find the topmost element at canvas position `(px, py)`.
/// Returns `None` if nothing is hit (background).
pub fn hit_test(doc: &Document, cache: &mut ClipCache, px: f64, py: f64) -> Option<ElementId> {
    hit_container(doc, cache, None, Point::new(px, py), doc.len())
}

/// `local` is the point in the container's coordinate space.
fn hit_container(
    doc: &Document,
    cache: &mut ClipCache,
    container: Option<ElementId>,
    local: Point,
    depth: usize,
) -> Option<ElementId> {
    let children = doc.children_of(container);

    // Check children in reverse (topmost first)
    for id in children.into_iter().rev() {
        let Some(element) = doc.get(id) else { continue };
        if element.is_clipping_mask() {
            continue;
        }
        if element.is_group() {
            if depth == 0 {
                continue;
            }
            let inner = Point::new(local.x - element.base.x, local.y - element.base.y);
            if let Some(clip) = cache.clip_for(doc, id)
                && !clip.path.contains(inner)
            {
                continue;
            }
            if let Some(hit) = hit_container(doc, cache, Some(id), inner, depth - 1) {
                return Some(hit);
            }
            continue;
        }
        if element.bounds().contains(local.x, local.y) {
            return Some(id);
        }
    }
    None
}

/// Find all top-level elements whose bounds intersect the given rectangle.
/// Used for marquee (box) selection.
pub fn hit_test_rect(doc: &Document, rx: f64, ry: f64, rw: f64, rh: f64) -> Vec<ElementId> {
    doc.children_of(None)
        .into_iter()
        .filter(|&id| {
            group_aware_bounds(doc, id).is_some_and(|b| b.intersects_rect(rx, ry, rw, rh))
        })
        .collect()
}

/// Absolute bounds; a group's box is its cached size, or its members'
/// union when that cache is empty.
fn group_aware_bounds(doc: &Document, id: ElementId) -> Option<Bounds> {
    let element = doc.get(id)?;
    let bounds = doc.absolute_bounds(id)?;
    if element.is_group() && bounds.width == 0.0 && bounds.height == 0.0 {
        return doc
            .children_of(Some(id))
            .into_iter()
            .filter_map(|m| doc.absolute_bounds(m))
            .reduce(|a, b| a.union(&b));
    }
    Some(bounds)
}
