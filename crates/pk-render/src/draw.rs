//! Draw tree: what the canvas renderer consumes.
//!
//! Children appear in z-order (bottom first). Clipping masks are never
//! drawn; their group carries the clip path instead. Every node knows the
//! canvas origin of its container so the renderer can place group-local
//! coordinates without walking the tree again.

use crate::clip::ClipCache;
use kurbo::{BezPath, Point, Vec2};
use pk_core::id::ElementId;
use pk_core::model::*;

#[derive(Debug, Clone, PartialEq)]
pub struct DrawNode {
    pub id: ElementId,
    pub element_type: ElementType,
    /// Canvas position of the container's origin.
    pub origin: Point,
    /// Clip region in the group's local space, for masked groups.
    pub clip: Option<BezPath>,
    pub children: Vec<DrawNode>,
}

/// Build the draw tree for the whole document.
pub fn draw_tree(doc: &Document, cache: &mut ClipCache) -> Vec<DrawNode> {
    cache.retain_live(doc);
    let lookup = doc.children_lookup();
    build(doc, cache, &lookup, None, Point::ZERO, doc.len())
}

fn build(
    doc: &Document,
    cache: &mut ClipCache,
    lookup: &std::collections::HashMap<Option<ElementId>, Vec<ElementId>>,
    container: Option<ElementId>,
    origin: Point,
    depth: usize,
) -> Vec<DrawNode> {
    let Some(ids) = lookup.get(&container) else {
        return Vec::new();
    };
    let mut nodes = Vec::with_capacity(ids.len());
    for element in ids.iter().filter_map(|&id| doc.get(id)) {
        if element.is_clipping_mask() {
            continue;
        }
        let mut node = DrawNode {
            id: element.id(),
            element_type: element.element_type(),
            origin,
            clip: None,
            children: Vec::new(),
        };
        if element.is_group() && depth > 0 {
            node.clip = cache.clip_for(doc, element.id()).map(|c| c.path.clone());
            let inner = origin + Vec2::new(element.base.x, element.base.y);
            node.children = build(doc, cache, lookup, Some(element.id()), inner, depth - 1);
        }
        nodes.push(node);
    }
    nodes
}

/// Flatten the draw tree into paint order.
pub fn paint_order(tree: &[DrawNode]) -> Vec<ElementId> {
    fn walk(nodes: &[DrawNode], out: &mut Vec<ElementId>) {
        for node in nodes {
            out.push(node.id);
            walk(&node.children, out);
        }
    }
    let mut out = Vec::new();
    walk(tree, &mut out);
    out
}
