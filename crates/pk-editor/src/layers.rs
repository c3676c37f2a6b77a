//! Layer tree: drag-and-drop reorder/reparent and the tree projection.
//!
//! The layer list shows each container's children (top-level elements for
//! the root, `groupId` matches for a group). It is a projection of the flat
//! sequence, so moving a layer means computing where in the flat sequence
//! the dragged element has to land.

use pk_core::id::ElementId;
use pk_core::model::*;
use serde::{Deserialize, Serialize};

/// A drop in the layer list: put `dragged` into `container` (`None` for
/// the root) at visible position `index` among that container's children.
/// Indices at or past the end append to the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDrop {
    pub dragged: ElementId,
    #[serde(default)]
    pub container: Option<ElementId>,
    pub index: usize,
}

/// Move or reparent a layer. Returns true if the document changed.
///
/// Ignored (false) when the dragged element is unknown, the destination is
/// not a group, or a group would end up inside itself. When the container
/// changes the element keeps its absolute canvas position and stops being a
/// clipping mask.
pub fn reorder_layer(doc: &mut Document, drop: LayerDrop) -> bool {
    let LayerDrop {
        dragged,
        container,
        index,
    } = drop;
    let Some(current) = doc.get(dragged) else {
        log::debug!("layer drop of unknown element {dragged}");
        return false;
    };
    let source = current.group_id();

    if let Some(target) = container {
        if !doc.get(target).is_some_and(Element::is_group) {
            log::debug!("layer drop into non-group {target}");
            return false;
        }
        if target == dragged || doc.is_ancestor_of(dragged, target) {
            log::debug!("refusing to drop {dragged} into its own subtree");
            return false;
        }
    }

    if source == container {
        let siblings = doc.children_of(container);
        let at = siblings.iter().position(|&s| s == dragged);
        let last = siblings.len().saturating_sub(1);
        if at == Some(index.min(last)) {
            return false;
        }
    }

    let (old_x, old_y) = doc.absolute_origin(source);
    let (new_x, new_y) = doc.absolute_origin(container);

    let Some(mut element) = doc.remove(dragged) else {
        return false;
    };
    if source != container {
        element.translate(old_x - new_x, old_y - new_y);
        element.base.is_clipping_mask = false;
        element.base.group_id = container;
    }

    let at = insertion_index(doc, container, index);
    let is_group = element.is_group();
    doc.insert(at, element);
    if is_group {
        doc.bump_clip_revision(dragged);
    }
    for group in [source, container].into_iter().flatten() {
        doc.bump_clip_revision(group);
    }
    log::debug!("moved layer {dragged} to {container:?}[{index}] (flat {at})");
    true
}

/// Flat-sequence position for an insertion at visible `index` of
/// `container`: just before the child currently at that index, otherwise
/// right after the container's last member, otherwise right after an empty
/// group, otherwise at the end.
fn insertion_index(doc: &Document, container: Option<ElementId>, index: usize) -> usize {
    let positions: Vec<usize> = doc
        .iter()
        .enumerate()
        .filter(|(_, e)| e.group_id() == container)
        .map(|(i, _)| i)
        .collect();

    if let Some(&at) = positions.get(index) {
        at
    } else if let Some(&last) = positions.last() {
        last + 1
    } else if let Some(group) = container.and_then(|g| doc.index_of(g)) {
        group + 1
    } else {
        doc.len()
    }
}

// ─── Projection ──────────────────────────────────────────────────────────

/// One row of the layer list, with its children nested.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerNode {
    pub id: ElementId,
    pub label: String,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub is_clipping_mask: bool,
    pub collapsed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayerNode>,
}

/// Build the layer tree in flat-sequence order (bottom-most first).
pub fn layer_tree(doc: &Document) -> Vec<LayerNode> {
    let lookup = doc.children_lookup();
    build_level(doc, &lookup, None, doc.len())
}

fn build_level(
    doc: &Document,
    lookup: &std::collections::HashMap<Option<ElementId>, Vec<ElementId>>,
    container: Option<ElementId>,
    depth: usize,
) -> Vec<LayerNode> {
    let Some(ids) = lookup.get(&container) else {
        return Vec::new();
    };
    ids.iter()
        .filter_map(|&id| doc.get(id))
        .map(|e| LayerNode {
            id: e.id(),
            label: e.label(),
            element_type: e.element_type(),
            is_clipping_mask: e.is_clipping_mask(),
            collapsed: matches!(&e.kind, ElementKind::Group(g) if g.collapsed),
            children: if e.is_group() && depth > 0 {
                build_level(doc, lookup, Some(e.id()), depth - 1)
            } else {
                Vec::new()
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pk_core::template;
    use pretty_assertions::assert_eq;

    fn ids(doc: &Document) -> Vec<&str> {
        doc.iter().map(|e| e.id().as_str()).collect()
    }

    fn sample() -> Document {
        template::from_json(
            r#"[
                { "id": "t_a", "type": "rect", "x": 10, "y": 10 },
                { "id": "t_g", "type": "group", "x": 100, "y": 100 },
                { "id": "t_m1", "type": "rect", "x": 1, "y": 1, "groupId": "t_g" },
                { "id": "t_m2", "type": "text", "x": 2, "y": 2, "groupId": "t_g" },
                { "id": "t_b", "type": "circle", "x": 300, "y": 300 }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn insertion_before_visible_child() {
        let doc = sample();
        assert_eq!(insertion_index(&doc, None, 1), 1);
        assert_eq!(insertion_index(&doc, Some(ElementId::intern("t_g")), 1), 3);
        assert_eq!(insertion_index(&doc, Some(ElementId::intern("t_g")), 9), 4);
        assert_eq!(insertion_index(&doc, None, 9), 5);
    }

    #[test]
    fn empty_group_inserts_after_group() {
        let doc = template::from_json(
            r#"[
                { "id": "eg_g", "type": "group" },
                { "id": "eg_a", "type": "rect" }
            ]"#,
        )
        .unwrap();
        assert_eq!(insertion_index(&doc, Some(ElementId::intern("eg_g")), 0), 1);
    }

    #[test]
    fn tree_projection() {
        let tree = layer_tree(&sample());
        let top: Vec<&str> = tree.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(top, vec!["t_a", "t_g", "t_b"]);
        let members: Vec<&str> = tree[1].children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(members, vec!["t_m1", "t_m2"]);
        assert_eq!(tree[0].label, "rect - t_a");
    }

    #[test]
    fn drop_into_group_rebases() {
        let mut doc = sample();
        let moved = reorder_layer(
            &mut doc,
            LayerDrop {
                dragged: ElementId::intern("t_b"),
                container: Some(ElementId::intern("t_g")),
                index: 0,
            },
        );
        assert!(moved);
        assert_eq!(ids(&doc), vec!["t_a", "t_g", "t_b", "t_m1", "t_m2"]);
        let b = doc.get(ElementId::intern("t_b")).unwrap();
        assert_eq!((b.base.x, b.base.y), (200.0, 200.0));
        assert_eq!(b.group_id(), Some(ElementId::intern("t_g")));
    }

    #[test]
    fn group_cannot_enter_itself() {
        let mut doc = sample();
        let before = ids(&doc).join(",");
        let drop = LayerDrop {
            dragged: ElementId::intern("t_g"),
            container: Some(ElementId::intern("t_g")),
            index: 0,
        };
        assert!(!reorder_layer(&mut doc, drop));
        assert_eq!(ids(&doc).join(","), before);
    }
}
