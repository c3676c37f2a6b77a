//! Element store: the authoritative document plus every mutation on it.
//!
//! UI events reach the store either through the named methods or as an
//! `ElementMutation` (the form used by the WASM bridge). Operations on ids
//! that no longer exist are no-ops, since ids routinely go stale across
//! asynchronous UI callbacks.

use crate::clipping;
use crate::layers::{self, LayerDrop};
use pk_core::config::StoreConfig;
use pk_core::defaults::default_element;
use pk_core::id::ElementId;
use pk_core::lint::lint_elements;
use pk_core::model::*;
use pk_core::patch::ElementPatch;
use pk_core::propagate::{self, Transform, UpdateOrigin};
use pk_core::template::{self, TemplateError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default)]
pub struct ElementStore {
    doc: Document,
    config: StoreConfig,
}

impl ElementStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            doc: Document::new(),
            config,
        }
    }

    pub fn with_document(doc: Document, config: StoreConfig) -> Self {
        Self { doc, config }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.doc.get(id)
    }

    pub fn len(&self) -> usize {
        self.doc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    // ─── Element Store operations ────────────────────────────────────────

    /// Create a defaulted element of `ty`, apply `overrides` through the
    /// normal update path, and put it on top of the z-order.
    pub fn create(&mut self, ty: ElementType, overrides: Option<&ElementPatch>) -> &Element {
        let mut element = default_element(ty, &self.config);
        if let Some(patch) = overrides {
            propagate::apply_patch(&mut element, patch, UpdateOrigin::Edit);
        }
        let id = element.id();
        log::debug!("created {ty} {id}");
        self.doc.push(element);
        &self.doc.elements()[self.doc.len() - 1]
    }

    /// Create from a toolbar kind name; unknown names make a rect.
    pub fn create_named(&mut self, kind: &str, overrides: Option<&ElementPatch>) -> &Element {
        self.create(ElementType::from_name_or_rect(kind), overrides)
    }

    /// Merge a patch into an element and recompute derived fields.
    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        self.update_with(id, patch, UpdateOrigin::Edit)
    }

    pub fn update_with(&mut self, id: ElementId, patch: &ElementPatch, origin: UpdateOrigin) -> bool {
        let Some(element) = self.doc.get_mut(id) else {
            log::debug!("update of unknown element {id}");
            return false;
        };
        propagate::apply_patch(element, patch, origin);
        log::trace!("updated {id} ({origin:?})");
        let container = element.group_id();
        let is_group = element.is_group();
        if let Some(group) = container {
            self.doc.bump_clip_revision(group);
        }
        if is_group {
            self.doc.bump_clip_revision(id);
        }
        true
    }

    /// Delete an element and clean up every relationship it took part in.
    ///
    /// Groups are released before removal so their members survive; a
    /// removed mask releases its group; removing the last content of a
    /// clipping group releases that group too. Returns the ids that left
    /// the document.
    pub fn delete(&mut self, id: ElementId) -> Vec<ElementId> {
        let Some(element) = self.doc.get(id) else {
            log::debug!("delete of unknown element {id}");
            return Vec::new();
        };
        let container = element.group_id();

        if element.is_group() {
            clipping::release_group(&mut self.doc, id);
            return vec![id];
        }

        if element.is_clipping_mask()
            && let Some(group) = container
        {
            clipping::release_group(&mut self.doc, group);
            self.doc.remove(id);
            return vec![id, group];
        }

        self.doc.remove(id);
        let mut removed = vec![id];
        if let Some(group) = container {
            if clipping::has_no_content(&self.doc, group) {
                clipping::release_group(&mut self.doc, group);
                removed.push(group);
            } else {
                self.doc.bump_clip_revision(group);
            }
        }
        removed
    }

    /// Copy an element with a fresh id, offset by `duplicate_offset`, on
    /// top of the z-order. Groups are copied with all their members. A
    /// copied mask is an ordinary shape.
    pub fn duplicate(&mut self, id: ElementId) -> Option<&Element> {
        let Some(original) = self.doc.get(id).cloned() else {
            log::debug!("duplicate of unknown element {id}");
            return None;
        };
        let offset = self.config.duplicate_offset;
        let mut copy = original;
        copy.base.id = ElementId::generate();
        copy.base.is_clipping_mask = false;
        copy.translate(offset, offset);
        let copy_id = copy.id();
        let is_group = copy.is_group();
        self.doc.push(copy);

        if is_group {
            let depth = self.doc.len();
            self.copy_members(id, copy_id, depth);
        }
        log::debug!("duplicated {id} as {copy_id}");
        self.doc.get(copy_id)
    }

    fn copy_members(&mut self, from: ElementId, to: ElementId, depth: usize) {
        if depth == 0 {
            return;
        }
        for child in self.doc.children_of(Some(from)) {
            let Some(mut member) = self.doc.get(child).cloned() else {
                continue;
            };
            member.base.id = ElementId::generate();
            member.base.group_id = Some(to);
            let member_id = member.id();
            let is_group = member.is_group();
            self.doc.push(member);
            if is_group {
                self.copy_members(child, member_id, depth - 1);
            }
        }
    }

    /// Flat move: element at `from` goes to `to`, everything else keeps its
    /// relative order.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let moved = from != to && self.doc.move_index(from, to);
        if !moved {
            log::debug!("flat reorder {from} -> {to} left the sequence unchanged");
        }
        moved
    }

    /// Drag end: shift an element by a delta in its container's space.
    pub fn move_by(&mut self, id: ElementId, dx: f64, dy: f64) -> bool {
        let Some(element) = self.doc.get(id) else {
            return false;
        };
        let patch = ElementPatch::position(element.base.x + dx, element.base.y + dy);
        self.update(id, &patch)
    }

    /// Transformer end: bake the final scale into the element's geometry.
    /// Groups scale their members instead.
    pub fn transform_end(&mut self, id: ElementId, transform: Transform) -> bool {
        let Some(element) = self.doc.get(id) else {
            return false;
        };
        if element.is_group() {
            return propagate::transform_group(&mut self.doc, id, transform);
        }
        let patch = propagate::transform_patch(element, transform, self.config.min_transform_size);
        self.update_with(id, &patch, UpdateOrigin::TransformEnd)
    }

    /// Replace a path's point list (pen point drag).
    pub fn update_points(&mut self, id: ElementId, points: Vec<f64>) -> bool {
        match self.doc.get(id).map(Element::element_type) {
            Some(ElementType::Pen | ElementType::Line) => {}
            _ => return false,
        }
        let patch = ElementPatch {
            points: Some(points),
            ..ElementPatch::default()
        };
        self.update(id, &patch)
    }

    /// Append a point, given in absolute canvas coordinates, to a pen path.
    pub fn add_point(&mut self, id: ElementId, x: f64, y: f64) -> bool {
        let Some(element) = self.doc.get(id) else {
            return false;
        };
        let ElementKind::Pen(pen) = &element.kind else {
            return false;
        };
        let (ox, oy) = self.doc.absolute_origin(element.group_id());
        let mut points = pen.points.clone();
        points.push(x - ox - element.base.x);
        points.push(y - oy - element.base.y);
        self.update_points(id, points)
    }

    // ─── Z-order within a container ──────────────────────────────────────

    fn restack(&mut self, id: ElementId, target: impl FnOnce(usize, usize) -> Option<usize>) -> bool {
        let Some(element) = self.doc.get(id) else {
            return false;
        };
        let container = element.group_id();
        let siblings = self.doc.children_of(container);
        let Some(pos) = siblings.iter().position(|&s| s == id) else {
            return false;
        };
        match target(pos, siblings.len()) {
            Some(index) if index != pos => layers::reorder_layer(
                &mut self.doc,
                LayerDrop {
                    dragged: id,
                    container,
                    index,
                },
            ),
            _ => false,
        }
    }

    /// One step up among its siblings.
    pub fn bring_forward(&mut self, id: ElementId) -> bool {
        self.restack(id, |pos, len| (pos + 1 < len).then_some(pos + 1))
    }

    /// One step down among its siblings.
    pub fn send_backward(&mut self, id: ElementId) -> bool {
        self.restack(id, |pos, _| pos.checked_sub(1))
    }

    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        self.restack(id, |_, len| Some(len - 1))
    }

    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        self.restack(id, |_, _| Some(0))
    }

    // ─── Groups and layers ───────────────────────────────────────────────

    pub fn apply_clipping_mask(&mut self, ids: &[ElementId]) -> Option<ElementId> {
        clipping::apply_clipping_mask(&mut self.doc, ids)
    }

    pub fn release_clipping_mask(&mut self, id: ElementId) -> bool {
        clipping::release_clipping_mask(&mut self.doc, id)
    }

    pub fn reorder_layer(&mut self, drop: LayerDrop) -> bool {
        layers::reorder_layer(&mut self.doc, drop)
    }

    // ─── Templates ───────────────────────────────────────────────────────

    /// Replace the whole collection with a parsed template. On error the
    /// current document is left untouched.
    pub fn load_template(&mut self, json: &str) -> Result<(), TemplateError> {
        let doc = template::from_json(json)?;
        let findings = lint_elements(doc.elements()).len();
        log::debug!(
            "template replaced {} elements with {} ({findings} lint findings)",
            self.doc.len(),
            doc.len()
        );
        self.doc = doc;
        Ok(())
    }

    pub fn export_template(&self) -> Result<String, TemplateError> {
        template::to_json(&self.doc)
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply a mutation. Returns true if the document changed.
    pub fn apply_mutation(&mut self, mutation: ElementMutation) -> bool {
        match mutation {
            ElementMutation::Create { kind, overrides } => {
                self.create_named(&kind, overrides.as_ref());
                true
            }
            ElementMutation::Update { id, patch } => self.update(id, &patch),
            ElementMutation::Delete { id } => !self.delete(id).is_empty(),
            ElementMutation::Duplicate { id } => self.duplicate(id).is_some(),
            ElementMutation::Reorder { from, to } => self.reorder(from, to),
            ElementMutation::MoveBy { id, dx, dy } => self.move_by(id, dx, dy),
            ElementMutation::TransformEnd { id, transform } => self.transform_end(id, transform),
            ElementMutation::UpdatePoints { id, points } => self.update_points(id, points),
            ElementMutation::AddPoint { id, x, y } => self.add_point(id, x, y),
            ElementMutation::BringForward { id } => self.bring_forward(id),
            ElementMutation::SendBackward { id } => self.send_backward(id),
            ElementMutation::BringToFront { id } => self.bring_to_front(id),
            ElementMutation::SendToBack { id } => self.send_to_back(id),
            ElementMutation::ApplyClippingMask { ids } => self.apply_clipping_mask(&ids).is_some(),
            ElementMutation::ReleaseClippingMask { id } => self.release_clipping_mask(id),
            ElementMutation::ReorderLayer(drop) => self.reorder_layer(drop),
        }
    }
}

/// A mutation request from the view layer.
///
/// On the wire: `{ "op": "moveBy", "id": "...", "dx": 4, "dy": 0 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ElementMutation {
    /// `kind` is a wire name; unknown names create a rect.
    Create {
        kind: String,
        #[serde(default)]
        overrides: Option<ElementPatch>,
    },
    Update {
        id: ElementId,
        patch: ElementPatch,
    },
    Delete {
        id: ElementId,
    },
    /// Alt+drag and the duplicate button.
    Duplicate {
        id: ElementId,
    },
    Reorder {
        from: usize,
        to: usize,
    },
    MoveBy {
        id: ElementId,
        dx: f64,
        dy: f64,
    },
    TransformEnd {
        id: ElementId,
        transform: Transform,
    },
    /// Pen point drag.
    UpdatePoints {
        id: ElementId,
        points: Vec<f64>,
    },
    /// Pen tool click, absolute canvas coordinates.
    AddPoint {
        id: ElementId,
        x: f64,
        y: f64,
    },
    BringForward {
        id: ElementId,
    },
    SendBackward {
        id: ElementId,
    },
    BringToFront {
        id: ElementId,
    },
    SendToBack {
        id: ElementId,
    },
    ApplyClippingMask {
        ids: Vec<ElementId>,
    },
    ReleaseClippingMask {
        id: ElementId,
    },
    ReorderLayer(LayerDrop),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_appends_on_top() {
        let mut store = ElementStore::default();
        let a = store.create(ElementType::Rect, None).id();
        let b = store.create(ElementType::Circle, None).id();
        assert_eq!(store.document().index_of(a), Some(0));
        assert_eq!(store.document().index_of(b), Some(1));
    }

    #[test]
    fn create_applies_overrides_with_propagation() {
        let mut store = ElementStore::default();
        let overrides = ElementPatch::width(42.0);
        let sq = store.create(ElementType::Square, Some(&overrides));
        match &sq.kind {
            ElementKind::Square(r) => assert_eq!((r.width, r.height), (42.0, 42.0)),
            other => panic!("expected square, got {other:?}"),
        }
    }

    #[test]
    fn unknown_kind_makes_a_rect() {
        let mut store = ElementStore::default();
        assert_eq!(store.create_named("hexagon", None).element_type(), ElementType::Rect);
    }

    #[test]
    fn stale_ids_are_no_ops() {
        let mut store = ElementStore::default();
        let ghost = ElementId::intern("st_ghost");
        assert!(!store.update(ghost, &ElementPatch::width(1.0)));
        assert!(store.delete(ghost).is_empty());
        assert!(store.duplicate(ghost).is_none());
        assert!(!store.move_by(ghost, 1.0, 1.0));
        assert!(store.is_empty());
    }

    #[test]
    fn member_updates_bump_group_revision() {
        let mut store = ElementStore::default();
        let img = store.create(ElementType::Image, None).id();
        let mask = store.create(ElementType::Circle, None).id();
        let group = store.apply_clipping_mask(&[img, mask]).unwrap();
        let before = store.document().clip_revision(group);
        store.update(mask, &ElementPatch {
            radius: Some(10.0),
            ..ElementPatch::default()
        });
        assert_eq!(store.document().clip_revision(group), before + 1);
    }

    #[test]
    fn add_point_converts_to_local_coordinates() {
        let mut store = ElementStore::default();
        let pen = store.create(ElementType::Pen, Some(&ElementPatch::position(10.0, 20.0))).id();
        assert!(store.add_point(pen, 15.0, 30.0));
        assert!(store.add_point(pen, 40.0, 20.0));
        match &store.get(pen).unwrap().kind {
            ElementKind::Pen(p) => {
                assert_eq!(p.points, vec![5.0, 10.0, 30.0, 0.0]);
                assert_eq!((p.width, p.height), (25.0, 10.0));
            }
            other => panic!("expected pen, got {other:?}"),
        }
    }

    #[test]
    fn mutation_from_json() {
        let mut store = ElementStore::default();
        let id = store.create(ElementType::Rect, None).id();
        let json = format!(r#"{{ "op": "moveBy", "id": "{id}", "dx": 5, "dy": -5 }}"#);
        let mutation: ElementMutation = serde_json::from_str(&json).unwrap();
        assert!(store.apply_mutation(mutation));
        let rect = store.get(id).unwrap();
        assert_eq!((rect.base.x, rect.base.y), (55.0, 45.0));
    }

    #[test]
    fn create_mutation_with_unknown_kind_makes_a_rect() {
        let mut store = ElementStore::default();
        let mutation: ElementMutation =
            serde_json::from_str(r#"{ "op": "create", "kind": "hexagon" }"#).unwrap();
        assert!(store.apply_mutation(mutation));
        assert_eq!(store.len(), 1);
        assert_eq!(store.document().elements()[0].element_type(), ElementType::Rect);

        let mutation: ElementMutation =
            serde_json::from_str(r#"{ "op": "create", "kind": "star", "overrides": { "x": 7 } }"#)
                .unwrap();
        assert!(store.apply_mutation(mutation));
        let star = &store.document().elements()[1];
        assert_eq!(star.element_type(), ElementType::Star);
        assert_eq!(star.base.x, 7.0);
    }
}
