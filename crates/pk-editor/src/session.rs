//! Editor session: the store plus the UI's selection state.
//!
//! Selection lives here, outside the store, as ids. The selected element is
//! always read back from the document, so edits never leave a stale copy
//! behind.

use crate::clipping;
use crate::layers::{self, LayerDrop, LayerNode};
use crate::store::{ElementMutation, ElementStore};
use pk_core::config::StoreConfig;
use pk_core::id::ElementId;
use pk_core::model::*;
use pk_core::patch::ElementPatch;
use pk_core::propagate::Transform;
use pk_core::template::TemplateError;
use smallvec::SmallVec;

#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    pub store: ElementStore,
    selection: Option<ElementId>,
    multi_selection: SmallVec<[ElementId; 2]>,
}

impl EditorSession {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            store: ElementStore::new(config),
            selection: None,
            multi_selection: SmallVec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        self.store.document()
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select a single element (`None` clears). Unknown ids clear too.
    pub fn select(&mut self, id: Option<ElementId>) {
        self.selection = id.filter(|&id| self.store.get(id).is_some());
    }

    pub fn selected_id(&self) -> Option<ElementId> {
        self.selection
    }

    pub fn selected(&self) -> Option<&Element> {
        self.selection.and_then(|id| self.store.get(id))
    }

    /// Shift-click: add to or remove from the multi-selection.
    pub fn toggle_multi_select(&mut self, id: ElementId) {
        if let Some(pos) = self.multi_selection.iter().position(|&s| s == id) {
            self.multi_selection.remove(pos);
        } else if self.store.get(id).is_some() {
            self.multi_selection.push(id);
        }
    }

    pub fn multi_selection(&self) -> &[ElementId] {
        &self.multi_selection
    }

    pub fn clear_multi_selection(&mut self) {
        self.multi_selection.clear();
    }

    /// Drop selection entries whose elements no longer exist.
    fn prune_selection(&mut self) {
        let store = &self.store;
        if self.selection.is_some_and(|id| store.get(id).is_none()) {
            self.selection = None;
        }
        self.multi_selection.retain(|id| store.get(*id).is_some());
    }

    // ─── Store operations ────────────────────────────────────────────────

    pub fn create(&mut self, kind: &str, overrides: Option<&ElementPatch>) -> ElementId {
        let id = self.store.create_named(kind, overrides).id();
        self.selection = Some(id);
        id
    }

    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        self.store.update(id, patch)
    }

    pub fn delete(&mut self, id: ElementId) -> Vec<ElementId> {
        let removed = self.store.delete(id);
        self.prune_selection();
        removed
    }

    /// Delete the current selection, if any.
    pub fn delete_selected(&mut self) -> Vec<ElementId> {
        match self.selection {
            Some(id) => self.delete(id),
            None => Vec::new(),
        }
    }

    /// Duplicate an element; the copy becomes the selection.
    pub fn duplicate(&mut self, id: ElementId) -> Option<ElementId> {
        let copy = self.store.duplicate(id)?.id();
        self.selection = Some(copy);
        Some(copy)
    }

    pub fn move_by(&mut self, id: ElementId, dx: f64, dy: f64) -> bool {
        self.store.move_by(id, dx, dy)
    }

    pub fn transform_end(&mut self, id: ElementId, transform: Transform) -> bool {
        self.store.transform_end(id, transform)
    }

    pub fn apply_mutation(&mut self, mutation: ElementMutation) -> bool {
        let changed = self.store.apply_mutation(mutation);
        self.prune_selection();
        changed
    }

    pub fn load_template(&mut self, json: &str) -> Result<(), TemplateError> {
        self.store.load_template(json)?;
        self.selection = None;
        self.multi_selection.clear();
        Ok(())
    }

    // ─── Clipping ────────────────────────────────────────────────────────

    /// Whether the clip button should be enabled for the multi-selection.
    pub fn can_apply_clipping_mask(&self) -> bool {
        clipping::can_apply_clipping_mask(self.document(), &self.multi_selection)
    }

    /// Clip the multi-selection. On success the multi-selection is cleared
    /// and the new group is selected.
    pub fn apply_clipping_mask(&mut self) -> Option<ElementId> {
        let group = self.store.apply_clipping_mask(&self.multi_selection)?;
        self.multi_selection.clear();
        self.selection = Some(group);
        Some(group)
    }

    pub fn release_clipping_mask(&mut self, id: ElementId) -> bool {
        let released = self.store.release_clipping_mask(id);
        self.prune_selection();
        released
    }

    pub fn is_element_clipped(&self, id: ElementId) -> bool {
        clipping::is_clipped(self.document(), id)
    }

    // ─── Layers ──────────────────────────────────────────────────────────

    pub fn reorder_layer(&mut self, drop: LayerDrop) -> bool {
        self.store.reorder_layer(drop)
    }

    pub fn layer_tree(&self) -> Vec<LayerNode> {
        layers::layer_tree(self.document())
    }

    /// Flip a group's collapsed state in the layer list.
    pub fn toggle_collapsed(&mut self, group: ElementId) -> bool {
        let Some(ElementKind::Group(shape)) = self.store.get(group).map(|e| &e.kind) else {
            return false;
        };
        let patch = ElementPatch {
            collapsed: Some(!shape.collapsed),
            ..ElementPatch::default()
        };
        self.store.update(group, &patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn selection_reads_fresh_state() {
        let mut session = EditorSession::default();
        let id = session.create("rect", None);
        assert_eq!(session.selected_id(), Some(id));
        session.update(id, &ElementPatch::position(1.0, 2.0));
        let selected = session.selected().unwrap();
        assert_eq!((selected.base.x, selected.base.y), (1.0, 2.0));
    }

    #[test]
    fn delete_clears_selection() {
        let mut session = EditorSession::default();
        let a = session.create("circle", None);
        let b = session.create("image", None);
        session.toggle_multi_select(a);
        session.toggle_multi_select(b);
        session.select(Some(a));

        session.delete(a);
        assert_eq!(session.selected_id(), None);
        assert_eq!(session.multi_selection(), &[b]);
    }

    #[test]
    fn clipping_uses_multi_selection() {
        let mut session = EditorSession::default();
        let img = session.create("image", None);
        let mask = session.create("star", None);

        session.toggle_multi_select(img);
        assert!(!session.can_apply_clipping_mask());
        assert_eq!(session.apply_clipping_mask(), None);

        session.toggle_multi_select(mask);
        assert!(session.can_apply_clipping_mask());
        let group = session.apply_clipping_mask().unwrap();
        assert!(session.multi_selection().is_empty());
        assert_eq!(session.selected_id(), Some(group));
        assert!(session.is_element_clipped(img));
        assert!(!session.is_element_clipped(group));

        assert!(session.release_clipping_mask(group));
        assert_eq!(session.selected_id(), None);
        assert!(!session.is_element_clipped(img));
    }

    #[test]
    fn toggle_collapsed_flips_group_state() {
        let mut session = EditorSession::default();
        let img = session.create("image", None);
        let mask = session.create("rect", None);
        session.toggle_multi_select(img);
        session.toggle_multi_select(mask);
        let group = session.apply_clipping_mask().unwrap();

        assert!(session.toggle_collapsed(group));
        assert!(session.layer_tree().iter().any(|n| n.id == group && n.collapsed));
        assert!(!session.toggle_collapsed(img));
    }
}
