//! WASM bridge for PosterKit: exposes the element store to the browser editor.
//!
//! Compiled via `wasm-pack build --target web`. Every structured value
//! crosses the boundary as a JSON string; ids travel as plain strings.

mod scene;

use pk_core::config::StoreConfig;
use pk_core::id::ElementId;
use pk_core::lint::{LintSeverity, lint_elements};
use pk_core::model::ElementType;
use pk_core::patch::ElementPatch;
use pk_core::propagate::Transform;
use pk_core::template;
use pk_editor::{EditorSession, ElementMutation, LayerDrop};
use pk_render::{ClipCache, hit_test, hit_test_rect};
use serde_json::json;
use wasm_bindgen::prelude::*;

/// The canvas controller the editor UI talks to.
///
/// Holds the editing session and the clip-path cache. Mutating methods
/// return `true` when the document changed.
#[wasm_bindgen]
pub struct PosterCanvas {
    session: EditorSession,
    clips: ClipCache,
}

#[wasm_bindgen]
impl PosterCanvas {
    /// Create a controller. `config_json` may be empty or a partial
    /// configuration object; anything unparsable falls back to defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Self {
        console_error_panic_hook_setup();

        let config = if config_json.trim().is_empty() {
            StoreConfig::default()
        } else {
            StoreConfig::from_json(config_json).unwrap_or_else(|e| {
                log::warn!("invalid store config, using defaults: {e}");
                StoreConfig::default()
            })
        };
        let clips = ClipCache::new(config.clip_tolerance);
        Self {
            session: EditorSession::new(config),
            clips,
        }
    }

    // ─── Templates ───────────────────────────────────────────────────────

    /// Replace the document with a template.
    /// Returns `{"ok":true,"count":N}` or `{"ok":false,"error":"..."}`.
    pub fn load_template(&mut self, json: &str) -> String {
        match self.session.load_template(json) {
            Ok(()) => {
                self.clips.clear();
                json!({ "ok": true, "count": self.session.document().len() }).to_string()
            }
            Err(e) => error_json(&e.to_string()),
        }
    }

    /// The document as a template array. Empty string on failure.
    pub fn export_template(&self) -> String {
        self.session.store.export_template().unwrap_or_default()
    }

    /// All elements as JSON, in sequence order.
    pub fn get_elements_json(&self) -> String {
        serde_json::to_string(self.session.document().elements()).unwrap_or_else(|_| "[]".to_string())
    }

    /// One element as JSON, or empty string if it doesn't exist.
    pub fn get_element_json(&self, id: &str) -> String {
        self.session
            .store
            .get(ElementId::intern(id))
            .and_then(|e| serde_json::to_string(e).ok())
            .unwrap_or_default()
    }

    // ─── Element operations ──────────────────────────────────────────────

    /// Add an element of `kind` (unknown kinds make a rect) and select it.
    /// `overrides_json` may be empty. Returns the new id.
    pub fn create_element(&mut self, kind: &str, overrides_json: &str) -> String {
        let overrides = parse_patch(overrides_json);
        let id = self.session.create(kind, overrides.as_ref());
        id.as_str().to_string()
    }

    /// Merge a partial attribute object into an element.
    pub fn update_element(&mut self, id: &str, patch_json: &str) -> bool {
        let Some(patch) = parse_patch(patch_json) else {
            return false;
        };
        self.session.update(ElementId::intern(id), &patch)
    }

    /// Delete an element. Returns the removed ids as a JSON array.
    pub fn delete_element(&mut self, id: &str) -> String {
        ids_json(&self.session.delete(ElementId::intern(id)))
    }

    /// Delete the selected element (Delete / Backspace).
    pub fn delete_selected(&mut self) -> String {
        ids_json(&self.session.delete_selected())
    }

    /// Duplicate an element and select the copy. Returns the copy's id, or
    /// empty string if the source doesn't exist.
    pub fn duplicate_element(&mut self, id: &str) -> String {
        self.session
            .duplicate(ElementId::intern(id))
            .map(|copy| copy.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn move_by(&mut self, id: &str, dx: f64, dy: f64) -> bool {
        self.session.move_by(ElementId::intern(id), dx, dy)
    }

    /// Commit a resize gesture: position plus scale factors.
    pub fn transform_end(&mut self, id: &str, x: f64, y: f64, scale_x: f64, scale_y: f64) -> bool {
        let transform = Transform {
            x,
            y,
            scale_x,
            scale_y,
        };
        self.session.transform_end(ElementId::intern(id), transform)
    }

    /// Replace a pen or line element's point list (JSON number array).
    pub fn update_points(&mut self, id: &str, points_json: &str) -> bool {
        let Ok(points) = serde_json::from_str::<Vec<f64>>(points_json) else {
            return false;
        };
        self.session.store.update_points(ElementId::intern(id), points)
    }

    /// Append a canvas-space point to a pen element.
    pub fn add_point(&mut self, id: &str, x: f64, y: f64) -> bool {
        self.session.store.add_point(ElementId::intern(id), x, y)
    }

    /// Move an element within the flat sequence.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        self.session.store.reorder(from, to)
    }

    pub fn bring_forward(&mut self, id: &str) -> bool {
        self.session.store.bring_forward(ElementId::intern(id))
    }

    pub fn send_backward(&mut self, id: &str) -> bool {
        self.session.store.send_backward(ElementId::intern(id))
    }

    pub fn bring_to_front(&mut self, id: &str) -> bool {
        self.session.store.bring_to_front(ElementId::intern(id))
    }

    pub fn send_to_back(&mut self, id: &str) -> bool {
        self.session.store.send_to_back(ElementId::intern(id))
    }

    /// Apply a JSON mutation (`{"op":"moveBy","id":"...","dx":4,"dy":0}`).
    pub fn apply_mutation(&mut self, json: &str) -> bool {
        match serde_json::from_str::<ElementMutation>(json) {
            Ok(mutation) => self.session.apply_mutation(mutation),
            Err(e) => {
                log::warn!("rejected mutation: {e}");
                false
            }
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select an element; empty string clears the selection.
    pub fn select(&mut self, id: &str) {
        let id = (!id.is_empty()).then(|| ElementId::intern(id));
        self.session.select(id);
    }

    pub fn get_selected_id(&self) -> String {
        self.session
            .selected_id()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// The selected element, freshly read from the document.
    pub fn get_selected_json(&self) -> String {
        self.session
            .selected()
            .and_then(|e| serde_json::to_string(e).ok())
            .unwrap_or_default()
    }

    pub fn toggle_multi_select(&mut self, id: &str) {
        self.session.toggle_multi_select(ElementId::intern(id));
    }

    pub fn clear_multi_selection(&mut self) {
        self.session.clear_multi_selection();
    }

    /// The multi-selection as a JSON array of ids.
    pub fn get_selected_ids(&self) -> String {
        ids_json(self.session.multi_selection())
    }

    // ─── Clipping ────────────────────────────────────────────────────────

    pub fn can_apply_clipping_mask(&self) -> bool {
        self.session.can_apply_clipping_mask()
    }

    /// Clip the multi-selection. Returns the new group's id, or empty
    /// string if the selection can't be clipped.
    pub fn apply_clipping_mask(&mut self) -> String {
        self.session
            .apply_clipping_mask()
            .map(|group| group.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn release_clipping_mask(&mut self, id: &str) -> bool {
        self.session.release_clipping_mask(ElementId::intern(id))
    }

    pub fn is_element_clipped(&self, id: &str) -> bool {
        self.session.is_element_clipped(ElementId::intern(id))
    }

    // ─── Layers ──────────────────────────────────────────────────────────

    /// Layer-panel drop: `{"dragged":"...","container":"..."|null,"index":N}`.
    pub fn reorder_layer(&mut self, json: &str) -> bool {
        match serde_json::from_str::<LayerDrop>(json) {
            Ok(drop) => self.session.reorder_layer(drop),
            Err(e) => {
                log::warn!("rejected layer drop: {e}");
                false
            }
        }
    }

    pub fn toggle_collapsed(&mut self, id: &str) -> bool {
        self.session.toggle_collapsed(ElementId::intern(id))
    }

    /// Nested layer tree for the layer panel.
    pub fn get_layer_tree_json(&self) -> String {
        serde_json::to_string(&self.session.layer_tree()).unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Draw tree in paint order, with clip regions as SVG path data.
    pub fn get_draw_tree_json(&mut self) -> String {
        let nodes = scene::scene(self.session.document(), &mut self.clips);
        serde_json::to_string(&nodes).unwrap_or_else(|_| "[]".to_string())
    }

    /// Topmost element at a canvas position, or empty string.
    pub fn hit_test(&mut self, x: f64, y: f64) -> String {
        hit_test(self.session.document(), &mut self.clips, x, y)
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Top-level elements intersecting a marquee, as a JSON id array.
    pub fn hit_test_rect(&self, x: f64, y: f64, w: f64, h: f64) -> String {
        ids_json(&hit_test_rect(self.session.document(), x, y, w, h))
    }
}

fn parse_patch(json: &str) -> Option<ElementPatch> {
    if json.trim().is_empty() {
        return None;
    }
    ElementPatch::from_json(json)
        .map_err(|e| log::warn!("rejected patch: {e}"))
        .ok()
}

fn ids_json(ids: &[ElementId]) -> String {
    let names: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
    serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
}

fn error_json(message: &str) -> String {
    json!({ "ok": false, "error": message }).to_string()
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("PosterKit WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no canvas needed) ─────────────────────────────

/// Validate a template. Returns `{"ok":true,"diagnostics":[...]}` or
/// `{"ok":false,"error":"..."}` when the JSON doesn't parse.
#[wasm_bindgen]
pub fn validate_template(json: &str) -> String {
    let elements = match template::parse_elements(json) {
        Ok(elements) => elements,
        Err(e) => return error_json(&e.to_string()),
    };
    let diagnostics: Vec<serde_json::Value> = lint_elements(&elements)
        .into_iter()
        .map(|d| {
            json!({
                "id": d.element_id.as_str(),
                "rule": d.rule,
                "message": d.message,
                "severity": match d.severity {
                    LintSeverity::Warning => "warning",
                    LintSeverity::Info => "info",
                },
            })
        })
        .collect();
    json!({ "ok": true, "diagnostics": diagnostics }).to_string()
}

/// A freshly defaulted element of `kind`, as JSON. Used by the toolbar
/// to preview a shape before it is placed.
#[wasm_bindgen]
pub fn default_element_json(kind: &str) -> String {
    let element = pk_core::default_element(ElementType::from_name_or_rect(kind), &StoreConfig::default());
    serde_json::to_string(&element).unwrap_or_default()
}
