//! JSON projection of the draw tree for the canvas renderer.
//!
//! Clip regions travel as SVG path data so the JS side can hand them
//! straight to `Path2D`.

use pk_core::model::Document;
use pk_render::{ClipCache, DrawNode, draw_tree};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: &'static str,
    pub origin_x: f64,
    pub origin_y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

impl From<&DrawNode> for SceneNode {
    fn from(node: &DrawNode) -> Self {
        Self {
            id: node.id.as_str().to_string(),
            element_type: node.element_type.name(),
            origin_x: node.origin.x,
            origin_y: node.origin.y,
            clip: node.clip.as_ref().map(|p| p.to_svg()),
            children: node.children.iter().map(SceneNode::from).collect(),
        }
    }
}

pub fn scene(doc: &Document, cache: &mut ClipCache) -> Vec<SceneNode> {
    draw_tree(doc, cache).iter().map(SceneNode::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pk_core::template;
    use pretty_assertions::assert_eq;

    #[test]
    fn clip_travels_as_path_data() {
        let doc = template::from_json(
            r#"[
                { "id": "sc_g", "type": "group", "x": 5, "y": 5 },
                { "id": "sc_mask", "type": "rect", "x": 0, "y": 0, "width": 10, "height": 10,
                  "groupId": "sc_g", "isClippingMask": true },
                { "id": "sc_img", "type": "image", "groupId": "sc_g" }
            ]"#,
        )
        .unwrap();
        let nodes = scene(&doc, &mut ClipCache::default());
        let json = serde_json::to_value(&nodes).unwrap();

        assert_eq!(json[0]["type"], serde_json::json!("group"));
        let clip = json[0]["clip"].as_str().unwrap();
        assert!(clip.starts_with('M'));
        assert_eq!(json[0]["children"][0]["id"], serde_json::json!("sc_img"));
        assert_eq!(json[0]["children"][0]["originX"], serde_json::json!(5.0));
        assert!(json[0]["children"][0].get("clip").is_none());
    }
}
