//! Integration tests: layer-list drag and drop over the flat sequence.

use pk_core::id::ElementId;
use pk_core::template;
use pk_editor::{LayerDrop, layer_tree, reorder_layer};
use pretty_assertions::assert_eq;

fn id(s: &str) -> ElementId {
    ElementId::intern(s)
}

fn poster() -> pk_core::Document {
    template::from_json(include_str!("fixtures/summer_poster.json")).unwrap()
}

fn layer_drop(dragged: &str, container: Option<&str>, index: usize) -> LayerDrop {
    LayerDrop {
        dragged: id(dragged),
        container: container.map(id),
        index,
    }
}

#[test]
fn dropping_in_place_changes_nothing() {
    let mut doc = poster();
    let before = doc.elements().to_vec();
    for (container, members) in [
        (None, doc.children_of(None)),
        (Some("photo_frame"), doc.children_of(Some(id("photo_frame")))),
    ] {
        for (index, member) in members.iter().enumerate() {
            assert!(!reorder_layer(&mut doc, layer_drop(member.as_str(), container, index)));
        }
    }
    assert_eq!(doc.elements(), before.as_slice());
}

#[test]
fn reparent_lands_at_requested_index() {
    for index in 0..=2 {
        let mut doc = poster();
        assert!(reorder_layer(&mut doc, layer_drop("badge", Some("photo_frame"), index)));

        let badge = doc.get(id("badge")).unwrap();
        assert_eq!(badge.group_id(), Some(id("photo_frame")));
        let members = doc.children_of(Some(id("photo_frame")));
        assert_eq!(members[index], id("badge"), "index {index}");
        // Absolute position is preserved across the container change.
        let abs = doc.absolute_bounds(id("badge")).unwrap();
        assert_eq!(abs.center(), (500.0, 700.0));
    }
}

#[test]
fn moving_out_of_a_group_restores_root_coordinates() {
    let mut doc = poster();
    assert!(reorder_layer(&mut doc, layer_drop("photo_mask", None, 0)));
    let mask = doc.get(id("photo_mask")).unwrap();
    assert_eq!(mask.group_id(), None);
    assert!(!mask.is_clipping_mask());
    assert_eq!((mask.base.x, mask.base.y), (200.0, 350.0));
    assert_eq!(doc.children_of(None)[0], id("photo_mask"));
    assert_eq!(doc.index_of(id("photo_mask")), Some(0));
}

#[test]
fn reorder_within_root() {
    let mut doc = poster();
    assert!(reorder_layer(&mut doc, layer_drop("headline", None, 0)));
    let root: Vec<&str> = doc.children_of(None).iter().map(|i| i.as_str()).collect();
    assert_eq!(root, vec!["headline", "backdrop", "sun", "photo_frame", "divider", "badge"]);

    assert!(reorder_layer(&mut doc, layer_drop("headline", None, 99)));
    assert_eq!(doc.children_of(None).last(), Some(&id("headline")));
    // The group's members stay right after the group.
    let flat: Vec<&str> = doc.iter().map(|e| e.id().as_str()).collect();
    assert_eq!(
        flat,
        vec!["backdrop", "sun", "photo_frame", "photo_mask", "photo", "divider", "badge", "headline"]
    );
}

#[test]
fn cycles_and_bad_targets_are_refused() {
    let mut doc = template::from_json(
        r#"[
            { "id": "cy_outer", "type": "group" },
            { "id": "cy_inner", "type": "group", "groupId": "cy_outer" },
            { "id": "cy_leaf", "type": "rect", "groupId": "cy_inner" }
        ]"#,
    )
    .unwrap();
    let before = doc.elements().to_vec();
    assert!(!reorder_layer(&mut doc, layer_drop("cy_outer", Some("cy_inner"), 0)));
    assert!(!reorder_layer(&mut doc, layer_drop("cy_outer", Some("cy_outer"), 0)));
    assert!(!reorder_layer(&mut doc, layer_drop("cy_inner", Some("cy_leaf"), 0)));
    assert!(!reorder_layer(&mut doc, layer_drop("cy_missing", None, 0)));
    assert_eq!(doc.elements(), before.as_slice());
}

#[test]
fn tree_mirrors_flat_sequence() {
    let doc = poster();
    let tree = layer_tree(&doc);
    assert_eq!(tree.len(), 6);
    let frame = &tree[2];
    assert_eq!(frame.label, "group - phot");
    let members: Vec<(&str, bool)> = frame
        .children
        .iter()
        .map(|n| (n.id.as_str(), n.is_clipping_mask))
        .collect();
    assert_eq!(members, vec![("photo_mask", true), ("photo", false)]);
    assert_eq!(tree[0].label, "Backdrop");

    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json[2]["type"], serde_json::json!("group"));
    assert_eq!(json[2]["children"][0]["isClippingMask"], serde_json::json!(true));
}
