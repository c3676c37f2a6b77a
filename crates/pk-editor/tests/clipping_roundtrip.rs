//! Integration tests: clipping-mask groups through the session.

use pk_core::id::ElementId;
use pk_core::model::*;
use pk_core::patch::ElementPatch;
use pk_editor::EditorSession;
use pretty_assertions::assert_eq;

fn absolute(session: &EditorSession, id: ElementId) -> (f64, f64) {
    let doc = session.document();
    let e = doc.get(id).unwrap();
    let (ox, oy) = doc.absolute_origin(e.group_id());
    (e.base.x + ox, e.base.y + oy)
}

fn clip(session: &mut EditorSession, a: ElementId, b: ElementId) -> Option<ElementId> {
    session.clear_multi_selection();
    session.toggle_multi_select(a);
    session.toggle_multi_select(b);
    session.apply_clipping_mask()
}

#[test]
fn apply_then_release_restores_everything() {
    for mask_kind in ["rect", "square", "circle", "ellipse", "polygon", "star", "arc", "pen"] {
        let mut session = EditorSession::default();
        let photo = session.create("image", Some(&ElementPatch::position(120.0, 80.0)));
        let mask = session.create(mask_kind, Some(&ElementPatch::position(140.0, 90.0)));
        let count = session.document().len();
        let before = (absolute(&session, photo), absolute(&session, mask));

        let group = clip(&mut session, photo, mask).unwrap();
        assert_eq!(session.document().len(), count + 1, "{mask_kind}");
        assert_eq!((absolute(&session, photo), absolute(&session, mask)), before);
        assert_eq!(session.document().mask_of(group), Some(mask));

        assert!(session.release_clipping_mask(mask));
        assert_eq!(session.document().len(), count, "{mask_kind}");
        assert_eq!((absolute(&session, photo), absolute(&session, mask)), before);
        assert!(session.document().get(group).is_none());
    }
}

#[test]
fn media_never_becomes_the_mask() {
    let mut session = EditorSession::default();
    let shape = session.create("star", None);
    let video = session.create("video", None);
    let group = clip(&mut session, shape, video).unwrap();
    assert_eq!(session.document().mask_of(group), Some(shape));
}

#[test]
fn invalid_selections_are_ignored() {
    let mut session = EditorSession::default();
    let a = session.create("image", None);
    let b = session.create("gif", None);
    let c = session.create("circle", None);

    // Neither is a mask candidate.
    assert_eq!(clip(&mut session, a, b), None);

    // Three selected.
    session.toggle_multi_select(c);
    assert_eq!(session.multi_selection().len(), 3);
    assert_eq!(session.apply_clipping_mask(), None);

    // Groups cannot be clipped.
    let group = clip(&mut session, a, c).unwrap();
    assert_eq!(clip(&mut session, group, b), None);
    assert_eq!(session.document().len(), 4);
}

#[test]
fn nested_clip_group_keeps_container() {
    let mut session = EditorSession::default();
    let outer_photo = session.create("image", Some(&ElementPatch::position(0.0, 0.0)));
    let outer_mask = session.create("rect", Some(&ElementPatch::position(300.0, 300.0)));
    let outer = clip(&mut session, outer_photo, outer_mask).unwrap();

    // A second pair inside the outer group.
    let inner_photo = session.create("image", Some(&ElementPatch::position(10.0, 10.0)));
    let inner_mask = session.create("circle", Some(&ElementPatch::position(60.0, 60.0)));
    for id in [inner_photo, inner_mask] {
        let drop = pk_editor::LayerDrop {
            dragged: id,
            container: Some(outer),
            index: usize::MAX,
        };
        assert!(session.reorder_layer(drop));
    }
    let before = absolute(&session, inner_photo);
    let inner = clip(&mut session, inner_photo, inner_mask).unwrap();

    assert_eq!(session.document().container_of(inner), Some(outer));
    assert_eq!(absolute(&session, inner_photo), before);

    session.release_clipping_mask(inner);
    assert_eq!(session.document().container_of(inner_photo), Some(outer));
    assert_eq!(absolute(&session, inner_photo), before);
}

#[test]
fn clipped_state_follows_group_membership() {
    let mut session = EditorSession::default();
    let text = session.create("text", None);
    let mask = session.create("ellipse", None);
    let group = clip(&mut session, text, mask).unwrap();

    assert!(session.is_element_clipped(text));
    assert!(session.is_element_clipped(mask));
    match &session.document().get(group).unwrap().kind {
        ElementKind::Group(g) => assert_eq!((g.width, g.height), (160.0, 100.0)),
        other => panic!("expected group, got {other:?}"),
    }
}
