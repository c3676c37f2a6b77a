//! Clipping-mask groups.
//!
//! Applying a mask wraps a mask shape and a content element in a fresh
//! group sized to the mask; releasing dissolves the group and hands the
//! members back to the group's own container with their coordinates
//! restored. Both operate directly on the flat `Document`.

use pk_core::id::ElementId;
use pk_core::model::*;

/// Pick the mask out of a two-element selection.
///
/// Returns `(mask, content)`. The mask must have clip geometry and must not
/// be media; when both candidates qualify the upper one (later in the flat
/// sequence) wins. `None` when neither qualifies.
pub fn classify_pair(doc: &Document, a: ElementId, b: ElementId) -> Option<(ElementId, ElementId)> {
    let qualifies = |id: ElementId| {
        doc.get(id).is_some_and(|e| {
            let ty = e.element_type();
            ty.has_clip_geometry() && !ty.is_media()
        })
    };
    match (qualifies(a), qualifies(b)) {
        (true, false) => Some((a, b)),
        (false, true) => Some((b, a)),
        (true, true) => {
            if doc.index_of(a)? > doc.index_of(b)? {
                Some((a, b))
            } else {
                Some((b, a))
            }
        }
        (false, false) => None,
    }
}

/// Whether `ids` is a selection that `apply_clipping_mask` would accept.
pub fn can_apply_clipping_mask(doc: &Document, ids: &[ElementId]) -> bool {
    let &[a, b] = ids else {
        return false;
    };
    if a == b {
        return false;
    }
    let (Some(ea), Some(eb)) = (doc.get(a), doc.get(b)) else {
        return false;
    };
    if ea.is_group() || eb.is_group() || ea.group_id() != eb.group_id() {
        return false;
    }
    classify_pair(doc, a, b).is_some()
}

/// Wrap two elements in a clipping group. Returns the new group's id, or
/// `None` (leaving the document untouched) for an invalid selection.
pub fn apply_clipping_mask(doc: &mut Document, ids: &[ElementId]) -> Option<ElementId> {
    if !can_apply_clipping_mask(doc, ids) {
        log::debug!("clipping request ignored for {ids:?}");
        return None;
    }
    let (mask_id, content_id) = classify_pair(doc, ids[0], ids[1])?;
    let mask = doc.get(mask_id)?;
    let container = mask.group_id();
    let frame = mask.bounds();

    let group_id = ElementId::generate();
    let mut group = Element::new(
        group_id,
        ElementKind::Group(GroupShape {
            width: frame.width,
            height: frame.height,
            collapsed: false,
        }),
    );
    group.base.x = frame.x;
    group.base.y = frame.y;
    group.base.group_id = container;

    for (id, is_mask) in [(mask_id, true), (content_id, false)] {
        if let Some(member) = doc.get_mut(id) {
            member.translate(-frame.x, -frame.y);
            member.base.group_id = Some(group_id);
            member.base.is_clipping_mask = is_mask;
        }
    }
    doc.push(group);
    log::debug!("clipped {content_id} with {mask_id} in group {group_id}");
    Some(group_id)
}

/// Dissolve a group: members move to the group's container with
/// container-relative coordinates and lose their mask flag, then the group
/// element is removed. Returns the promoted member ids.
pub fn release_group(doc: &mut Document, group: ElementId) -> Vec<ElementId> {
    let Some(element) = doc.get(group).filter(|e| e.is_group()) else {
        return Vec::new();
    };
    let (gx, gy) = (element.base.x, element.base.y);
    let container = element.group_id();

    let members = doc.children_of(Some(group));
    for &id in &members {
        if let Some(member) = doc.get_mut(id) {
            member.translate(gx, gy);
            member.base.group_id = container;
            member.base.is_clipping_mask = false;
        }
    }
    doc.remove(group);
    members
}

/// Release the clipping group that `id` belongs to (`id` may be the group
/// itself or any member). Returns false when there is nothing to release.
pub fn release_clipping_mask(doc: &mut Document, id: ElementId) -> bool {
    let Some(element) = doc.get(id) else {
        return false;
    };
    let group = if element.is_group() {
        Some(id)
    } else {
        element.group_id()
    };
    match group {
        Some(group) if doc.get(group).is_some_and(Element::is_group) => {
            release_group(doc, group);
            log::debug!("released group {group}");
            true
        }
        _ => false,
    }
}

/// Whether `id` is drawn inside a clip region (member of a masked group).
pub fn is_clipped(doc: &Document, id: ElementId) -> bool {
    doc.get(id)
        .and_then(Element::group_id)
        .is_some_and(|group| doc.mask_of(group).is_some())
}

/// Whether a masked group has no visible content left.
pub(crate) fn has_no_content(doc: &Document, group: ElementId) -> bool {
    doc.mask_of(group).is_some()
        && doc
            .iter()
            .all(|e| e.group_id() != Some(group) || e.is_clipping_mask())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pk_core::config::StoreConfig;
    use pk_core::defaults::default_element_with_id;
    use pretty_assertions::assert_eq;

    fn element(ty: ElementType, id: &str, x: f64, y: f64) -> Element {
        let mut e = default_element_with_id(ty, ElementId::intern(id), &StoreConfig::default());
        e.base.x = x;
        e.base.y = y;
        e
    }

    #[test]
    fn mask_is_the_non_media_shape() {
        let doc = Document::from_elements(vec![
            element(ElementType::Image, "cp_img", 0.0, 0.0),
            element(ElementType::Circle, "cp_circle", 0.0, 0.0),
        ]);
        let (mask, content) =
            classify_pair(&doc, ElementId::intern("cp_img"), ElementId::intern("cp_circle")).unwrap();
        assert_eq!(mask, ElementId::intern("cp_circle"));
        assert_eq!(content, ElementId::intern("cp_img"));
    }

    #[test]
    fn upper_shape_wins_when_both_qualify() {
        let doc = Document::from_elements(vec![
            element(ElementType::Rect, "uw_rect", 0.0, 0.0),
            element(ElementType::Star, "uw_star", 0.0, 0.0),
        ]);
        let (mask, _) =
            classify_pair(&doc, ElementId::intern("uw_rect"), ElementId::intern("uw_star")).unwrap();
        assert_eq!(mask, ElementId::intern("uw_star"));
    }

    #[test]
    fn neither_qualifies() {
        let doc = Document::from_elements(vec![
            element(ElementType::Image, "nq_a", 0.0, 0.0),
            element(ElementType::Text, "nq_b", 0.0, 0.0),
        ]);
        let ids = [ElementId::intern("nq_a"), ElementId::intern("nq_b")];
        assert!(!can_apply_clipping_mask(&doc, &ids));
    }

    #[test]
    fn group_frames_the_mask_bounds() {
        let mut doc = Document::from_elements(vec![
            element(ElementType::Image, "gf_img", 60.0, 70.0),
            element(ElementType::Circle, "gf_circle", 100.0, 100.0),
        ]);
        let ids = [ElementId::intern("gf_img"), ElementId::intern("gf_circle")];
        let group = apply_clipping_mask(&mut doc, &ids).unwrap();

        let g = doc.get(group).unwrap();
        assert_eq!(g.bounds(), Bounds::new(50.0, 50.0, 100.0, 100.0));
        assert_eq!(doc.index_of(group), Some(2));

        let circle = doc.get(ElementId::intern("gf_circle")).unwrap();
        assert_eq!((circle.base.x, circle.base.y), (50.0, 50.0));
        assert!(circle.is_clipping_mask());
        let img = doc.get(ElementId::intern("gf_img")).unwrap();
        assert_eq!((img.base.x, img.base.y), (10.0, 20.0));
        assert!(!img.is_clipping_mask());
        assert!(is_clipped(&doc, ElementId::intern("gf_img")));
    }

    #[test]
    fn release_restores_container_coordinates() {
        let mut doc = Document::from_elements(vec![
            element(ElementType::Image, "rr_img", 60.0, 70.0),
            element(ElementType::Rect, "rr_rect", 40.0, 30.0),
        ]);
        let before = doc.elements().to_vec();
        let ids = [ElementId::intern("rr_img"), ElementId::intern("rr_rect")];
        apply_clipping_mask(&mut doc, &ids).unwrap();

        assert!(release_clipping_mask(&mut doc, ElementId::intern("rr_img")));
        assert_eq!(doc.elements(), before.as_slice());
        assert!(!release_clipping_mask(&mut doc, ElementId::intern("rr_img")));
    }

    #[test]
    fn members_of_different_containers_are_rejected() {
        let mut grouped = element(ElementType::Rect, "dc_rect", 0.0, 0.0);
        grouped.base.group_id = Some(ElementId::intern("dc_group"));
        let mut doc = Document::from_elements(vec![
            element(ElementType::Group, "dc_group", 0.0, 0.0),
            grouped,
            element(ElementType::Image, "dc_img", 0.0, 0.0),
        ]);
        let ids = [ElementId::intern("dc_rect"), ElementId::intern("dc_img")];
        assert_eq!(apply_clipping_mask(&mut doc, &ids), None);
        assert_eq!(doc.len(), 3);
    }
}
