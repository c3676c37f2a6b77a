//! Derived-field propagation.
//!
//! Some fields are functions of others and have to be recomputed whenever
//! an update touches their inputs:
//!
//! - a line's `points` always read `[0, 0, width, height]`
//! - a square's `height` follows its `width`
//! - a pen path's `width`/`height` follow the extent of its points
//! - an ellipse resized by a transform handle derives its radii from the
//!   new box
//! - a group resized by a transform handle scales every member
//!
//! The rules live here so every update path (panel edits, drags,
//! transformer gestures, template normalization) shares them.

use crate::id::ElementId;
use crate::model::*;
use crate::patch::ElementPatch;
use serde::{Deserialize, Serialize};

/// Where an update came from. Transform-end updates carry scale-derived
/// sizes and trigger the extra ellipse rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateOrigin {
    #[default]
    Edit,
    TransformEnd,
}

/// Merge a patch into an element, then recompute its derived fields.
pub fn apply_patch(element: &mut Element, patch: &ElementPatch, origin: UpdateOrigin) {
    patch.apply_to(element);
    propagate(element, patch, origin);
}

/// Recompute the fields derived from whatever `patch` touched.
pub fn propagate(element: &mut Element, patch: &ElementPatch, origin: UpdateOrigin) {
    match &mut element.kind {
        ElementKind::Line(line) if patch.touches_size() => {
            line.points = vec![0.0, 0.0, line.width, line.height];
        }
        // Endpoint drag: the first point becomes the origin, the last one
        // gives the size.
        ElementKind::Line(line) if patch.points.is_some() => {
            if let &[x0, y0, .., x1, y1] = &line.points[..] {
                element.base.x += x0;
                element.base.y += y0;
                line.width = x1 - x0;
                line.height = y1 - y0;
            }
            line.points = vec![0.0, 0.0, line.width, line.height];
        }
        // Height-only patches are merged as-is.
        ElementKind::Square(square) => {
            if let Some(width) = patch.width {
                square.height = width;
            }
        }
        ElementKind::Pen(pen) if patch.points.is_some() => {
            let extent = points_bounds(&pen.points);
            pen.width = extent.width;
            pen.height = extent.height;
        }
        ElementKind::Ellipse(ellipse) if origin == UpdateOrigin::TransformEnd => {
            if let Some(width) = patch.width {
                ellipse.radius_x = width / 2.0;
            }
            if let Some(height) = patch.height {
                ellipse.radius_y = height / 2.0;
            }
        }
        _ => {}
    }
}

/// Bring a loaded element in line with the derivation rules.
pub fn normalize(element: &mut Element) {
    match &mut element.kind {
        ElementKind::Line(line) => line.points = vec![0.0, 0.0, line.width, line.height],
        ElementKind::Square(square) => square.height = square.width,
        ElementKind::Pen(pen) => {
            let extent = points_bounds(&pen.points);
            pen.width = extent.width;
            pen.height = extent.height;
        }
        _ => {}
    }
}

// ─── Transform gestures ──────────────────────────────────────────────────

/// Final state of a transformer gesture: new position plus the scale the
/// user dragged to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Transform {
    pub fn scale(x: f64, y: f64, scale_x: f64, scale_y: f64) -> Self {
        Self {
            x,
            y,
            scale_x,
            scale_y,
        }
    }
}

/// Convert a finished transform of a non-group element into the patch that
/// bakes the scale into its geometry. Box sizes never drop below
/// `min_size`; radii scale by the larger factor.
pub fn transform_patch(element: &Element, t: Transform, min_size: f64) -> ElementPatch {
    let (sx, sy) = (t.scale_x, t.scale_y);
    let s = sx.max(sy);
    let clamp = |v: f64| v.max(min_size);
    let mut patch = ElementPatch::position(t.x, t.y);

    match &element.kind {
        ElementKind::Rect(r) | ElementKind::Square(r) => {
            patch.width = Some(clamp(r.width * sx));
            patch.height = Some(clamp(r.height * sy));
        }
        ElementKind::Image(m) | ElementKind::Gif(m) => {
            patch.width = Some(clamp(m.width * sx));
            patch.height = Some(clamp(m.height * sy));
        }
        ElementKind::Video(v) => {
            patch.width = Some(clamp(v.width * sx));
            patch.height = Some(clamp(v.height * sy));
        }
        ElementKind::Circle(c) => {
            let radius = c.effective_radius() * s;
            patch.radius = Some(radius);
            patch.width = Some(clamp(radius * 2.0));
            patch.height = Some(clamp(radius * 2.0));
        }
        ElementKind::Ellipse(e) => {
            patch.width = Some(clamp(e.radius_x * 2.0 * sx));
            patch.height = Some(clamp(e.radius_y * 2.0 * sy));
        }
        ElementKind::Polygon(p) => patch.radius = Some(p.radius * s),
        ElementKind::Star(st) => {
            patch.inner_radius = Some(st.inner_radius * s);
            patch.outer_radius = Some(st.outer_radius * s);
        }
        ElementKind::Arc(a) => {
            patch.inner_radius = Some(a.inner_radius * s);
            patch.outer_radius = Some(a.outer_radius * s);
        }
        ElementKind::Line(l) => {
            patch.width = Some(l.width * sx);
            patch.height = Some(l.height * sy);
        }
        ElementKind::Pen(p) => {
            patch.points = Some(scale_points(&p.points, sx, sy));
            patch.width = Some(p.width * sx);
            patch.height = Some(p.height * sy);
        }
        ElementKind::Text(txt) => patch.font_size = Some((txt.font_size * sy).max(1.0)),
        ElementKind::Group(g) => {
            patch.width = Some(g.width * sx);
            patch.height = Some(g.height * sy);
        }
    }
    patch
}

fn scale_points(points: &[f64], sx: f64, sy: f64) -> Vec<f64> {
    points
        .chunks(2)
        .flat_map(|pair| match pair {
            [x, y] => vec![x * sx, y * sy],
            [x] => vec![x * sx],
            _ => Vec::new(),
        })
        .collect()
}

/// Scale an element's own geometry in place (no position change).
fn scale_geometry(element: &mut Element, sx: f64, sy: f64) {
    let s = sx.max(sy);
    match &mut element.kind {
        ElementKind::Rect(r) | ElementKind::Square(r) => {
            r.width *= sx;
            r.height *= sy;
        }
        ElementKind::Image(m) | ElementKind::Gif(m) => {
            m.width *= sx;
            m.height *= sy;
        }
        ElementKind::Video(v) => {
            v.width *= sx;
            v.height *= sy;
        }
        ElementKind::Circle(c) => {
            c.radius = c.effective_radius() * s;
            c.width *= sx;
            c.height *= sy;
        }
        ElementKind::Ellipse(e) => {
            e.radius_x *= sx;
            e.radius_y *= sy;
        }
        ElementKind::Polygon(p) => p.radius *= s,
        ElementKind::Star(st) => {
            st.inner_radius *= s;
            st.outer_radius *= s;
        }
        ElementKind::Arc(a) => {
            a.inner_radius *= s;
            a.outer_radius *= s;
        }
        ElementKind::Line(l) => {
            l.width *= sx;
            l.height *= sy;
            l.points = vec![0.0, 0.0, l.width, l.height];
        }
        ElementKind::Pen(p) => {
            p.points = scale_points(&p.points, sx, sy);
            p.width *= sx;
            p.height *= sy;
        }
        ElementKind::Text(t) => t.font_size = (t.font_size * sy).max(1.0),
        ElementKind::Group(g) => {
            g.width *= sx;
            g.height *= sy;
        }
    }
}

/// Apply a finished group transform.
///
/// The group takes the new position and scaled size; every member (and,
/// recursively, members of nested groups) has its group-local position and
/// geometry scaled about the group origin. The group's clip revision is
/// bumped so cached clip paths are re-derived. Returns false when `group`
/// is not a group in `doc`.
pub fn transform_group(doc: &mut Document, group: ElementId, t: Transform) -> bool {
    let Some(element) = doc.get_mut(group) else {
        return false;
    };
    let ElementKind::Group(shape) = &mut element.kind else {
        return false;
    };
    shape.width *= t.scale_x;
    shape.height *= t.scale_y;
    element.base.x = t.x;
    element.base.y = t.y;

    let depth = doc.len();
    scale_members(doc, group, t.scale_x, t.scale_y, depth);
    doc.bump_clip_revision(group);
    true
}

fn scale_members(doc: &mut Document, group: ElementId, sx: f64, sy: f64, depth: usize) {
    if depth == 0 {
        log::warn!("group nesting too deep under {group}, stopping scale");
        return;
    }
    for id in doc.children_of(Some(group)) {
        let Some(member) = doc.get_mut(id) else {
            continue;
        };
        member.base.x *= sx;
        member.base.y *= sy;
        scale_geometry(member, sx, sy);
        if member.is_group() {
            scale_members(doc, id, sx, sy, depth - 1);
            doc.bump_clip_revision(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::defaults::{default_element, default_element_with_id};
    use pretty_assertions::assert_eq;

    #[test]
    fn line_endpoint_drag_keeps_points_canonical() {
        let mut line = default_element(ElementType::Line, &StoreConfig::default());
        let (x, y) = (line.base.x, line.base.y);
        let patch = ElementPatch {
            points: Some(vec![10.0, 5.0, 20.0, 95.0]),
            ..ElementPatch::default()
        };
        apply_patch(&mut line, &patch, UpdateOrigin::Edit);
        assert_eq!((line.base.x, line.base.y), (x + 10.0, y + 5.0));
        match &line.kind {
            ElementKind::Line(l) => {
                assert_eq!((l.width, l.height), (10.0, 90.0));
                assert_eq!(l.points, vec![0.0, 0.0, 10.0, 90.0]);
            }
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn normalize_derives_pen_size() {
        let mut pen = default_element(ElementType::Pen, &StoreConfig::default());
        if let ElementKind::Pen(p) = &mut pen.kind {
            p.points = vec![0.0, 0.0, 40.0, 10.0, 20.0, 30.0];
            p.width = 0.0;
            p.height = 0.0;
        }
        normalize(&mut pen);
        match &pen.kind {
            ElementKind::Pen(p) => assert_eq!((p.width, p.height), (40.0, 30.0)),
            other => panic!("expected pen, got {other:?}"),
        }
    }

    #[test]
    fn line_points_follow_size() {
        let mut line = default_element(ElementType::Line, &StoreConfig::default());
        apply_patch(&mut line, &ElementPatch::size(40.0, 30.0), UpdateOrigin::Edit);
        match line.kind {
            ElementKind::Line(l) => assert_eq!(l.points, vec![0.0, 0.0, 40.0, 30.0]),
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn square_height_follows_width() {
        let mut sq = default_element(ElementType::Square, &StoreConfig::default());
        apply_patch(&mut sq, &ElementPatch::width(70.0), UpdateOrigin::Edit);
        match &sq.kind {
            ElementKind::Square(r) => assert_eq!((r.width, r.height), (70.0, 70.0)),
            other => panic!("expected square, got {other:?}"),
        }

        let height_only = ElementPatch {
            height: Some(20.0),
            ..ElementPatch::default()
        };
        apply_patch(&mut sq, &height_only, UpdateOrigin::Edit);
        match &sq.kind {
            ElementKind::Square(r) => assert_eq!((r.width, r.height), (70.0, 20.0)),
            other => panic!("expected square, got {other:?}"),
        }
    }

    #[test]
    fn ellipse_radii_only_on_transform_end() {
        let mut e = default_element(ElementType::Ellipse, &StoreConfig::default());
        apply_patch(&mut e, &ElementPatch::size(100.0, 40.0), UpdateOrigin::Edit);
        match &e.kind {
            ElementKind::Ellipse(el) => assert_eq!((el.radius_x, el.radius_y), (80.0, 50.0)),
            other => panic!("expected ellipse, got {other:?}"),
        }
        apply_patch(&mut e, &ElementPatch::size(100.0, 40.0), UpdateOrigin::TransformEnd);
        match &e.kind {
            ElementKind::Ellipse(el) => assert_eq!((el.radius_x, el.radius_y), (50.0, 20.0)),
            other => panic!("expected ellipse, got {other:?}"),
        }
    }

    #[test]
    fn transform_patch_clamps_box_sizes() {
        let rect = default_element(ElementType::Rect, &StoreConfig::default());
        let patch = transform_patch(&rect, Transform::scale(0.0, 0.0, 0.01, 2.0), 5.0);
        assert_eq!(patch.width, Some(5.0));
        assert_eq!(patch.height, Some(200.0));
        assert_eq!((patch.x, patch.y), (Some(0.0), Some(0.0)));

        let star = default_element(ElementType::Star, &StoreConfig::default());
        let patch = transform_patch(&star, Transform::scale(1.0, 1.0, 0.5, 2.0), 5.0);
        assert_eq!(patch.outer_radius, Some(160.0));
        assert_eq!(patch.inner_radius, Some(80.0));
    }

    #[test]
    fn group_transform_scales_members() {
        let config = StoreConfig::default();
        let group_id = ElementId::intern("gt_group");
        let mut group = default_element_with_id(ElementType::Group, group_id, &config);
        if let ElementKind::Group(g) = &mut group.kind {
            g.width = 100.0;
            g.height = 50.0;
        }
        let mut circle =
            default_element_with_id(ElementType::Circle, ElementId::intern("gt_circle"), &config);
        circle.base.group_id = Some(group_id);
        circle.base.x = 20.0;
        circle.base.y = 10.0;
        let mut doc = Document::from_elements(vec![group, circle]);

        assert!(transform_group(
            &mut doc,
            group_id,
            Transform::scale(5.0, 6.0, 2.0, 3.0)
        ));

        let group = doc.get(group_id).unwrap();
        assert_eq!((group.base.x, group.base.y), (5.0, 6.0));
        assert_eq!(group.bounds().width, 200.0);
        assert_eq!(group.bounds().height, 150.0);

        let circle = doc.get(ElementId::intern("gt_circle")).unwrap();
        assert_eq!((circle.base.x, circle.base.y), (40.0, 30.0));
        match &circle.kind {
            ElementKind::Circle(c) => assert_eq!(c.radius, 150.0),
            other => panic!("expected circle, got {other:?}"),
        }
        assert_eq!(doc.clip_revision(group_id), 1);
    }

    #[test]
    fn transform_group_rejects_non_groups() {
        let config = StoreConfig::default();
        let id = ElementId::intern("tg_rect");
        let mut doc =
            Document::from_elements(vec![default_element_with_id(ElementType::Rect, id, &config)]);
        assert!(!transform_group(&mut doc, id, Transform::scale(0.0, 0.0, 2.0, 2.0)));
    }
}
