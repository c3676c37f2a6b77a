//! Clip-path geometry for clipping masks.
//!
//! A mask's clip region is derived from its current attributes, in the
//! group-local space the mask lives in. Paths are cached per group and
//! re-derived only when the group's clip revision moves.

use kurbo::{
    Arc, BezPath, Circle, Ellipse, Point, Rect, RoundedRect, RoundedRectRadii, Shape, Vec2,
};
use pk_core::id::ElementId;
use pk_core::model::*;
use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Build the clip path for a mask element, or `None` for types that have
/// no clip geometry (text, line, media, groups).
pub fn clip_path(mask: &Element, tolerance: f64) -> Option<BezPath> {
    let center = Point::new(mask.base.x, mask.base.y);
    let path = match &mask.kind {
        ElementKind::Rect(r) | ElementKind::Square(r) => {
            let rect = Rect::new(center.x, center.y, center.x + r.width, center.y + r.height);
            if r.corner_radius.iter().any(|&c| c > 0.0) {
                let [tl, tr, br, bl] = r.corner_radius;
                RoundedRect::from_rect(rect, RoundedRectRadii::new(tl, tr, br, bl)).to_path(tolerance)
            } else {
                rect.to_path(tolerance)
            }
        }
        ElementKind::Circle(c) => Circle::new(center, c.effective_radius()).to_path(tolerance),
        ElementKind::Ellipse(e) => {
            Ellipse::new(center, Vec2::new(e.radius_x, e.radius_y), 0.0).to_path(tolerance)
        }
        ElementKind::Polygon(p) => {
            let sides = p.sides.max(3);
            let step = TAU / f64::from(sides);
            vertex_walk(center, (0..sides).map(|i| (p.radius, f64::from(i) * step)))
        }
        ElementKind::Star(s) => {
            let n = s.num_points.max(2) * 2;
            let step = PI / f64::from(s.num_points.max(2));
            vertex_walk(
                center,
                (0..n).map(|i| {
                    let r = if i % 2 == 0 { s.outer_radius } else { s.inner_radius };
                    (r, f64::from(i) * step)
                }),
            )
        }
        ElementKind::Arc(a) => annulus_sector(center, a, tolerance),
        ElementKind::Pen(p) => pen_path(mask.base.x, mask.base.y, &p.points, p.is_closed),
        ElementKind::Line(_)
        | ElementKind::Text(_)
        | ElementKind::Image(_)
        | ElementKind::Gif(_)
        | ElementKind::Video(_)
        | ElementKind::Group(_) => return None,
    };
    Some(path)
}

/// Closed polygon through `(radius, angle)` vertices around `center`.
/// Angles are measured from the top (−90°), clockwise on screen.
fn vertex_walk(center: Point, vertices: impl Iterator<Item = (f64, f64)>) -> BezPath {
    let mut path = BezPath::new();
    for (i, (r, angle)) in vertices.enumerate() {
        let theta = angle - FRAC_PI_2;
        let p = center + Vec2::new(r * theta.cos(), r * theta.sin());
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

/// Ring sector between the inner and outer radius, sweeping `angle`
/// degrees clockwise from the positive x axis.
fn annulus_sector(center: Point, arc: &ArcShape, tolerance: f64) -> BezPath {
    let sweep = arc.angle.clamp(0.0, 360.0).to_radians();
    let on_circle = |r: f64, theta: f64| center + Vec2::new(r * theta.cos(), r * theta.sin());

    let mut path = BezPath::new();
    path.move_to(on_circle(arc.outer_radius, 0.0));
    let outer = Arc {
        center,
        radii: Vec2::new(arc.outer_radius, arc.outer_radius),
        start_angle: 0.0,
        sweep_angle: sweep,
        x_rotation: 0.0,
    };
    path.extend(outer.append_iter(tolerance));

    if arc.inner_radius > 0.0 {
        path.line_to(on_circle(arc.inner_radius, sweep));
        let inner = Arc {
            center,
            radii: Vec2::new(arc.inner_radius, arc.inner_radius),
            start_angle: sweep,
            sweep_angle: -sweep,
            x_rotation: 0.0,
        };
        path.extend(inner.append_iter(tolerance));
    } else {
        path.line_to(center);
    }
    path.close_path();
    path
}

/// Smooth path through a flat point list: each interior point is a
/// quadratic control point, with curves ending at the midpoints between
/// consecutive points.
fn pen_path(ox: f64, oy: f64, points: &[f64], closed: bool) -> BezPath {
    let pts: Vec<Point> = points
        .chunks_exact(2)
        .map(|p| Point::new(ox + p[0], oy + p[1]))
        .collect();

    let mut path = BezPath::new();
    let Some((&first, rest)) = pts.split_first() else {
        return path;
    };
    path.move_to(first);
    if let Some((&last, interior)) = rest.split_last() {
        for (i, &ctrl) in interior.iter().enumerate() {
            let next = rest[i + 1];
            path.quad_to(ctrl, ctrl.midpoint(next));
        }
        path.line_to(last);
    }
    if closed {
        path.close_path();
    }
    path
}

// ─── Cache ───────────────────────────────────────────────────────────────

/// A derived clip region, tagged with the group revision it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPath {
    pub mask: ElementId,
    pub revision: u64,
    pub path: BezPath,
}

/// Per-group clip paths, re-derived when the group's revision changes.
///
/// Clear it whenever the document is replaced wholesale (template load):
/// revisions restart from zero in a fresh document.
#[derive(Debug)]
pub struct ClipCache {
    tolerance: f64,
    entries: HashMap<ElementId, ClipPath>,
}

impl Default for ClipCache {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl ClipCache {
    /// Tolerances at or near zero would never finish flattening curves and
    /// are raised to a small floor.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(1e-3),
            entries: HashMap::new(),
        }
    }

    /// Clip path of a group, or `None` if the group has no usable mask.
    pub fn clip_for(&mut self, doc: &Document, group: ElementId) -> Option<&ClipPath> {
        let mask = doc.get(doc.mask_of(group)?)?;
        let revision = doc.clip_revision(group);

        let stale = self
            .entries
            .get(&group)
            .is_none_or(|c| c.revision != revision || c.mask != mask.id());
        if stale {
            let path = clip_path(mask, self.tolerance)?;
            log::trace!("derived clip for {group} at revision {revision}");
            self.entries.insert(
                group,
                ClipPath {
                    mask: mask.id(),
                    revision,
                    path,
                },
            );
        }
        self.entries.get(&group)
    }

    /// Drop entries for groups that no longer exist.
    pub fn retain_live(&mut self, doc: &Document) {
        self.entries.retain(|group, _| doc.contains(*group));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
