//! Partial element updates.
//!
//! An `ElementPatch` is what the properties panel, drag handlers and
//! transformers send: every field optional, camelCase on the wire. Merging
//! is a straight field copy; derived fields are fixed up afterwards by
//! `propagate`.

use crate::model::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    // Base fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// An empty slug clears the label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    // Geometry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sides: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_points: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outer_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_closed: Option<bool>,

    // Text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecorations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,

    // Media
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_playing: Option<bool>,

    // Group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
}

fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *slot = v.clone();
    }
}

impl ElementPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn width(width: f64) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    pub fn touches_size(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }

    /// Parse a JSON patch object.
    ///
    /// # Errors
    /// Returns the `serde_json` error for malformed input or mistyped fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Merge into an element. Fields that the element's variant does not
    /// have are skipped.
    pub fn apply_to(&self, element: &mut Element) {
        let base = &mut element.base;
        set(&mut base.x, &self.x);
        set(&mut base.y, &self.y);
        set(&mut base.stroke, &self.stroke);
        set(&mut base.stroke_width, &self.stroke_width);
        set(&mut base.fill, &self.fill);
        if let Some(opacity) = self.opacity {
            base.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(slug) = &self.slug {
            base.slug = (!slug.is_empty()).then(|| slug.clone());
        }

        let ty = element.kind.element_type();
        match &mut element.kind {
            ElementKind::Rect(r) | ElementKind::Square(r) => {
                set(&mut r.width, &self.width);
                set(&mut r.height, &self.height);
                set(&mut r.corner_radius, &self.corner_radius);
            }
            ElementKind::Circle(c) => {
                set(&mut c.radius, &self.radius);
                set(&mut c.width, &self.width);
                set(&mut c.height, &self.height);
            }
            ElementKind::Ellipse(e) => {
                set(&mut e.radius_x, &self.radius_x);
                set(&mut e.radius_y, &self.radius_y);
            }
            ElementKind::Polygon(p) => {
                if let Some(sides) = self.sides {
                    p.sides = sides.max(3);
                }
                set(&mut p.radius, &self.radius);
            }
            ElementKind::Star(s) => {
                if let Some(n) = self.num_points {
                    s.num_points = n.max(2);
                }
                set(&mut s.inner_radius, &self.inner_radius);
                set(&mut s.outer_radius, &self.outer_radius);
            }
            ElementKind::Arc(a) => {
                set(&mut a.inner_radius, &self.inner_radius);
                set(&mut a.outer_radius, &self.outer_radius);
                if let Some(angle) = self.angle {
                    a.angle = angle.clamp(0.0, 360.0);
                }
            }
            ElementKind::Line(l) => {
                set(&mut l.points, &self.points);
                set(&mut l.width, &self.width);
                set(&mut l.height, &self.height);
            }
            ElementKind::Pen(p) => {
                set(&mut p.points, &self.points);
                set(&mut p.is_closed, &self.is_closed);
                set(&mut p.width, &self.width);
                set(&mut p.height, &self.height);
            }
            ElementKind::Text(t) => {
                set(&mut t.text, &self.text);
                set(&mut t.font_size, &self.font_size);
                set(&mut t.font_family, &self.font_family);
                set(&mut t.font_weight, &self.font_weight);
                set(&mut t.font_style, &self.font_style);
                set(&mut t.text_decoration, &self.text_decoration);
                set(&mut t.text_align, &self.text_align);
                set(&mut t.line_height, &self.line_height);
                set(&mut t.padding, &self.padding);
            }
            ElementKind::Image(m) | ElementKind::Gif(m) => {
                set(&mut m.src, &self.src);
                set(&mut m.width, &self.width);
                set(&mut m.height, &self.height);
            }
            ElementKind::Video(v) => {
                set(&mut v.src, &self.src);
                set(&mut v.width, &self.width);
                set(&mut v.height, &self.height);
                set(&mut v.is_playing, &self.is_playing);
            }
            ElementKind::Group(g) => {
                set(&mut g.width, &self.width);
                set(&mut g.height, &self.height);
                set(&mut g.collapsed, &self.collapsed);
            }
        }

        let ignored: SmallVec<[&str; 4]> = self
            .variant_fields()
            .into_iter()
            .filter(|name| !fields_for(ty).contains(name))
            .collect();
        if !ignored.is_empty() {
            log::debug!("{ty} {} has no {ignored:?}, ignored", element.base.id);
        }
    }

    /// Names of the variant-specific fields this patch sets.
    fn variant_fields(&self) -> SmallVec<[&'static str; 8]> {
        let mut names = SmallVec::new();
        let flags: [(&'static str, bool); 24] = [
            ("width", self.width.is_some()),
            ("height", self.height.is_some()),
            ("cornerRadius", self.corner_radius.is_some()),
            ("radius", self.radius.is_some()),
            ("radiusX", self.radius_x.is_some()),
            ("radiusY", self.radius_y.is_some()),
            ("sides", self.sides.is_some()),
            ("numPoints", self.num_points.is_some()),
            ("innerRadius", self.inner_radius.is_some()),
            ("outerRadius", self.outer_radius.is_some()),
            ("angle", self.angle.is_some()),
            ("points", self.points.is_some()),
            ("isClosed", self.is_closed.is_some()),
            ("text", self.text.is_some()),
            ("fontSize", self.font_size.is_some()),
            ("fontFamily", self.font_family.is_some()),
            ("fontWeight", self.font_weight.is_some()),
            ("fontStyle", self.font_style.is_some()),
            ("textDecoration", self.text_decoration.is_some()),
            ("textAlign", self.text_align.is_some()),
            ("lineHeight", self.line_height.is_some()),
            ("padding", self.padding.is_some()),
            ("src", self.src.is_some()),
            ("isPlaying", self.is_playing.is_some()),
        ];
        for (name, present) in flags {
            if present {
                names.push(name);
            }
        }
        if self.collapsed.is_some() {
            names.push("collapsed");
        }
        names
    }
}

/// Variant-specific fields a patch may set on each type. Ellipses accept
/// `width`/`height` because transform-end updates derive the radii from them.
fn fields_for(ty: ElementType) -> &'static [&'static str] {
    match ty {
        ElementType::Rect | ElementType::Square => &["width", "height", "cornerRadius"],
        ElementType::Circle => &["radius", "width", "height"],
        ElementType::Ellipse => &["radiusX", "radiusY", "width", "height"],
        ElementType::Polygon => &["sides", "radius"],
        ElementType::Star => &["numPoints", "innerRadius", "outerRadius"],
        ElementType::Arc => &["innerRadius", "outerRadius", "angle"],
        ElementType::Line => &["points", "width", "height"],
        ElementType::Pen => &["points", "isClosed", "width", "height"],
        ElementType::Text => &[
            "text",
            "fontSize",
            "fontFamily",
            "fontWeight",
            "fontStyle",
            "textDecoration",
            "textAlign",
            "lineHeight",
            "padding",
        ],
        ElementType::Image | ElementType::Gif => &["src", "width", "height"],
        ElementType::Video => &["src", "width", "height", "isPlaying"],
        ElementType::Group => &["width", "height", "collapsed"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::defaults::default_element;
    use pretty_assertions::assert_eq;

    #[test]
    fn straight_merge_of_base_fields() {
        let mut e = default_element(ElementType::Rect, &StoreConfig::default());
        let patch = ElementPatch {
            x: Some(12.0),
            fill: Some("#ff0000".into()),
            opacity: Some(1.5),
            slug: Some("Banner".into()),
            ..ElementPatch::default()
        };
        patch.apply_to(&mut e);
        assert_eq!(e.base.x, 12.0);
        assert_eq!(e.base.y, 50.0);
        assert_eq!(e.base.fill, "#ff0000");
        assert_eq!(e.base.opacity, 1.0);
        assert_eq!(e.base.slug.as_deref(), Some("Banner"));

        ElementPatch {
            slug: Some(String::new()),
            ..ElementPatch::default()
        }
        .apply_to(&mut e);
        assert_eq!(e.base.slug, None);
    }

    #[test]
    fn foreign_fields_are_ignored() {
        let mut e = default_element(ElementType::Polygon, &StoreConfig::default());
        let before = e.clone();
        ElementPatch {
            text: Some("hello".into()),
            width: Some(10.0),
            ..ElementPatch::default()
        }
        .apply_to(&mut e);
        assert_eq!(e, before);
    }

    #[test]
    fn patch_from_json() {
        let patch = ElementPatch::from_json(
            r#"{ "fontStyle": "italic", "textDecoration": "underline", "fontSize": 32 }"#,
        )
        .unwrap();
        let mut e = default_element(ElementType::Text, &StoreConfig::default());
        patch.apply_to(&mut e);
        match &e.kind {
            ElementKind::Text(t) => {
                assert_eq!(t.font_style, FontStyle::Italic);
                assert!(t.text_decoration.contains(TextDecoration::Underline));
                assert_eq!(t.font_size, 32.0);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn polygon_sides_have_a_floor() {
        let mut e = default_element(ElementType::Polygon, &StoreConfig::default());
        ElementPatch {
            sides: Some(1),
            ..ElementPatch::default()
        }
        .apply_to(&mut e);
        match e.kind {
            ElementKind::Polygon(p) => assert_eq!(p.sides, 3),
            other => panic!("expected polygon, got {other:?}"),
        }
    }
}
