//! Type-specific defaulting: `ElementType -> Element`.
//!
//! Every kind gets the common base fields (fresh id, default position,
//! stroke, fill, opacity) plus authoring defaults for its own payload.
//! The payload `Default` impls double as fallbacks for fields missing from
//! a loaded template.

use crate::config::StoreConfig;
use crate::id::ElementId;
use crate::model::*;

pub const DEFAULT_STROKE: &str = "#000000";
pub const DEFAULT_FILL: &str = "#cccccc";
pub const DEFAULT_TEXT_FILL: &str = "#000000";
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;
pub const DEFAULT_LINE_STROKE_WIDTH: f64 = 2.0;
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Font families offered by the properties panel.
pub const FONT_FAMILIES: [&str; 11] = [
    "Arial",
    "Verdana",
    "Helvetica",
    "Tahoma",
    "Trebuchet MS",
    "Times New Roman",
    "Georgia",
    "Courier New",
    "Lucida Console",
    "Impact",
    "Comic Sans MS",
];

/// Build a fully populated element of the given type with a fresh id.
#[must_use]
pub fn default_element(ty: ElementType, config: &StoreConfig) -> Element {
    default_element_with_id(ty, ElementId::generate(), config)
}

/// Same as [`default_element`] with a caller-chosen id.
#[must_use]
pub fn default_element_with_id(ty: ElementType, id: ElementId, config: &StoreConfig) -> Element {
    let mut element = Element::new(id, default_kind(ty));
    let (x, y) = config.default_position;
    element.base.x = x;
    element.base.y = y;
    element.base.stroke = DEFAULT_STROKE.into();
    element.base.stroke_width = DEFAULT_STROKE_WIDTH;
    element.base.fill = DEFAULT_FILL.into();
    element.base.opacity = 1.0;

    match ty {
        ElementType::Line => element.base.stroke_width = DEFAULT_LINE_STROKE_WIDTH,
        ElementType::Text => element.base.fill = DEFAULT_TEXT_FILL.into(),
        ElementType::Group => {
            element.base.stroke = String::new();
            element.base.stroke_width = 0.0;
            element.base.fill = String::new();
        }
        _ => {}
    }
    element
}

/// Default payload for a type.
pub fn default_kind(ty: ElementType) -> ElementKind {
    match ty {
        ElementType::Rect => ElementKind::Rect(RectShape::default()),
        ElementType::Square => ElementKind::Square(RectShape {
            width: 100.0,
            height: 100.0,
            corner_radius: [0.0; 4],
        }),
        ElementType::Circle => ElementKind::Circle(CircleShape::default()),
        ElementType::Ellipse => ElementKind::Ellipse(EllipseShape::default()),
        ElementType::Polygon => ElementKind::Polygon(PolygonShape::default()),
        ElementType::Star => ElementKind::Star(StarShape::default()),
        ElementType::Arc => ElementKind::Arc(ArcShape::default()),
        ElementType::Line => ElementKind::Line(LineShape::default()),
        ElementType::Pen => ElementKind::Pen(PenShape::default()),
        ElementType::Text => ElementKind::Text(TextShape::default()),
        ElementType::Image => ElementKind::Image(MediaShape::default()),
        ElementType::Gif => ElementKind::Gif(MediaShape::default()),
        ElementType::Video => ElementKind::Video(VideoShape::default()),
        ElementType::Group => ElementKind::Group(GroupShape::default()),
    }
}

impl Default for RectShape {
    fn default() -> Self {
        Self {
            width: 150.0,
            height: 100.0,
            corner_radius: [0.0; 4],
        }
    }
}

impl Default for CircleShape {
    fn default() -> Self {
        Self {
            radius: 50.0,
            width: 100.0,
            height: 100.0,
        }
    }
}

impl Default for EllipseShape {
    fn default() -> Self {
        Self {
            radius_x: 80.0,
            radius_y: 50.0,
        }
    }
}

impl Default for PolygonShape {
    fn default() -> Self {
        Self {
            sides: 6,
            radius: 100.0,
        }
    }
}

impl Default for StarShape {
    fn default() -> Self {
        Self {
            num_points: 5,
            inner_radius: 40.0,
            outer_radius: 80.0,
        }
    }
}

impl Default for ArcShape {
    fn default() -> Self {
        Self {
            inner_radius: 40.0,
            outer_radius: 80.0,
            angle: 90.0,
        }
    }
}

impl Default for LineShape {
    fn default() -> Self {
        Self {
            points: vec![0.0, 0.0, 100.0, 0.0],
            width: 100.0,
            height: 0.0,
        }
    }
}

impl Default for PenShape {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            is_closed: false,
            width: 0.0,
            height: 0.0,
        }
    }
}

impl Default for TextShape {
    fn default() -> Self {
        Self {
            text: "Text".into(),
            font_size: 24.0,
            font_family: DEFAULT_FONT_FAMILY.into(),
            font_weight: 400,
            font_style: FontStyle::Normal,
            text_decoration: TextDecorations::none(),
            text_align: TextAlign::Left,
            line_height: 1.0,
            padding: 0.0,
        }
    }
}

impl Default for MediaShape {
    fn default() -> Self {
        Self {
            src: String::new(),
            width: 150.0,
            height: 150.0,
        }
    }
}

impl Default for VideoShape {
    fn default() -> Self {
        Self {
            src: String::new(),
            width: 320.0,
            height: 180.0,
            is_playing: false,
        }
    }
}

impl Default for GroupShape {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            collapsed: false,
        }
    }
}
