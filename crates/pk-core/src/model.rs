//! Core element document model for PosterKit templates.
//!
//! A document is a single flat, ordered sequence of elements. The order is
//! the z-order: the first element is drawn first (bottom), the last one is
//! drawn last (top). Grouping is relational: a member points at its group
//! through `group_id`, and a group's children are found by scanning the
//! sequence. There is no second tree structure that could drift out of sync.
//!
//! Members of a group store `x`/`y` relative to the group's origin. A
//! group's own `x`/`y` are relative to its container, which makes them
//! absolute at the top level.

use crate::id::ElementId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

// ─── Element types ───────────────────────────────────────────────────────

/// The discriminator of an element, without any of its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Rect,
    Square,
    Circle,
    Ellipse,
    Polygon,
    Star,
    Arc,
    Line,
    Pen,
    Text,
    Image,
    Gif,
    Video,
    Group,
}

impl ElementType {
    pub const ALL: [ElementType; 14] = [
        ElementType::Rect,
        ElementType::Square,
        ElementType::Circle,
        ElementType::Ellipse,
        ElementType::Polygon,
        ElementType::Star,
        ElementType::Arc,
        ElementType::Line,
        ElementType::Pen,
        ElementType::Text,
        ElementType::Image,
        ElementType::Gif,
        ElementType::Video,
        ElementType::Group,
    ];

    /// The wire name (`"rect"`, `"square"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Rect => "rect",
            ElementType::Square => "square",
            ElementType::Circle => "circle",
            ElementType::Ellipse => "ellipse",
            ElementType::Polygon => "polygon",
            ElementType::Star => "star",
            ElementType::Arc => "arc",
            ElementType::Line => "line",
            ElementType::Pen => "pen",
            ElementType::Text => "text",
            ElementType::Image => "image",
            ElementType::Gif => "gif",
            ElementType::Video => "video",
            ElementType::Group => "group",
        }
    }

    /// Look up a type by wire name. Case-sensitive, like the template format.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Resolve a kind name coming from the toolbar. Unknown names fall back
    /// to the generic filled rectangle.
    pub fn from_name_or_rect(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            log::debug!("unknown element kind {name:?}, using rect");
            ElementType::Rect
        })
    }

    /// Raster or video content. Media can be clipped but never acts as a mask.
    pub fn is_media(self) -> bool {
        matches!(
            self,
            ElementType::Image | ElementType::Gif | ElementType::Video
        )
    }

    /// Whether an element of this type has clip geometry and can act as a mask.
    pub fn has_clip_geometry(self) -> bool {
        matches!(
            self,
            ElementType::Rect
                | ElementType::Square
                | ElementType::Circle
                | ElementType::Ellipse
                | ElementType::Polygon
                | ElementType::Star
                | ElementType::Arc
                | ElementType::Pen
        )
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Text styling ────────────────────────────────────────────────────────

/// A single text decoration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextDecoration {
    Underline,
    LineThrough,
}

impl TextDecoration {
    pub fn name(self) -> &'static str {
        match self {
            TextDecoration::Underline => "underline",
            TextDecoration::LineThrough => "line-through",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "underline" => Some(TextDecoration::Underline),
            "line-through" => Some(TextDecoration::LineThrough),
            _ => None,
        }
    }
}

/// Set of text decorations.
///
/// Serialized the way canvas text engines expect it: a space-separated
/// string such as `"underline line-through"`, or `""` for none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDecorations(SmallVec<[TextDecoration; 2]>);

impl TextDecorations {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, deco: TextDecoration) -> bool {
        self.0.contains(&deco)
    }

    pub fn insert(&mut self, deco: TextDecoration) {
        if !self.contains(deco) {
            self.0.push(deco);
        }
    }

    pub fn remove(&mut self, deco: TextDecoration) {
        self.0.retain(|d| *d != deco);
    }

    /// Turn a decoration on or off (checkbox semantics).
    pub fn set(&mut self, deco: TextDecoration, on: bool) {
        if on {
            self.insert(deco);
        } else {
            self.remove(deco);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TextDecoration> + '_ {
        self.0.iter().copied()
    }

    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|d| d.name())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse a space-separated decoration string. Unknown words are skipped.
    pub fn from_css(s: &str) -> Self {
        let mut set = Self::none();
        for word in s.split_whitespace() {
            match TextDecoration::from_name(word) {
                Some(deco) => set.insert(deco),
                None => log::debug!("ignoring text decoration {word:?}"),
            }
        }
        set
    }
}

impl FromIterator<TextDecoration> for TextDecorations {
    fn from_iter<I: IntoIterator<Item = TextDecoration>>(iter: I) -> Self {
        let mut set = Self::none();
        for deco in iter {
            set.insert(deco);
        }
        set
    }
}

impl Serialize for TextDecorations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for TextDecorations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_css(&s))
    }
}

/// Font slant / emphasis keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Bold,
    #[serde(rename = "italic bold")]
    ItalicBold,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

// ─── Variant payloads ────────────────────────────────────────────────────
//
// Authoring defaults for every payload live in `defaults.rs`. Missing
// fields in a loaded template fall back to those defaults.

/// Rectangle / square. Corner radii are `[top_left, top_right, bottom_right, bottom_left]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RectShape {
    pub width: f64,
    pub height: f64,
    pub corner_radius: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CircleShape {
    pub radius: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EllipseShape {
    pub radius_x: f64,
    pub radius_y: f64,
}

/// Regular polygon inscribed in a circle of `radius`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolygonShape {
    pub sides: u32,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StarShape {
    pub num_points: u32,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

/// Annulus sector. `angle` is the sweep in degrees, 0..=360.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArcShape {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub angle: f64,
}

/// Straight line. `points` is always `[0, 0, width, height]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineShape {
    pub points: Vec<f64>,
    pub width: f64,
    pub height: f64,
}

/// Freehand path. `points` is a flat `[x0, y0, x1, y1, ...]` list relative
/// to the element origin, edited directly by point drags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PenShape {
    pub points: Vec<f64>,
    pub is_closed: bool,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextShape {
    pub text: String,
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: u16,
    pub font_style: FontStyle,
    pub text_decoration: TextDecorations,
    pub text_align: TextAlign,
    pub line_height: f64,
    pub padding: f64,
}

/// Image or animated GIF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaShape {
    pub src: String,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoShape {
    pub src: String,
    pub width: f64,
    pub height: f64,
    pub is_playing: bool,
}

/// Group container. `width`/`height` cache the members' bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupShape {
    pub width: f64,
    pub height: f64,
    /// Layer-list collapse state.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub collapsed: bool,
}

/// Variant-specific payload, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Rect(RectShape),
    Square(RectShape),
    Circle(CircleShape),
    Ellipse(EllipseShape),
    Polygon(PolygonShape),
    Star(StarShape),
    Arc(ArcShape),
    Line(LineShape),
    Pen(PenShape),
    Text(TextShape),
    Image(MediaShape),
    Gif(MediaShape),
    Video(VideoShape),
    Group(GroupShape),
}

impl ElementKind {
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Rect(_) => ElementType::Rect,
            ElementKind::Square(_) => ElementType::Square,
            ElementKind::Circle(_) => ElementType::Circle,
            ElementKind::Ellipse(_) => ElementType::Ellipse,
            ElementKind::Polygon(_) => ElementType::Polygon,
            ElementKind::Star(_) => ElementType::Star,
            ElementKind::Arc(_) => ElementType::Arc,
            ElementKind::Line(_) => ElementType::Line,
            ElementKind::Pen(_) => ElementType::Pen,
            ElementKind::Text(_) => ElementType::Text,
            ElementKind::Image(_) => ElementType::Image,
            ElementKind::Gif(_) => ElementType::Gif,
            ElementKind::Video(_) => ElementType::Video,
            ElementKind::Group(_) => ElementType::Group,
        }
    }

    /// Where the element's `x`/`y` sit relative to its geometry.
    pub fn anchor(&self) -> Anchor {
        match self {
            ElementKind::Circle(_)
            | ElementKind::Ellipse(_)
            | ElementKind::Polygon(_)
            | ElementKind::Star(_)
            | ElementKind::Arc(_) => Anchor::Center,
            ElementKind::Line(_) | ElementKind::Pen(_) => Anchor::PointsOrigin,
            _ => Anchor::TopLeft,
        }
    }
}

/// Meaning of an element's `x`/`y`, fixed per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    Center,
    /// Offset added to every entry of the element's point list.
    PointsOrigin,
}

// ─── Elements ────────────────────────────────────────────────────────────

fn default_opacity() -> f64 {
    1.0
}

/// Fields shared by every element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementBase {
    pub id: ElementId,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub stroke: String,
    #[serde(default)]
    pub stroke_width: f64,
    #[serde(default)]
    pub fill: String,
    /// 0.0 ..= 1.0
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// User label shown in the layer list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Parent group. Absent for top-level elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<ElementId>,
    /// Inside its group, this element defines the clip region instead of
    /// being drawn.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_clipping_mask: bool,
}

impl ElementBase {
    pub fn new(id: ElementId) -> Self {
        Self {
            id,
            x: 0.0,
            y: 0.0,
            stroke: String::new(),
            stroke_width: 0.0,
            fill: String::new(),
            opacity: 1.0,
            slug: None,
            group_id: None,
            is_clipping_mask: false,
        }
    }
}

/// One placeable item: shared base fields plus a tagged variant payload.
///
/// On the wire both halves are flattened into a single JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind) -> Self {
        Self {
            base: ElementBase::new(id),
            kind,
        }
    }

    pub fn id(&self) -> ElementId {
        self.base.id
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn group_id(&self) -> Option<ElementId> {
        self.base.group_id
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ElementKind::Group(_))
    }

    pub fn is_clipping_mask(&self) -> bool {
        self.base.is_clipping_mask
    }

    /// Layer-list label: the slug, or `"<type> - <id prefix>"`.
    pub fn label(&self) -> String {
        match self.base.slug.as_deref() {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => format!("{} - {}", self.element_type(), self.base.id.short()),
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.base.x += dx;
        self.base.y += dy;
    }

    /// Axis-aligned bounding box in the coordinate space of the element's
    /// container (group-local for members).
    pub fn bounds(&self) -> Bounds {
        let (x, y) = (self.base.x, self.base.y);
        match &self.kind {
            ElementKind::Rect(r) | ElementKind::Square(r) => Bounds::new(x, y, r.width, r.height),
            ElementKind::Image(m) | ElementKind::Gif(m) => Bounds::new(x, y, m.width, m.height),
            ElementKind::Video(v) => Bounds::new(x, y, v.width, v.height),
            ElementKind::Group(g) => Bounds::new(x, y, g.width, g.height),
            ElementKind::Circle(c) => {
                let r = c.effective_radius();
                Bounds::centered(x, y, r, r)
            }
            ElementKind::Ellipse(e) => Bounds::centered(x, y, e.radius_x, e.radius_y),
            ElementKind::Polygon(p) => Bounds::centered(x, y, p.radius, p.radius),
            ElementKind::Star(s) => {
                let r = s.outer_radius.max(s.inner_radius);
                Bounds::centered(x, y, r, r)
            }
            ElementKind::Arc(a) => {
                let r = a.outer_radius.max(a.inner_radius);
                Bounds::centered(x, y, r, r)
            }
            ElementKind::Line(l) => points_bounds(&l.points).translated(x, y),
            ElementKind::Pen(p) => points_bounds(&p.points).translated(x, y),
            ElementKind::Text(t) => {
                // Approximation: no font metrics are available here.
                let lines: Vec<&str> = t.text.lines().collect();
                let rows = lines.len().max(1) as f64;
                let cols = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
                Bounds::new(
                    x,
                    y,
                    cols * t.font_size * 0.6 + 2.0 * t.padding,
                    rows * t.font_size * t.line_height + 2.0 * t.padding,
                )
            }
        }
    }
}

impl CircleShape {
    /// `radius`, falling back to half the width when unset.
    pub fn effective_radius(&self) -> f64 {
        if self.radius > 0.0 {
            self.radius
        } else {
            self.width / 2.0
        }
    }
}

/// Bounding box of a flat point list. Empty lists collapse to the origin.
pub fn points_bounds(points: &[f64]) -> Bounds {
    let mut pairs = points.chunks_exact(2);
    let Some(first) = pairs.next() else {
        return Bounds::default();
    };
    let (mut min_x, mut min_y) = (first[0], first[1]);
    let (mut max_x, mut max_y) = (first[0], first[1]);
    for p in pairs {
        min_x = min_x.min(p[0]);
        min_y = min_y.min(p[1]);
        max_x = max_x.max(p[0]);
        max_y = max_y.max(p[1]);
    }
    Bounds::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box around a center point with half-extents `rx`, `ry`.
    pub fn centered(cx: f64, cy: f64, rx: f64, ry: f64) -> Self {
        Self::new(cx - rx, cy - ry, rx * 2.0, ry * 2.0)
    }

    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if this bounds intersects with a rectangle (AABB overlap).
    pub fn intersects_rect(&self, rx: f64, ry: f64, rw: f64, rh: f64) -> bool {
        self.x < rx + rw
            && self.x + self.width > rx
            && self.y < ry + rh
            && self.y + self.height > ry
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = (self.x + self.width).max(other.x + other.width);
        let y1 = (self.y + self.height).max(other.y + other.height);
        Bounds::new(x0, y0, x1 - x0, y1 - y0)
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// The complete element collection.
///
/// `elements` is the flat sequence (z-order and intra-group order).
/// `id_index` maps ids to positions and is rebuilt after every structural
/// edit. `clip_revisions` counts geometry changes per group so render
/// caches know when to re-derive clip paths; it is runtime state and never
/// serialized.
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
    id_index: HashMap<ElementId, usize>,
    clip_revisions: HashMap<ElementId, u64>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from an already validated sequence.
    /// Callers must guarantee unique ids (see `template::from_json`).
    pub fn from_elements(elements: Vec<Element>) -> Self {
        let mut doc = Self {
            elements,
            id_index: HashMap::new(),
            clip_revisions: HashMap::new(),
        };
        doc.rebuild_index();
        doc
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Position of an element in the flat sequence.
    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.id_index.get(&id).copied()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.index_of(id).map(|idx| &self.elements[idx])
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.index_of(id).map(|idx| &mut self.elements[idx])
    }

    /// Append an element on top of the z-order.
    pub fn push(&mut self, element: Element) {
        self.id_index.insert(element.id(), self.elements.len());
        self.elements.push(element);
    }

    /// Insert at a position in the flat sequence (clamped to the end).
    pub fn insert(&mut self, index: usize, element: Element) {
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
        self.rebuild_index();
    }

    /// Remove an element by id, keeping the `id_index` synchronized.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let idx = self.index_of(id)?;
        let removed = self.elements.remove(idx);
        self.clip_revisions.remove(&id);
        self.rebuild_index();
        Some(removed)
    }

    /// Move the element at `from` to `to`, preserving the relative order
    /// of every other element. Returns false if either index is out of range.
    pub fn move_index(&mut self, from: usize, to: usize) -> bool {
        if from >= self.elements.len() || to >= self.elements.len() {
            return false;
        }
        if from != to {
            let element = self.elements.remove(from);
            self.elements.insert(to, element);
            self.rebuild_index();
        }
        true
    }

    /// Replace the whole collection.
    pub fn replace_all(&mut self, elements: Vec<Element>) {
        self.elements = elements;
        self.clip_revisions.clear();
        self.rebuild_index();
    }

    /// Rebuild the `id_index` (needed after any structural edit).
    pub fn rebuild_index(&mut self) {
        self.id_index.clear();
        for (idx, element) in self.elements.iter().enumerate() {
            self.id_index.insert(element.id(), idx);
        }
    }

    // ─── Relationships ───────────────────────────────────────────────────

    /// Container of an element: its group, or `None` at the top level.
    pub fn container_of(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(Element::group_id)
    }

    /// Visible children of a container, in flat-sequence order.
    /// `None` lists the top-level elements.
    pub fn children_of(&self, container: Option<ElementId>) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|e| e.group_id() == container)
            .map(Element::id)
            .collect()
    }

    /// Parent → children lookup for the whole document, built in one pass.
    pub fn children_lookup(&self) -> HashMap<Option<ElementId>, Vec<ElementId>> {
        let mut lookup: HashMap<Option<ElementId>, Vec<ElementId>> = HashMap::new();
        for element in &self.elements {
            lookup.entry(element.group_id()).or_default().push(element.id());
        }
        lookup
    }

    /// The clipping mask of a group, if any.
    pub fn mask_of(&self, group: ElementId) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|e| e.group_id() == Some(group) && e.is_clipping_mask())
            .map(Element::id)
    }

    /// Absolute canvas position of a container's origin.
    /// The root's origin is `(0, 0)`; nested groups accumulate offsets.
    pub fn absolute_origin(&self, container: Option<ElementId>) -> (f64, f64) {
        let (mut ox, mut oy) = (0.0, 0.0);
        let mut current = container;
        // Bounded walk: a malformed cycle cannot loop forever.
        for _ in 0..=self.elements.len() {
            let Some(group) = current.and_then(|id| self.get(id)) else {
                break;
            };
            ox += group.base.x;
            oy += group.base.y;
            current = group.group_id();
        }
        (ox, oy)
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: ElementId, descendant: ElementId) -> bool {
        if ancestor == descendant {
            return false;
        }
        let mut current = self.container_of(descendant);
        for _ in 0..=self.elements.len() {
            match current {
                Some(id) if id == ancestor => return true,
                Some(id) => current = self.container_of(id),
                None => return false,
            }
        }
        false
    }

    /// Absolute bounding box of an element on the canvas.
    pub fn absolute_bounds(&self, id: ElementId) -> Option<Bounds> {
        let element = self.get(id)?;
        let (ox, oy) = self.absolute_origin(element.group_id());
        Some(element.bounds().translated(ox, oy))
    }

    // ─── Clip revisions ──────────────────────────────────────────────────

    /// Current clip revision of a group (0 until its geometry first changes).
    pub fn clip_revision(&self, group: ElementId) -> u64 {
        self.clip_revisions.get(&group).copied().unwrap_or(0)
    }

    /// Mark a group's clip geometry as changed.
    pub fn bump_clip_revision(&mut self, group: ElementId) {
        *self.clip_revisions.entry(group).or_insert(0) += 1;
    }
}
