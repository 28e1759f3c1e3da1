//! Core data model for card layout documents.
//!
//! A layout document is a set of named elements placed on one fixed design
//! canvas (`baseSize`). Elements live in a graph rooted at the canvas so
//! containers can later own children; today every element is a direct child
//! of the root. Document order is kept explicitly and only matters as the
//! z-order tiebreak.

use crate::error::LayoutError;
use crate::id::{CANVAS_KEY, ElementKey};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

// ─── Canvas ──────────────────────────────────────────────────────────────

/// The fixed reference resolution all coordinates are authored against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    /// Create a canvas, rejecting zero, negative, or non-finite dimensions.
    pub fn new(width: f64, height: f64) -> Result<Self, LayoutError> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(LayoutError::InvalidCanvas {
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn center_x(&self) -> f64 {
        self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.height / 2.0
    }

    /// The whole canvas as a box.
    pub fn bounds(&self) -> Bounds {
        Bounds {
            x: 0.0,
            y: 0.0,
            width: self.width,
            height: self.height,
        }
    }
}

// ─── Element fields ──────────────────────────────────────────────────────

/// Element width: canvas pixels or content-sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Width {
    Px(f64),
    /// `"auto"`: sized by content (variable-length names).
    Auto,
}

impl Width {
    pub fn px(&self) -> Option<f64> {
        match self {
            Width::Px(w) => Some(*w),
            Width::Auto => None,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Width::Auto)
    }
}

/// Horizontal text alignment (default: Left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            _ => None,
        }
    }
}

/// Render-time case transform. Content itself is never rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl TextTransform {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextTransform::None => "none",
            TextTransform::Uppercase => "uppercase",
            TextTransform::Lowercase => "lowercase",
            TextTransform::Capitalize => "capitalize",
        }
    }

    /// The string as it appears on screen. Used for measuring only.
    pub fn apply(&self, s: &str) -> String {
        match self {
            TextTransform::None => s.to_string(),
            TextTransform::Uppercase => s.to_uppercase(),
            TextTransform::Lowercase => s.to_lowercase(),
            TextTransform::Capitalize => {
                let mut out = String::with_capacity(s.len());
                let mut at_word_start = true;
                for c in s.chars() {
                    if at_word_start && c.is_alphabetic() {
                        out.extend(c.to_uppercase());
                    } else {
                        out.push(c);
                    }
                    at_word_start = c.is_whitespace();
                }
                out
            }
        }
    }
}

/// CSS `object-fit` for image and vector elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectFit {
    Cover,
    Contain,
    Fill,
    None,
    ScaleDown,
}

impl ObjectFit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectFit::Cover => "cover",
            ObjectFit::Contain => "contain",
            ObjectFit::Fill => "fill",
            ObjectFit::None => "none",
            ObjectFit::ScaleDown => "scale-down",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextProps {
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    /// Kept as a CSS value: numeric weights become `"700"`.
    pub font_weight: Option<String>,
    pub color: Option<String>,
    pub align: Option<TextAlign>,
    pub letter_spacing: Option<f64>,
    /// Unitless multiplier; `None` renders as `normal`.
    pub line_height: Option<f64>,
    pub text_transform: Option<TextTransform>,
    /// Set by import when the element sits on the canvas center line.
    /// `x` is then the horizontal center, not the left edge.
    pub center_align: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageProps {
    pub object_fit: Option<ObjectFit>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackgroundProps {
    pub background_size: Option<String>,
    pub background_position: Option<String>,
    pub background_color: Option<String>,
}

/// The element kinds, discriminated by the JSON `type` field.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Text(TextProps),
    Image(ImageProps),
    Vector(ImageProps),
    Background(BackgroundProps),
    /// Reserved area for future nesting. Renders nothing in production.
    Container,
    /// A `type` this engine does not know. Preserved, never rendered.
    Unknown(String),
}

impl ElementKind {
    /// The JSON `type` discriminator.
    pub fn type_name(&self) -> &str {
        match self {
            ElementKind::Text(_) => "text",
            ElementKind::Image(_) => "image",
            ElementKind::Vector(_) => "vector",
            ElementKind::Background(_) => "background",
            ElementKind::Container => "container",
            ElementKind::Unknown(name) => name,
        }
    }
}

// ─── Layout element ──────────────────────────────────────────────────────

/// One positioned element of a layout document.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutElement {
    pub kind: ElementKind,
    /// Left edge in canvas pixels (horizontal center when `center_align`).
    pub x: f64,
    pub y: f64,
    pub width: Width,
    /// Omitted for single-line text (derived from font metrics).
    pub height: Option<f64>,
    pub z_index: Option<i64>,
    /// Informational: whether end users may substitute content.
    pub editable: Option<bool>,
    /// The original JSON object, so unknown fields and key order survive re-emit.
    pub(crate) raw: Map<String, Value>,
}

impl LayoutElement {
    pub fn new(kind: ElementKind, x: f64, y: f64, width: Width) -> Self {
        Self {
            kind,
            x,
            y,
            width,
            height: None,
            z_index: None,
            editable: None,
            raw: Map::new(),
        }
    }

    /// Effective stacking order (unset = 0).
    pub fn z(&self) -> i64 {
        self.z_index.unwrap_or(0)
    }

    pub fn text(&self) -> Option<&TextProps> {
        match &self.kind {
            ElementKind::Text(props) => Some(props),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextProps> {
        match &mut self.kind {
            ElementKind::Text(props) => Some(props),
            _ => None,
        }
    }

    pub fn is_background(&self) -> bool {
        matches!(self.kind, ElementKind::Background(_))
    }

    /// Whether the renderer anchors this element by its horizontal center.
    pub fn is_center_anchored(&self) -> bool {
        self.text().is_some_and(|t| t.center_align)
    }

    /// Whether this is auto-width, center-aligned text pinned to `left: 50%`.
    pub fn is_auto_centered(&self) -> bool {
        self.width.is_auto()
            && self
                .text()
                .is_some_and(|t| t.align == Some(TextAlign::Center))
    }
}

// ─── Layout document ─────────────────────────────────────────────────────

/// What a document node holds.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEntry {
    /// The canvas itself.
    Root,
    Element(LayoutElement),
    /// An entry that failed validation. Kept for lossless re-emit, never rendered.
    Malformed { raw: Value, reason: String },
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub key: ElementKey,
    pub entry: LayoutEntry,
}

/// A complete layout document: one canvas plus keyed elements.
#[derive(Debug, Clone)]
pub struct LayoutDocument {
    pub canvas: Canvas,

    /// Containment graph. Edges go from parent → child.
    pub graph: StableDiGraph<LayoutNode, ()>,

    /// The canvas node.
    pub root: NodeIndex,

    /// Index from key → node for fast lookup.
    pub id_index: HashMap<ElementKey, NodeIndex>,

    /// Document order of the root's children. Stable graph indices are
    /// reused after removal, so order cannot be derived from them.
    order: Vec<NodeIndex>,

    /// Position of the `baseSize` record among the top-level JSON keys.
    pub(crate) canvas_position: usize,
}

impl LayoutDocument {
    /// Create an empty document on the given canvas.
    pub fn new(canvas: Canvas) -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(LayoutNode {
            key: ElementKey::intern(CANVAS_KEY),
            entry: LayoutEntry::Root,
        });
        Self {
            canvas,
            graph,
            root,
            id_index: HashMap::new(),
            order: Vec::new(),
            canvas_position: 0,
        }
    }

    /// Append an entry at the end of document order.
    pub fn insert(&mut self, key: ElementKey, entry: LayoutEntry) -> Result<NodeIndex, LayoutError> {
        let position = self.order.len();
        self.insert_at(key, entry, position)
    }

    /// Insert an entry at `position` in document order (clamped to the end).
    pub fn insert_at(
        &mut self,
        key: ElementKey,
        entry: LayoutEntry,
        position: usize,
    ) -> Result<NodeIndex, LayoutError> {
        if key.as_str() == CANVAS_KEY || matches!(entry, LayoutEntry::Root) {
            return Err(LayoutError::ReservedKey(key.as_str().to_string()));
        }
        if self.id_index.contains_key(&key) {
            return Err(LayoutError::DuplicateElement(key));
        }
        let idx = self.graph.add_node(LayoutNode { key, entry });
        self.graph.add_edge(self.root, idx, ());
        self.id_index.insert(key, idx);
        let position = position.min(self.order.len());
        self.order.insert(position, idx);
        Ok(idx)
    }

    /// Remove an entry entirely. Returns its former document position and entry.
    pub fn remove(&mut self, key: ElementKey) -> Option<(usize, LayoutEntry)> {
        let idx = self.id_index.remove(&key)?;
        let position = self.order.iter().position(|&i| i == idx)?;
        self.order.remove(position);
        self.graph.remove_node(idx).map(|node| (position, node.entry))
    }

    pub fn contains(&self, key: ElementKey) -> bool {
        self.id_index.contains_key(&key)
    }

    pub fn entry(&self, key: ElementKey) -> Option<&LayoutEntry> {
        self.id_index.get(&key).map(|idx| &self.graph[*idx].entry)
    }

    /// Look up a well-formed element.
    pub fn get(&self, key: ElementKey) -> Option<&LayoutElement> {
        match self.entry(key)? {
            LayoutEntry::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: ElementKey) -> Option<&mut LayoutElement> {
        let idx = self.id_index.get(&key).copied()?;
        match &mut self.graph[idx].entry {
            LayoutEntry::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Document position of a key.
    pub fn position_of(&self, key: ElementKey) -> Option<usize> {
        let idx = self.id_index.get(&key)?;
        self.order.iter().position(|i| i == idx)
    }

    /// Children of a node in document order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        if idx == self.root {
            return self.order.clone();
        }
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// Number of entries (malformed included, canvas excluded).
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = ElementKey> + '_ {
        self.order.iter().map(|idx| self.graph[*idx].key)
    }

    /// All entries in document order.
    pub fn entries(&self) -> impl Iterator<Item = (ElementKey, &LayoutEntry)> + '_ {
        self.order.iter().map(|idx| {
            let node = &self.graph[*idx];
            (node.key, &node.entry)
        })
    }

    /// Well-formed elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementKey, &LayoutElement)> + '_ {
        self.entries().filter_map(|(key, entry)| match entry {
            LayoutEntry::Element(el) => Some((key, el)),
            _ => None,
        })
    }

    /// Well-formed elements back-to-front: ascending `zIndex`, ties by document order.
    pub fn paint_order(&self) -> Vec<(ElementKey, &LayoutElement)> {
        let mut elements: Vec<_> = self.elements().collect();
        // `sort_by_key` is stable, so equal z keeps document order.
        elements.sort_by_key(|(_, el)| el.z());
        elements
    }
}

// ─── Resolved geometry ───────────────────────────────────────────────────

/// A resolved canvas-space box (left edge, top edge, size).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the box lies fully inside the canvas.
    pub fn within(&self, canvas: &Canvas) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.right() <= canvas.width && self.bottom() <= canvas.height
    }
}

// ─── Editor guidelines ───────────────────────────────────────────────────

/// Orientation of an alignment guideline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// A horizontal line at `y = position`.
    Horizontal,
    /// A vertical line at `x = position`.
    Vertical,
}

/// An alignment line shown while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guideline {
    pub axis: Axis,
    pub position: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(x: f64, y: f64, z: Option<i64>) -> LayoutEntry {
        let mut el = LayoutElement::new(ElementKind::Text(TextProps::default()), x, y, Width::Auto);
        el.z_index = z;
        LayoutEntry::Element(el)
    }

    #[test]
    fn canvas_rejects_non_positive_sizes() {
        assert!(Canvas::new(335.0, 515.0).is_ok());
        assert!(matches!(
            Canvas::new(0.0, 515.0),
            Err(LayoutError::InvalidCanvas { .. })
        ));
        assert!(Canvas::new(335.0, -1.0).is_err());
        assert!(Canvas::new(f64::NAN, 10.0).is_err());
    }

    #[test]
    fn document_keeps_insertion_order() {
        let mut doc = LayoutDocument::new(Canvas::new(100.0, 100.0).unwrap());
        for key in ["groom", "bride", "date"] {
            doc.insert(ElementKey::intern(key), text(0.0, 0.0, None)).unwrap();
        }
        let keys: Vec<&str> = doc.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["groom", "bride", "date"]);
    }

    #[test]
    fn reinsert_after_remove_restores_position() {
        let mut doc = LayoutDocument::new(Canvas::new(100.0, 100.0).unwrap());
        for key in ["a_el", "b_el", "c_el"] {
            doc.insert(ElementKey::intern(key), text(0.0, 0.0, None)).unwrap();
        }
        let (pos, entry) = doc.remove(ElementKey::intern("b_el")).unwrap();
        assert_eq!(pos, 1);
        assert!(!doc.contains(ElementKey::intern("b_el")));

        // New element reuses the vacant graph slot but goes to the end.
        doc.insert(ElementKey::intern("d_el"), text(0.0, 0.0, None)).unwrap();
        doc.insert_at(ElementKey::intern("b_el"), entry, pos).unwrap();
        let keys: Vec<&str> = doc.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["a_el", "b_el", "c_el", "d_el"]);
    }

    #[test]
    fn duplicate_and_reserved_keys_rejected() {
        let mut doc = LayoutDocument::new(Canvas::new(100.0, 100.0).unwrap());
        doc.insert(ElementKey::intern("groom"), text(0.0, 0.0, None)).unwrap();
        assert!(matches!(
            doc.insert(ElementKey::intern("groom"), text(0.0, 0.0, None)),
            Err(LayoutError::DuplicateElement(_))
        ));
        assert!(matches!(
            doc.insert(ElementKey::intern("baseSize"), text(0.0, 0.0, None)),
            Err(LayoutError::ReservedKey(_))
        ));
    }

    #[test]
    fn paint_order_sorts_by_z_then_document_order() {
        let mut doc = LayoutDocument::new(Canvas::new(100.0, 100.0).unwrap());
        doc.insert(ElementKey::intern("top_el"), text(0.0, 0.0, Some(5))).unwrap();
        doc.insert(ElementKey::intern("first_tie"), text(0.0, 0.0, Some(1))).unwrap();
        doc.insert(ElementKey::intern("unset_z"), text(0.0, 0.0, None)).unwrap();
        doc.insert(ElementKey::intern("second_tie"), text(0.0, 0.0, Some(1))).unwrap();

        let order: Vec<&str> = doc.paint_order().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(order, ["unset_z", "first_tie", "second_tie", "top_el"]);
    }

    #[test]
    fn bounds_geometry() {
        let b = Bounds {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
        };
        assert!(b.contains(10.0, 20.0));
        assert!(b.contains(110.0, 70.0));
        assert!(!b.contains(111.0, 70.0));
        assert_eq!(b.center(), (60.0, 45.0));
        assert_eq!(b.right(), 110.0);
        assert_eq!(b.bottom(), 70.0);
        assert!(b.within(&Canvas::new(200.0, 200.0).unwrap()));
        assert!(!b.within(&Canvas::new(100.0, 200.0).unwrap()));
    }
}
