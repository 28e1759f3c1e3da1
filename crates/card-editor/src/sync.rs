//! Sync engine: editor canvas ↔ layout JSON.
//!
//! The engine owns the authoritative `LayoutDocument` for one editing
//! session. Canvas gestures and the property panel change it through
//! `LayoutMutation`s; the JSON text is re-emitted lazily, only when a host
//! asks for it. Replacing the text (undo snapshots, an external JSON edit)
//! re-parses it into a fresh document.

use card_core::binding::DataDocument;
use card_core::config::EngineConfig;
use card_core::emitter::emit_layout;
use card_core::error::LayoutError;
use card_core::id::ElementKey;
use card_core::layout::{EstimateMeasure, TextMeasure, resolve_bounds};
use card_core::model::{Bounds, LayoutDocument, LayoutElement, LayoutEntry, TextAlign, Width};
use card_core::parser::parse_layout;
use std::collections::HashMap;

/// Holds the layout, its bound data, and the resolved element boxes.
pub struct SyncEngine {
    /// The layout being edited (single source of truth).
    pub doc: LayoutDocument,

    /// Data the layout binds against. Read-only for the editor.
    pub data: DataDocument,

    /// The layout JSON (kept in sync with `doc` on demand).
    pub text: String,

    /// Canvas-space boxes, recomputed after every mutation.
    pub bounds: HashMap<ElementKey, Bounds>,

    pub config: EngineConfig,

    measure: Box<dyn TextMeasure>,

    /// Set when `doc` changed and `text` needs re-emit.
    text_dirty: bool,
}

impl SyncEngine {
    /// Start from layout JSON text.
    pub fn from_text(text: &str, data: DataDocument, config: EngineConfig) -> Result<Self, LayoutError> {
        let doc = parse_layout(text)?;
        Ok(Self::from_document(doc, data, config))
    }

    pub fn from_document(doc: LayoutDocument, data: DataDocument, config: EngineConfig) -> Self {
        let text = emit_layout(&doc);
        let mut engine = Self {
            doc,
            data,
            text,
            bounds: HashMap::new(),
            config,
            measure: Box::new(EstimateMeasure),
            text_dirty: false,
        };
        engine.resolve();
        engine
    }

    /// Swap the text measurer (hosts with real font metrics).
    pub fn set_measure(&mut self, measure: Box<dyn TextMeasure>) {
        self.measure = measure;
        self.resolve();
    }

    /// Apply one mutation to the document. Marks the text dirty and
    /// re-resolves bounds.
    pub fn apply_mutation(&mut self, mutation: LayoutMutation) -> Result<(), LayoutError> {
        match mutation {
            LayoutMutation::MoveElement { key, x, y } => {
                let el = self.element_mut(key)?;
                el.x = x;
                el.y = y;
            }
            LayoutMutation::SetProperty { key, prop } => {
                let el = self.element_mut(key)?;
                prop.apply(el)?;
            }
            LayoutMutation::RemoveElement { key } => {
                self.doc.remove(key).ok_or(LayoutError::UnknownElement(key))?;
            }
            LayoutMutation::InsertElement { key, position, entry } => {
                self.doc.insert_at(key, *entry, position)?;
            }
        }
        self.text_dirty = true;
        self.resolve();
        Ok(())
    }

    fn element_mut(&mut self, key: ElementKey) -> Result<&mut LayoutElement, LayoutError> {
        self.doc.get_mut(key).ok_or(LayoutError::UnknownElement(key))
    }

    /// Re-emit the layout JSON if the document changed.
    pub fn flush_to_text(&mut self) {
        if self.text_dirty {
            self.text = emit_layout(&self.doc);
            self.text_dirty = false;
        }
    }

    /// Recompute element boxes.
    pub fn resolve(&mut self) {
        self.bounds = resolve_bounds(&self.doc, &self.data, &self.config, self.measure.as_ref());
    }

    /// Replace the whole layout from JSON text. On error the current
    /// document is left untouched.
    pub fn set_text(&mut self, new_text: &str) -> Result<(), LayoutError> {
        let doc = parse_layout(new_text)?;
        self.doc = doc;
        self.text = new_text.to_string();
        self.text_dirty = false;
        self.resolve();
        Ok(())
    }

    /// Replace the bound data (e.g. the host edited a name).
    pub fn set_data(&mut self, data: DataDocument) {
        self.data = data;
        self.resolve();
    }

    /// Get the current layout JSON, flushing pending changes.
    pub fn current_text(&mut self) -> &str {
        self.flush_to_text();
        &self.text
    }

    pub fn current_bounds(&self) -> &HashMap<ElementKey, Bounds> {
        &self.bounds
    }
}

// ─── Mutations ───────────────────────────────────────────────────────────

/// A reversible change to the layout document.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutMutation {
    /// Set the stored `x`/`y` of an element.
    MoveElement { key: ElementKey, x: f64, y: f64 },
    SetProperty { key: ElementKey, prop: ElementProp },
    RemoveElement { key: ElementKey },
    /// Put an entry back at a document position (undo of a delete).
    InsertElement {
        key: ElementKey,
        position: usize,
        entry: Box<LayoutEntry>,
    },
}

impl LayoutMutation {
    pub fn key(&self) -> ElementKey {
        match self {
            Self::MoveElement { key, .. }
            | Self::SetProperty { key, .. }
            | Self::RemoveElement { key }
            | Self::InsertElement { key, .. } => *key,
        }
    }
}

/// A property the editor panel can set on an element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementProp {
    X(f64),
    Y(f64),
    Width(Width),
    Height(Option<f64>),
    ZIndex(Option<i64>),
    /// Text only.
    Align(Option<TextAlign>),
}

impl ElementProp {
    /// Parse a panel edit. Empty values clear optional properties.
    pub fn parse(name: &str, value: &str) -> Result<Self, LayoutError> {
        let value = value.trim();
        let invalid = || LayoutError::invalid_property(name, value);
        let number = || value.parse::<f64>().ok().filter(|v| v.is_finite()).ok_or_else(invalid);

        match name {
            "x" => number().map(Self::X),
            "y" => number().map(Self::Y),
            "width" if value.eq_ignore_ascii_case("auto") => Ok(Self::Width(Width::Auto)),
            "width" => {
                let w = number()?;
                if w < 0.0 {
                    return Err(invalid());
                }
                Ok(Self::Width(Width::Px(w)))
            }
            "height" if value.is_empty() => Ok(Self::Height(None)),
            "height" => {
                let h = number()?;
                if h < 0.0 {
                    return Err(invalid());
                }
                Ok(Self::Height(Some(h)))
            }
            "zIndex" if value.is_empty() => Ok(Self::ZIndex(None)),
            "zIndex" => value.parse::<i64>().map(|z| Self::ZIndex(Some(z))).map_err(|_| invalid()),
            "align" if value.is_empty() => Ok(Self::Align(None)),
            "align" => TextAlign::parse(value).map(|a| Self::Align(Some(a))).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }

    /// JSON field name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::X(_) => "x",
            Self::Y(_) => "y",
            Self::Width(_) => "width",
            Self::Height(_) => "height",
            Self::ZIndex(_) => "zIndex",
            Self::Align(_) => "align",
        }
    }

    /// The same property holding the element's current value.
    pub fn current(&self, el: &LayoutElement) -> Self {
        match self {
            Self::X(_) => Self::X(el.x),
            Self::Y(_) => Self::Y(el.y),
            Self::Width(_) => Self::Width(el.width),
            Self::Height(_) => Self::Height(el.height),
            Self::ZIndex(_) => Self::ZIndex(el.z_index),
            Self::Align(_) => Self::Align(el.text().and_then(|t| t.align)),
        }
    }

    fn apply(&self, el: &mut LayoutElement) -> Result<(), LayoutError> {
        match self {
            Self::X(x) => el.x = *x,
            Self::Y(y) => el.y = *y,
            Self::Width(w) => el.width = *w,
            Self::Height(h) => el.height = *h,
            Self::ZIndex(z) => el.z_index = *z,
            Self::Align(align) => {
                let text = el.text_mut().ok_or_else(|| {
                    LayoutError::invalid_property("align", align.map(|a| a.as_str()).unwrap_or(""))
                })?;
                text.align = *align;
            }
        }
        Ok(())
    }
}
