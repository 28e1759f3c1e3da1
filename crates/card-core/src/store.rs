//! Template persistence boundary.
//!
//! Storage is the host's business (files, a database, an HTTP backend); the
//! engine only needs `TemplateStore`. Layouts are validated on the way in and
//! on the way out, so malformed documents never reach the renderer unseen.

use crate::binding::DataDocument;
use crate::emitter::{emit_data, emit_layout};
use crate::error::LayoutError;
use crate::model::{LayoutDocument, LayoutEntry};
use crate::parser::{parse_data, parse_layout};
use std::collections::BTreeMap;

// ─── Store trait ─────────────────────────────────────────────────────────

/// A layout plus its content.
#[derive(Debug, Clone)]
pub struct TemplateBundle {
    pub layout: LayoutDocument,
    pub data: DataDocument,
}

impl TemplateBundle {
    /// Parse both documents.
    pub fn from_json(layout: &str, data: &str) -> Result<Self, LayoutError> {
        Ok(Self {
            layout: parse_layout(layout)?,
            data: parse_data(data)?,
        })
    }

    /// Keys of entries quarantined at parse time.
    pub fn malformed_keys(&self) -> Vec<String> {
        self.layout
            .entries()
            .filter(|(_, entry)| matches!(entry, LayoutEntry::Malformed { .. }))
            .map(|(key, _)| key.to_string())
            .collect()
    }
}

/// Loads and saves templates by id.
///
/// Implemented differently by each host:
/// - WASM: the page fetches JSON and hands it over
/// - CLI/tests: an in-memory map
pub trait TemplateStore {
    fn load(&self, id: &str) -> Result<TemplateBundle, LayoutError>;
    fn save(&mut self, id: &str, bundle: &TemplateBundle) -> Result<(), LayoutError>;
}

// ─── In-memory store ─────────────────────────────────────────────────────

/// Keeps the JSON text of each template, parsed on every load.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    templates: BTreeMap<String, (String, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw JSON text. Validated at the next `load`.
    pub fn insert_json(&mut self, id: impl Into<String>, layout: impl Into<String>, data: impl Into<String>) {
        self.templates.insert(id.into(), (layout.into(), data.into()));
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Stored JSON text of a template.
    pub fn json(&self, id: &str) -> Option<(&str, &str)> {
        self.templates.get(id).map(|(l, d)| (l.as_str(), d.as_str()))
    }
}

impl TemplateStore for MemoryStore {
    fn load(&self, id: &str) -> Result<TemplateBundle, LayoutError> {
        let (layout, data) = self
            .templates
            .get(id)
            .ok_or_else(|| LayoutError::TemplateNotFound(id.to_string()))?;
        let bundle = TemplateBundle::from_json(layout, data)?;
        let malformed = bundle.malformed_keys();
        if !malformed.is_empty() {
            log::warn!("template `{id}` has malformed entries: {}", malformed.join(", "));
        }
        Ok(bundle)
    }

    fn save(&mut self, id: &str, bundle: &TemplateBundle) -> Result<(), LayoutError> {
        bundle.layout.canvas.validate()?;
        log::debug!("saving template `{id}` ({} entries)", bundle.layout.len());
        self.templates
            .insert(id.to_string(), (emit_layout(&bundle.layout), emit_data(&bundle.data)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ElementKey;

    const LAYOUT: &str = r#"{ "baseSize": { "width": 335, "height": 515 },
        "groom": { "type": "text", "x": 24, "y": 395 } }"#;

    #[test]
    fn load_missing_template() {
        let store = MemoryStore::new();
        assert!(matches!(store.load("nope"), Err(LayoutError::TemplateNotFound(_))));
    }

    #[test]
    fn load_rejects_invalid_canvas() {
        let mut store = MemoryStore::new();
        store.insert_json("bad", r#"{ "baseSize": { "width": -1, "height": 1 } }"#, "{}");
        assert!(matches!(store.load("bad"), Err(LayoutError::InvalidCanvas { .. })));
    }

    #[test]
    fn save_then_load() {
        let mut store = MemoryStore::new();
        store.insert_json("classic", LAYOUT, r#"{ "wedding": { "groom": "민수" } }"#);

        let mut bundle = store.load("classic").unwrap();
        bundle.layout.get_mut(ElementKey::intern("groom")).unwrap().x = 74.0;
        store.save("classic", &bundle).unwrap();

        let reloaded = store.load("classic").unwrap();
        assert_eq!(reloaded.layout.get(ElementKey::intern("groom")).unwrap().x, 74.0);
        assert_eq!(reloaded.data.lookup("groom").as_deref(), Some("민수"));
        assert_eq!(store.ids().collect::<Vec<_>>(), ["classic"]);
    }
}
