//! Data binding: element keys → display text and asset URLs.
//!
//! The data document groups values by category (`wedding`, `images`, ...).
//! Lookups are category-agnostic: categories are searched in document order
//! and the first one holding the key wins.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

// ─── Data document ───────────────────────────────────────────────────────

/// Category-keyed content for one template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataDocument {
    root: Map<String, Value>,
}

impl DataDocument {
    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Object-valued categories in document order. Other top-level values are ignored.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &Map<String, Value>)> {
        self.root.iter().filter_map(|(name, value)| match value {
            Value::Object(obj) => Some((name.as_str(), obj)),
            _ => None,
        })
    }

    /// Set `category.key = value`, creating the category when absent.
    pub fn set(&mut self, category: &str, key: &str, value: impl Into<String>) {
        let slot = self
            .root
            .entry(category.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(obj) = slot {
            obj.insert(key.to_string(), Value::String(value.into()));
        }
    }

    /// First category value for `key`, stringified. `null` counts as absent.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.categories()
            .find_map(|(_, obj)| obj.get(key).and_then(scalar_to_string))
    }

    /// First category value at a dotted path (`templateSet.cards.main`).
    pub fn lookup_path(&self, path: &str) -> Option<String> {
        self.categories().find_map(|(_, obj)| {
            let mut parts = path.split('.');
            let mut current = obj.get(parts.next()?)?;
            for part in parts {
                current = current.as_object()?.get(part)?;
            }
            scalar_to_string(current)
        })
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ─── Default table ───────────────────────────────────────────────────────

/// Fallback text shown when no category provides a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultTable {
    entries: HashMap<String, String>,
}

impl Default for DefaultTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DefaultTable {
    /// Authoring placeholders for the standard invitation keys.
    pub fn builtin() -> Self {
        const BUILTIN: &[(&str, &str)] = &[
            ("groom", "신랑"),
            ("bride", "신부"),
            ("date", "날짜"),
            ("venue", "장소"),
            ("time", "시간"),
            ("address", "주소"),
            ("groomFather", "신랑 아버지"),
            ("groomMother", "신랑 어머니"),
            ("brideFather", "신부 아버지"),
            ("brideMother", "신부 어머니"),
            ("groomLabel", "신랑"),
            ("brideLabel", "신부"),
            ("separator", "&"),
            ("separator2", "·"),
            ("title", "결혼합니다"),
            ("subtitle", "초대합니다"),
            ("message", "초대 문구"),
            ("dday", "D-DAY"),
            ("weddingDate", "날짜"),
            ("weddingTime", "시간"),
            ("weddingVenue", "장소"),
            ("invitation", "초대합니다"),
            ("and", "그리고"),
        ];
        Self {
            entries: BUILTIN
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// A table with no entries: every unresolved key echoes itself.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Layer `overrides` on top of this table.
    pub fn merged(mut self, overrides: &HashMap<String, String>) -> Self {
        for (k, v) in overrides {
            self.entries.insert(k.clone(), v.clone());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─── Resolution ──────────────────────────────────────────────────────────

/// Display text for `key`: data, then the default table, then the key itself.
pub fn resolve_text(key: &str, data: &DataDocument, defaults: &DefaultTable) -> String {
    if let Some(value) = data.lookup(key) {
        return value;
    }
    if let Some(value) = defaults.get(key) {
        return value.to_string();
    }
    log::debug!("no data or default for `{key}`, echoing the key");
    key.to_string()
}

/// Whether `key` has content in the data document (defaults not consulted).
pub fn has_text(key: &str, data: &DataDocument) -> bool {
    data.lookup(key).is_some()
}

/// Candidate data keys (or dotted paths) for an image key, in priority order.
pub fn image_aliases(key: &str) -> &'static [&'static str] {
    match key {
        "background" => &["cardBackground", "templateSet.cards.main"],
        "vector" => &["vector", "decoration", "decorationImage"],
        "decoration" => &["decoration", "decorationImage"],
        _ => &[],
    }
}

/// Asset URL for `key`. Unlike text there is no echo fallback.
pub fn resolve_image(key: &str, data: &DataDocument) -> Option<String> {
    let aliases = image_aliases(key);
    if aliases.is_empty() {
        return data.lookup(key);
    }
    aliases.iter().find_map(|alias| {
        if alias.contains('.') {
            data.lookup_path(alias)
        } else {
            data.lookup(alias)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_data;

    #[test]
    fn first_category_wins() {
        let data = parse_data(r#"{ "a": { "groom": "A" }, "b": { "groom": "B", "bride": "B2" } }"#).unwrap();
        let defaults = DefaultTable::builtin();
        assert_eq!(resolve_text("groom", &data, &defaults), "A");
        assert_eq!(resolve_text("bride", &data, &defaults), "B2");
    }

    #[test]
    fn null_values_fall_through() {
        let data = parse_data(r#"{ "a": { "groom": null }, "b": { "groom": "B" } }"#).unwrap();
        assert_eq!(resolve_text("groom", &data, &DefaultTable::empty()), "B");
    }

    #[test]
    fn scalars_are_stringified() {
        let data = parse_data(r#"{ "a": { "age": 30, "rsvp": true } }"#).unwrap();
        let defaults = DefaultTable::empty();
        assert_eq!(resolve_text("age", &data, &defaults), "30");
        assert_eq!(resolve_text("rsvp", &data, &defaults), "true");
    }

    #[test]
    fn default_table_then_echo() {
        let data = DataDocument::default();
        let defaults = DefaultTable::builtin();
        assert_eq!(resolve_text("groom", &data, &defaults), "신랑");
        assert_eq!(resolve_text("separator2", &data, &defaults), "·");
        assert_eq!(resolve_text("mysteryField", &data, &defaults), "mysteryField");
    }

    #[test]
    fn overrides_replace_builtin_entries() {
        let overrides = HashMap::from([("groom".to_string(), "Groom".to_string())]);
        let defaults = DefaultTable::builtin().merged(&overrides);
        assert_eq!(defaults.get("groom"), Some("Groom"));
        assert_eq!(defaults.get("bride"), Some("신부"));
    }

    #[test]
    fn background_aliases_walk_dotted_paths() {
        let data = parse_data(
            r#"{ "assets": { "templateSet": { "cards": { "main": "/img/main.png" } } } }"#,
        )
        .unwrap();
        assert_eq!(resolve_image("background", &data).as_deref(), Some("/img/main.png"));

        let data = parse_data(r#"{ "assets": { "cardBackground": "/img/bg.png" } }"#).unwrap();
        assert_eq!(resolve_image("background", &data).as_deref(), Some("/img/bg.png"));
    }

    #[test]
    fn vector_falls_back_to_decoration() {
        let data = parse_data(r#"{ "assets": { "decorationImage": "/img/flower.svg" } }"#).unwrap();
        assert_eq!(resolve_image("vector", &data).as_deref(), Some("/img/flower.svg"));
        assert_eq!(resolve_image("decoration", &data).as_deref(), Some("/img/flower.svg"));
        assert_eq!(resolve_image("photo", &data), None);
    }

    #[test]
    fn set_creates_category() {
        let mut data = DataDocument::default();
        data.set("wedding", "groom", "민수");
        assert_eq!(data.lookup("groom").as_deref(), Some("민수"));
        assert!(has_text("groom", &data));
    }
}
