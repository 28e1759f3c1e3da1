//! Build layout documents from design-tool element lists.
//!
//! Exporters hand over a flat list of named boxes with absolute positions.
//! Names become element keys; text sitting on the canvas center line is
//! re-anchored on its center.

use crate::align::normalize_center_align;
use crate::config::EngineConfig;
use crate::error::LayoutError;
use crate::id::{CANVAS_KEY, ElementKey};
use crate::model::*;
use serde::{Deserialize, Serialize};

/// One element as exported by the design tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedElement {
    /// Layer name; becomes the element key.
    pub name: String,
    /// `text`, `image`, `vector`, `background`, `frame`/`group`/`container`.
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_weight: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub text_align: Option<String>,
    #[serde(default)]
    pub letter_spacing: Option<f64>,
    #[serde(default)]
    pub line_height: Option<f64>,
    #[serde(default)]
    pub z_index: Option<i64>,
}

/// Parse an exported element list (a JSON array).
pub fn parse_imported(input: &str) -> Result<Vec<ImportedElement>, LayoutError> {
    Ok(serde_json::from_str(input)?)
}

/// Build a layout document from imported elements, in list order.
pub fn build_layout(canvas: Canvas, elements: &[ImportedElement], config: &EngineConfig) -> LayoutDocument {
    let mut doc = LayoutDocument::new(canvas);

    for imported in elements {
        let mut el = convert(imported);
        if normalize_center_align(&mut el, &canvas, config.center_align_tolerance) {
            log::debug!("import: `{}` snapped to the center line", imported.name);
        }

        let key = element_key(&doc, imported);
        // Keys are unique and never `baseSize` by construction.
        if let Err(err) = doc.insert(key, LayoutEntry::Element(el)) {
            log::warn!("import: skipped `{}`: {err}", imported.name);
        }
    }

    doc
}

fn convert(imported: &ImportedElement) -> LayoutElement {
    let kind = match imported.kind.as_str() {
        "text" => ElementKind::Text(TextProps {
            font_size: imported.font_size,
            font_family: imported.font_family.clone(),
            font_weight: imported.font_weight.map(|w| w.to_string()),
            color: imported.color.clone(),
            align: imported
                .text_align
                .as_deref()
                .and_then(|a| TextAlign::parse(&a.to_ascii_lowercase())),
            letter_spacing: imported.letter_spacing,
            line_height: imported.line_height,
            text_transform: None,
            center_align: false,
        }),
        "image" => ElementKind::Image(ImageProps::default()),
        "vector" => ElementKind::Vector(ImageProps::default()),
        "background" => ElementKind::Background(BackgroundProps {
            background_color: imported.color.clone(),
            ..Default::default()
        }),
        "container" | "frame" | "group" => ElementKind::Container,
        other => ElementKind::Unknown(other.to_string()),
    };
    let is_text = matches!(kind, ElementKind::Text(_));

    let mut el = LayoutElement::new(kind, imported.x, imported.y, Width::Px(imported.width));
    // Single-line text derives its height from the font.
    el.height = (!is_text).then_some(imported.height);
    el.z_index = imported.z_index;
    el
}

/// A free key derived from the layer name. Backgrounds always take `background`.
fn element_key(doc: &LayoutDocument, imported: &ImportedElement) -> ElementKey {
    let name = if imported.kind == "background" {
        crate::id::BACKGROUND_KEY.to_string()
    } else {
        sanitize(&imported.name)
    };
    ElementKey::unique_with_prefix(&name, |k| doc.contains(k) || k.as_str() == CANVAS_KEY)
}

/// Layer names like `Groom Name` become `groomName`.
fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if out.is_empty() {
                out.extend(c.to_lowercase());
            } else if upper_next {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            upper_next = false;
        } else {
            upper_next = !out.is_empty();
        }
    }
    if out.is_empty() { "element".to_string() } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::emit_layout;
    use pretty_assertions::assert_eq;

    fn text(name: &str, x: f64, width: f64) -> ImportedElement {
        ImportedElement {
            name: name.into(),
            kind: "text".into(),
            x,
            y: 10.0,
            width,
            height: 20.0,
            font_size: Some(18.0),
            font_family: None,
            font_weight: None,
            color: None,
            text_align: Some("CENTER".into()),
            letter_spacing: None,
            line_height: None,
            z_index: None,
        }
    }

    #[test]
    fn sanitize_layer_names() {
        assert_eq!(sanitize("Groom Name"), "groomName");
        assert_eq!(sanitize("decoration-2"), "decoration2");
        assert_eq!(sanitize("  "), "element");
        assert_eq!(sanitize("신랑 이름"), "신랑이름");
    }

    #[test]
    fn centered_text_is_reanchored() {
        let canvas = Canvas::new(335.0, 515.0).unwrap();
        let doc = build_layout(
            canvas,
            &[text("groom", 112.0, 111.0), text("bride", 24.0, 111.0)],
            &EngineConfig::default(),
        );
        let groom = doc.get(ElementKey::intern("groom")).unwrap();
        assert_eq!(groom.x, 167.5);
        assert!(groom.text().unwrap().center_align);
        assert_eq!(groom.height, None);

        let bride = doc.get(ElementKey::intern("bride")).unwrap();
        assert_eq!(bride.x, 24.0);
        assert!(!bride.text().unwrap().center_align);
        assert_eq!(bride.text().unwrap().align, Some(TextAlign::Center));
    }

    #[test]
    fn duplicate_names_get_suffixes() {
        let canvas = Canvas::new(100.0, 100.0).unwrap();
        let mut deco = text("decoration", 0.0, 10.0);
        deco.kind = "image".into();
        let doc = build_layout(canvas, &[deco.clone(), deco.clone(), deco], &EngineConfig::default());
        let keys: Vec<&str> = doc.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["decoration", "decoration2", "decoration3"]);
    }

    #[test]
    fn imported_layout_emits_clean_json() {
        let canvas = Canvas::new(335.0, 515.0).unwrap();
        let elements = parse_imported(
            r#"[{ "name": "Photo", "type": "image", "x": 20, "y": 100, "width": 295, "height": 200, "zIndex": 1 }]"#,
        )
        .unwrap();
        let doc = build_layout(canvas, &elements, &EngineConfig::default());
        assert_eq!(
            emit_layout(&doc),
            r#"{
  "baseSize": {
    "width": 335,
    "height": 515
  },
  "photo": {
    "type": "image",
    "x": 20,
    "y": 100,
    "width": 295,
    "height": 200,
    "zIndex": 1
  }
}
"#
        );
    }
}
