//! Parser for layout and data JSON → `LayoutDocument` / `DataDocument`.
//!
//! Structural failures (not an object, no canvas, bad canvas size) are hard
//! errors. Individual entries that fail validation are quarantined as
//! `LayoutEntry::Malformed` so one bad element never blocks the rest.

use crate::binding::DataDocument;
use crate::error::LayoutError;
use crate::id::{CANVAS_KEY, ElementKey};
use crate::model::*;
use serde_json::{Map, Value};

/// Parse a layout JSON document.
pub fn parse_layout(input: &str) -> Result<LayoutDocument, LayoutError> {
    let value: Value = serde_json::from_str(input)?;
    parse_layout_value(&value)
}

/// Parse an already-decoded layout JSON value.
pub fn parse_layout_value(value: &Value) -> Result<LayoutDocument, LayoutError> {
    let Value::Object(top) = value else {
        return Err(LayoutError::NotAnObject {
            what: "layout document",
        });
    };

    let canvas_value = top.get(CANVAS_KEY).ok_or(LayoutError::MissingCanvas)?;
    let canvas = parse_canvas(canvas_value)?;
    let mut doc = LayoutDocument::new(canvas);

    for (position, (key, entry)) in top.iter().enumerate() {
        if key == CANVAS_KEY {
            doc.canvas_position = position;
            continue;
        }
        let entry = match parse_element(entry) {
            Ok(el) => LayoutEntry::Element(el),
            Err(reason) => {
                log::warn!("quarantined layout entry `{key}`: {reason}");
                LayoutEntry::Malformed {
                    raw: entry.clone(),
                    reason,
                }
            }
        };
        // JSON object keys are unique and `baseSize` was skipped above.
        doc.insert(ElementKey::intern(key), entry)?;
    }

    Ok(doc)
}

fn parse_canvas(value: &Value) -> Result<Canvas, LayoutError> {
    let Value::Object(obj) = value else {
        return Err(LayoutError::NotAnObject { what: CANVAS_KEY });
    };
    let dim = |name: &str| obj.get(name).and_then(Value::as_f64).unwrap_or(f64::NAN);
    Canvas::new(dim("width"), dim("height"))
}

/// Validate one element entry. The error string is the quarantine reason.
pub fn parse_element(value: &Value) -> Result<LayoutElement, String> {
    let Value::Object(obj) = value else {
        return Err("entry is not an object".to_string());
    };
    let type_name = match obj.get("type") {
        Some(Value::String(s)) if !s.is_empty() => s.as_str(),
        Some(_) => return Err("`type` must be a non-empty string".to_string()),
        None => return Err("missing `type`".to_string()),
    };

    let kind = match type_name {
        "text" => ElementKind::Text(parse_text_props(obj)?),
        "image" => ElementKind::Image(parse_image_props(obj)?),
        "vector" => ElementKind::Vector(parse_image_props(obj)?),
        "background" => ElementKind::Background(BackgroundProps {
            background_size: string(obj, "backgroundSize")?,
            background_position: string(obj, "backgroundPosition")?,
            background_color: string(obj, "backgroundColor")?,
        }),
        "container" => ElementKind::Container,
        other => ElementKind::Unknown(other.to_string()),
    };

    let width = match obj.get("width") {
        None | Some(Value::Null) => Width::Auto,
        Some(Value::String(s)) if s == "auto" => Width::Auto,
        Some(Value::Number(n)) => Width::Px(n.as_f64().unwrap_or(0.0)),
        Some(other) => return Err(format!("`width` must be a number or \"auto\", got {other}")),
    };

    Ok(LayoutElement {
        kind,
        x: number(obj, "x")?.unwrap_or(0.0),
        y: number(obj, "y")?.unwrap_or(0.0),
        width,
        height: number(obj, "height")?,
        z_index: number(obj, "zIndex")?.map(|z| z.round() as i64),
        editable: boolean(obj, "editable")?,
        raw: obj.clone(),
    })
}

fn parse_text_props(obj: &Map<String, Value>) -> Result<TextProps, String> {
    let align = match string(obj, "align")? {
        Some(s) => Some(TextAlign::parse(&s).ok_or_else(|| format!("unknown `align` value \"{s}\""))?),
        None => None,
    };
    // Unknown transforms render as `none`; the raw value survives re-emit.
    let text_transform = obj
        .get("textTransform")
        .and_then(|v| serde_json::from_value::<TextTransform>(v.clone()).ok());
    let font_weight = match obj.get("fontWeight") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => return Err(format!("`fontWeight` must be a number or string, got {other}")),
    };

    Ok(TextProps {
        font_size: number(obj, "fontSize")?,
        font_family: string(obj, "fontFamily")?,
        font_weight,
        color: string(obj, "color")?,
        align,
        letter_spacing: number(obj, "letterSpacing")?,
        line_height: number(obj, "lineHeight")?,
        text_transform,
        center_align: boolean(obj, "centerAlign")?.unwrap_or(false),
    })
}

fn parse_image_props(obj: &Map<String, Value>) -> Result<ImageProps, String> {
    let object_fit = match obj.get("objectFit") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            serde_json::from_value::<ObjectFit>(v.clone())
                .map_err(|_| format!("unknown `objectFit` value {v}"))?,
        ),
    };
    Ok(ImageProps { object_fit })
}

// ─── Field helpers ───────────────────────────────────────────────────────

fn number(obj: &Map<String, Value>, name: &str) -> Result<Option<f64>, String> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(other) => Err(format!("`{name}` must be a number, got {other}")),
    }
}

fn string(obj: &Map<String, Value>, name: &str) -> Result<Option<String>, String> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(format!("`{name}` must be a string, got {other}")),
    }
}

fn boolean(obj: &Map<String, Value>, name: &str) -> Result<Option<bool>, String> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(format!("`{name}` must be a boolean, got {other}")),
    }
}

// ─── Data document ───────────────────────────────────────────────────────

/// Parse a data JSON document. Blank input is an empty document.
pub fn parse_data(input: &str) -> Result<DataDocument, LayoutError> {
    if input.trim().is_empty() {
        return Ok(DataDocument::default());
    }
    match serde_json::from_str::<Value>(input)? {
        Value::Object(categories) => Ok(DataDocument::from_map(categories)),
        _ => Err(LayoutError::NotAnObject {
            what: "data document",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_layout() {
        let doc = parse_layout(
            r#"{
                "baseSize": { "width": 335, "height": 515 },
                "groom": { "type": "text", "x": 24, "y": 395, "width": 111, "fontSize": 18 }
            }"#,
        )
        .unwrap();
        assert_eq!(doc.canvas, Canvas::new(335.0, 515.0).unwrap());
        let groom = doc.get(ElementKey::intern("groom")).unwrap();
        assert_eq!(groom.x, 24.0);
        assert_eq!(groom.width, Width::Px(111.0));
        assert_eq!(groom.text().unwrap().font_size, Some(18.0));
    }

    #[test]
    fn structural_errors_are_hard_failures() {
        assert!(matches!(parse_layout("[1, 2]"), Err(LayoutError::NotAnObject { .. })));
        assert!(matches!(
            parse_layout(r#"{ "groom": { "type": "text" } }"#),
            Err(LayoutError::MissingCanvas)
        ));
        assert!(matches!(
            parse_layout(r#"{ "baseSize": { "width": 0, "height": 515 } }"#),
            Err(LayoutError::InvalidCanvas { .. })
        ));
        assert!(matches!(parse_layout("{ nope"), Err(LayoutError::Json(_))));
    }

    #[test]
    fn bad_entries_are_quarantined() {
        let doc = parse_layout(
            r#"{
                "baseSize": { "width": 100, "height": 100 },
                "notes": "just a string",
                "untyped": { "x": 1, "y": 2 },
                "badX": { "type": "text", "x": "left" },
                "ok": { "type": "image", "x": 1, "y": 2 }
            }"#,
        )
        .unwrap();
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.elements().count(), 1);
        for key in ["notes", "untyped", "badX"] {
            assert!(matches!(
                doc.entry(ElementKey::intern(key)),
                Some(LayoutEntry::Malformed { .. })
            ));
        }
    }

    #[test]
    fn unknown_type_is_kept_not_quarantined() {
        let doc = parse_layout(
            r#"{ "baseSize": { "width": 100, "height": 100 },
                 "sparkle": { "type": "particles", "x": 0, "y": 0 } }"#,
        )
        .unwrap();
        let el = doc.get(ElementKey::intern("sparkle")).unwrap();
        assert_eq!(el.kind, ElementKind::Unknown("particles".into()));
    }

    #[test]
    fn width_auto_and_missing() {
        let doc = parse_layout(
            r#"{ "baseSize": { "width": 100, "height": 100 },
                 "a_text": { "type": "text", "x": 0, "y": 0, "width": "auto", "align": "center" },
                 "b_text": { "type": "text", "x": 0, "y": 0 } }"#,
        )
        .unwrap();
        let a = doc.get(ElementKey::intern("a_text")).unwrap();
        assert!(a.is_auto_centered());
        assert!(doc.get(ElementKey::intern("b_text")).unwrap().width.is_auto());
    }

    #[test]
    fn parse_data_keeps_category_order() {
        let data = parse_data(r#"{ "wedding": { "groom": "민수" }, "extra": { "groom": "X" } }"#).unwrap();
        let cats: Vec<&str> = data.categories().map(|(name, _)| name).collect();
        assert_eq!(cats, ["wedding", "extra"]);
        assert!(parse_data("  ").unwrap().is_empty());
        assert!(matches!(parse_data("3"), Err(LayoutError::NotAnObject { .. })));
    }
}
