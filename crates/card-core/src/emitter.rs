//! Emitter: `LayoutDocument` → layout JSON.
//!
//! Output round-trips through the parser. Unknown fields and key order are
//! taken from each element's original object; typed fields overwrite their
//! raw counterparts.

use crate::binding::DataDocument;
use crate::id::CANVAS_KEY;
use crate::model::*;
use serde_json::{Map, Number, Value};

/// Emit a layout document as pretty-printed JSON.
#[must_use]
pub fn emit_layout(doc: &LayoutDocument) -> String {
    pretty(&Value::Object(layout_to_map(doc)))
}

/// Build the layout JSON object without serializing it.
#[must_use]
pub fn layout_to_map(doc: &LayoutDocument) -> Map<String, Value> {
    let mut out = Map::new();
    let canvas_at = doc.canvas_position.min(doc.len());
    for (position, (key, entry)) in doc.entries().enumerate() {
        if position == canvas_at {
            out.insert(CANVAS_KEY.to_string(), emit_canvas(&doc.canvas));
        }
        let value = match entry {
            LayoutEntry::Element(el) => emit_element(el),
            LayoutEntry::Malformed { raw, .. } => raw.clone(),
            LayoutEntry::Root => continue,
        };
        out.insert(key.as_str().to_string(), value);
    }
    if !out.contains_key(CANVAS_KEY) {
        out.insert(CANVAS_KEY.to_string(), emit_canvas(&doc.canvas));
    }
    out
}

fn emit_canvas(canvas: &Canvas) -> Value {
    let mut obj = Map::new();
    obj.insert("width".into(), number(canvas.width));
    obj.insert("height".into(), number(canvas.height));
    Value::Object(obj)
}

/// Emit one element as a JSON object.
#[must_use]
pub fn emit_element(el: &LayoutElement) -> Value {
    let mut obj = el.raw.clone();

    set(&mut obj, "type", Some(Value::String(el.kind.type_name().to_string())));
    set(&mut obj, "x", Some(number(el.x)));
    set(&mut obj, "y", Some(number(el.y)));
    let width = match el.width {
        Width::Px(w) => Some(number(w)),
        // Missing width and explicit `"auto"` parse the same; keep whichever was written.
        Width::Auto if obj.contains_key("width") => Some(Value::String("auto".into())),
        Width::Auto => None,
    };
    set(&mut obj, "width", width);
    set(&mut obj, "height", el.height.map(number));
    set(&mut obj, "zIndex", el.z_index.map(Value::from));
    if el.editable.is_some() || obj.contains_key("editable") {
        set(&mut obj, "editable", el.editable.map(Value::Bool));
    }

    match &el.kind {
        ElementKind::Text(t) => emit_text_props(&mut obj, t),
        ElementKind::Image(i) | ElementKind::Vector(i) => {
            set(&mut obj, "objectFit", i.object_fit.map(|f| f.as_str().into()));
        }
        ElementKind::Background(b) => {
            set(&mut obj, "backgroundSize", b.background_size.clone().map(Value::String));
            set(&mut obj, "backgroundPosition", b.background_position.clone().map(Value::String));
            set(&mut obj, "backgroundColor", b.background_color.clone().map(Value::String));
        }
        ElementKind::Container | ElementKind::Unknown(_) => {}
    }

    Value::Object(obj)
}

fn emit_text_props(obj: &mut Map<String, Value>, t: &TextProps) {
    set(obj, "fontSize", t.font_size.map(number));
    set(obj, "fontFamily", t.font_family.clone().map(Value::String));
    let weight = t.font_weight.as_ref().map(|w| match w.parse::<f64>() {
        Ok(n) => number(n),
        Err(_) => Value::String(w.clone()),
    });
    set(obj, "fontWeight", weight);
    set(obj, "color", t.color.clone().map(Value::String));
    set(obj, "align", t.align.map(|a| a.as_str().into()));
    set(obj, "letterSpacing", t.letter_spacing.map(number));
    set(obj, "lineHeight", t.line_height.map(number));
    // Unrecognized transforms parse to `None`; leave their raw value alone.
    if let Some(transform) = t.text_transform {
        set(obj, "textTransform", Some(transform.as_str().into()));
    }
    if t.center_align || obj.contains_key("centerAlign") {
        set(obj, "centerAlign", Some(Value::Bool(t.center_align)));
    }
}

/// Insert or remove a field. Existing keys keep their position.
fn set(obj: &mut Map<String, Value>, name: &str, value: Option<Value>) {
    match value {
        Some(v) => {
            if let Some(slot) = obj.get_mut(name) {
                *slot = v;
            } else {
                obj.insert(name.to_string(), v);
            }
        }
        None => {
            obj.shift_remove(name);
        }
    }
}

/// A JSON number, integral values without a fractional part (`24`, not `24.0`).
pub fn number(v: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if v.fract() == 0.0 && v.abs() < MAX_EXACT {
        Value::from(v as i64)
    } else {
        Number::from_f64(v).map_or(Value::Null, Value::Number)
    }
}

// ─── Data document ───────────────────────────────────────────────────────

/// Emit a data document as pretty-printed JSON.
#[must_use]
pub fn emit_data(data: &DataDocument) -> String {
    pretty(&Value::Object(data.as_map().clone()))
}

fn pretty(value: &Value) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_default();
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ElementKey;
    use crate::parser::{parse_data, parse_layout};
    use pretty_assertions::assert_eq;

    #[test]
    fn emit_preserves_key_order_and_unknown_fields() {
        let input = r#"{
  "groom": {
    "type": "text",
    "x": 24,
    "y": 395,
    "width": 111,
    "fontSize": 18,
    "figmaId": "12:34"
  },
  "baseSize": {
    "width": 335,
    "height": 515
  },
  "bogus": 7
}
"#;
        let doc = parse_layout(input).unwrap();
        assert_eq!(emit_layout(&doc), input);
    }

    #[test]
    fn edited_position_is_written_in_place() {
        let mut doc = parse_layout(
            r##"{ "baseSize": { "width": 335, "height": 515 },
                 "groom": { "type": "text", "x": 24, "y": 395, "color": "#333" } }"##,
        )
        .unwrap();
        let groom = doc.get_mut(ElementKey::intern("groom")).unwrap();
        groom.x = 74.0;
        groom.y = 12.5;

        let value: Value = serde_json::from_str(&emit_layout(&doc)).unwrap();
        let keys: Vec<&String> = value["groom"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["type", "x", "y", "color"]);
        assert_eq!(value["groom"]["x"], Value::from(74));
        assert_eq!(value["groom"]["y"], Value::from(12.5));
    }

    #[test]
    fn cleared_fields_are_removed() {
        let mut doc = parse_layout(
            r#"{ "baseSize": { "width": 100, "height": 100 },
                 "photo": { "type": "image", "x": 0, "y": 0, "width": 50, "height": 40, "zIndex": 2 } }"#,
        )
        .unwrap();
        let photo = doc.get_mut(ElementKey::intern("photo")).unwrap();
        photo.height = None;
        photo.z_index = None;
        let value: Value = serde_json::from_str(&emit_layout(&doc)).unwrap();
        assert!(value["photo"].get("height").is_none());
        assert!(value["photo"].get("zIndex").is_none());
    }

    #[test]
    fn number_drops_integral_fraction() {
        assert_eq!(number(24.0).to_string(), "24");
        assert_eq!(number(7.25).to_string(), "7.25");
        assert_eq!(number(-3.0).to_string(), "-3");
    }

    #[test]
    fn emit_data_round_trips() {
        let input = "{\n  \"wedding\": {\n    \"groom\": \"민수\",\n    \"bride\": \"지연\"\n  }\n}\n";
        let data = parse_data(input).unwrap();
        assert_eq!(emit_data(&data), input);
    }
}
