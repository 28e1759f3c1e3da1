//! Canvas-space bounds for every renderable element.
//!
//! The renderer places elements with percentages and lets the host size
//! auto-width text. The editor needs real boxes for hit testing, clamping and
//! snapping, so this module reproduces that placement in canvas pixels.

use crate::binding::{DataDocument, DefaultTable, resolve_text};
use crate::config::EngineConfig;
use crate::id::ElementKey;
use crate::model::*;
use std::collections::HashMap;

/// Line height multiplier used when an element sets none (`normal`).
pub const NORMAL_LINE_HEIGHT: f64 = 1.2;

/// Average glyph advance as a fraction of the font size.
const ESTIMATED_ADVANCE: f64 = 0.6;

/// Measures rendered text width. Hosts with real font metrics supply their own.
pub trait TextMeasure {
    fn text_width(&self, text: &str, font_size: f64, font_family: Option<&str>) -> f64;
}

/// Fallback measure: `chars × fontSize × 0.6` for the longest line.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimateMeasure;

impl TextMeasure for EstimateMeasure {
    fn text_width(&self, text: &str, font_size: f64, _font_family: Option<&str>) -> f64 {
        let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        longest as f64 * font_size * ESTIMATED_ADVANCE
    }
}

/// Resolve bounds for every well-formed, known element.
///
/// Unknown types are left out since they never render.
pub fn resolve_bounds(
    doc: &LayoutDocument,
    data: &DataDocument,
    config: &EngineConfig,
    measure: &dyn TextMeasure,
) -> HashMap<ElementKey, Bounds> {
    let defaults = config.default_table();
    doc.elements()
        .filter(|(_, el)| !matches!(el.kind, ElementKind::Unknown(_)))
        .map(|(key, el)| {
            let bounds = element_bounds(key, el, &doc.canvas, data, config, &defaults, measure);
            (key, bounds)
        })
        .collect()
}

/// Resolve the box of one element.
pub fn element_bounds(
    key: ElementKey,
    el: &LayoutElement,
    canvas: &Canvas,
    data: &DataDocument,
    config: &EngineConfig,
    defaults: &DefaultTable,
    measure: &dyn TextMeasure,
) -> Bounds {
    if el.is_background() {
        return canvas.bounds();
    }

    let (width, height) = match &el.kind {
        ElementKind::Text(text) => {
            let content = resolve_text(key.as_str(), data, defaults);
            let shown = text.text_transform.unwrap_or_default().apply(&content);
            let font_size = text.font_size.unwrap_or(config.default_font_size);
            let width = match el.width {
                Width::Px(w) => w,
                Width::Auto => measure.text_width(&shown, font_size, text.font_family.as_deref()),
            };
            let height = el.height.unwrap_or_else(|| {
                let lines = shown.lines().count().max(1) as f64;
                lines * font_size * text.line_height.unwrap_or(NORMAL_LINE_HEIGHT)
            });
            (width, height)
        }
        _ => (el.width.px().unwrap_or(0.0), el.height.unwrap_or(0.0)),
    };

    Bounds {
        x: anchored_left(el, width, canvas),
        y: el.y,
        width,
        height,
    }
}

/// Left edge in canvas px, undoing center anchoring.
pub fn anchored_left(el: &LayoutElement, width: f64, canvas: &Canvas) -> f64 {
    if el.is_center_anchored() {
        el.x - width / 2.0
    } else if el.is_auto_centered() {
        canvas.center_x() - width / 2.0
    } else {
        el.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_data, parse_layout};

    fn doc() -> LayoutDocument {
        parse_layout(
            r#"{
                "baseSize": { "width": 335, "height": 515 },
                "background": { "type": "background", "x": 10, "y": 10, "width": 5, "height": 5 },
                "groom": { "type": "text", "x": 24, "y": 395, "width": 111, "fontSize": 20 },
                "title": { "type": "text", "x": 0, "y": 40, "width": "auto", "align": "center", "fontSize": 10 },
                "names": { "type": "text", "x": 167.5, "y": 80, "width": 100, "centerAlign": true },
                "photo": { "type": "image", "x": 20, "y": 100, "width": 295, "height": 200 },
                "sparkle": { "type": "particles", "x": 0, "y": 0 }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn resolves_every_known_element() {
        let data = parse_data(r#"{ "wedding": { "title": "ABCDEFGHIJ" } }"#).unwrap();
        let bounds = resolve_bounds(&doc(), &data, &EngineConfig::default(), &EstimateMeasure);
        let get = |k: &str| bounds[&ElementKey::intern(k)];

        assert_eq!(get("background"), Bounds { x: 0.0, y: 0.0, width: 335.0, height: 515.0 });
        assert_eq!(get("groom"), Bounds { x: 24.0, y: 395.0, width: 111.0, height: 24.0 });
        assert_eq!(get("photo"), Bounds { x: 20.0, y: 100.0, width: 295.0, height: 200.0 });
        assert!(!bounds.contains_key(&ElementKey::intern("sparkle")));

        // 10 chars × 10px × 0.6 = 60 wide, centered on 167.5.
        let title = get("title");
        assert_eq!(title.width, 60.0);
        assert_eq!(title.x, 137.5);

        // centerAlign: x is the center.
        assert_eq!(get("names").x, 117.5);
    }

    #[test]
    fn multiline_text_grows_height() {
        let data = parse_data(r#"{ "wedding": { "groom": "line one\nline two" } }"#).unwrap();
        let bounds = resolve_bounds(&doc(), &data, &EngineConfig::default(), &EstimateMeasure);
        assert_eq!(bounds[&ElementKey::intern("groom")].height, 48.0);
    }

    struct Fixed(f64);
    impl TextMeasure for Fixed {
        fn text_width(&self, _: &str, _: f64, _: Option<&str>) -> f64 {
            self.0
        }
    }

    #[test]
    fn host_measure_is_used_for_auto_width() {
        let bounds = resolve_bounds(&doc(), &DataDocument::default(), &EngineConfig::default(), &Fixed(90.0));
        let title = bounds[&ElementKey::intern("title")];
        assert_eq!(title.width, 90.0);
        assert_eq!(title.x, 122.5);
    }
}
