//! HTML output for a composed card.
//!
//! The container keeps the canvas aspect ratio and every node is absolutely
//! positioned in percentages, so the markup scales to any width.

use crate::compose::VisualTree;
use crate::element::{Placement, TextStyle, VisualContent, VisualNode};
use card_core::model::TextAlign;
use std::fmt::Write;

/// Render a visual tree as a self-contained HTML fragment.
#[must_use]
pub fn render_html(tree: &VisualTree) -> String {
    let mut out = String::with_capacity(256 + tree.nodes.len() * 160);

    let mut style = format!(
        "position:relative;width:100%;aspect-ratio:{} / {};overflow:hidden",
        tree.canvas.width, tree.canvas.height
    );
    if let Some(color) = tree.background_color.as_deref().and_then(|c| css_value("backgroundColor", c)) {
        let _ = write!(style, ";background-color:{color}");
    }
    let _ = writeln!(out, "<div class=\"card-layout\" style=\"{}\">", escape(&style));

    for node in &tree.nodes {
        emit_node(&mut out, node);
    }

    out.push_str("</div>\n");
    out
}

fn emit_node(out: &mut String, node: &VisualNode) {
    let mut style = placement_css(&node.placement);
    let _ = write!(style, ";z-index:{}", node.z_index);
    let key = escape(node.key.as_str());

    match &node.content {
        VisualContent::Text { content, style: text } => {
            text_css(&mut style, text);
            let _ = writeln!(
                out,
                "  <div data-key=\"{key}\" style=\"{}\">{}</div>",
                escape(&style),
                escape(content)
            );
        }
        VisualContent::Image { src: Some(src), object_fit } => {
            style.push_str(";overflow:hidden");
            let _ = writeln!(
                out,
                "  <div data-key=\"{key}\" style=\"{}\"><img src=\"{}\" alt=\"\" style=\"width:100%;height:100%;object-fit:{}\"></div>",
                escape(&style),
                escape(src),
                object_fit.as_str()
            );
        }
        VisualContent::Image { src: None, .. } => {
            let _ = writeln!(
                out,
                "  <div data-key=\"{key}\" class=\"card-placeholder\" style=\"{}\"></div>",
                escape(&style)
            );
        }
        VisualContent::Vector { src, object_fit } => {
            let _ = writeln!(
                out,
                "  <div data-key=\"{key}\" style=\"{}\"><img src=\"{}\" alt=\"\" style=\"width:100%;height:100%;object-fit:{}\"></div>",
                escape(&style),
                escape(src),
                object_fit.as_str()
            );
        }
        VisualContent::Background { src, size, position } => {
            let _ = write!(style, ";background-image:url('{}')", css_url(src));
            if let Some(size) = css_value("backgroundSize", size) {
                let _ = write!(style, ";background-size:{size}");
            }
            if let Some(position) = css_value("backgroundPosition", position) {
                let _ = write!(style, ";background-position:{position}");
            }
            style.push_str(";background-repeat:no-repeat");
            let _ = writeln!(out, "  <div data-key=\"{key}\" style=\"{}\"></div>", escape(&style));
        }
        VisualContent::Outline => {
            style.push_str(";border:1px dashed rgba(0,0,0,0.35);box-sizing:border-box;pointer-events:none");
            let _ = writeln!(
                out,
                "  <div data-key=\"{key}\" class=\"card-container\" style=\"{}\"></div>",
                escape(&style)
            );
        }
    }
}

fn placement_css(p: &Placement) -> String {
    if p.fill_parent {
        return "position:absolute;inset:0".to_string();
    }
    let mut css = String::from("position:absolute");
    if let Some(left) = p.left {
        let _ = write!(css, ";left:{left}");
    }
    if let Some(top) = p.top {
        let _ = write!(css, ";top:{top}");
    }
    if let Some(width) = p.width {
        let _ = write!(css, ";width:{width}");
    }
    if let Some(height) = p.height {
        let _ = write!(css, ";height:{height}");
    }
    if p.center_on_left {
        css.push_str(";transform:translateX(-50%)");
    }
    css
}

fn text_css(css: &mut String, t: &TextStyle) {
    let _ = write!(css, ";font-size:{}px", t.font_size);
    if let Some(family) = &t.font_family {
        let _ = write!(css, ";font-family:'{}'", family.replace('\'', ""));
    }
    if let Some(weight) = t.font_weight.as_deref().and_then(|w| css_value("fontWeight", w)) {
        let _ = write!(css, ";font-weight:{weight}");
    }
    if let Some(color) = t.color.as_deref().and_then(|c| css_value("color", c)) {
        let _ = write!(css, ";color:{color}");
    }
    if t.align != TextAlign::Left {
        let _ = write!(css, ";text-align:{}", t.align.as_str());
    }
    if let Some(spacing) = t.letter_spacing {
        let _ = write!(css, ";letter-spacing:{spacing}px");
    }
    match t.line_height {
        Some(lh) => {
            let _ = write!(css, ";line-height:{lh}");
        }
        None => css.push_str(";line-height:normal"),
    }
    if t.text_transform.as_str() != "none" {
        let _ = write!(css, ";text-transform:{}", t.text_transform.as_str());
    }
    css.push_str(if t.preserve_line_breaks {
        ";white-space:pre-line"
    } else {
        ";white-space:nowrap"
    });
}

/// Escape for HTML text and double-quoted attributes.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A layout value usable as one CSS declaration value, or `None` if it
/// could end the declaration or the attribute.
fn css_value<'a>(name: &str, value: &'a str) -> Option<&'a str> {
    let value = value.trim();
    let safe = !value.is_empty()
        && !value
            .chars()
            .any(|c| matches!(c, ';' | ':' | '{' | '}' | '"' | '\'' | '\\' | '<' | '>') || c.is_control());
    if !safe {
        log::warn!("dropping unsafe {name} value {value:?}");
        return None;
    }
    Some(value)
}

/// Escape for a single-quoted CSS `url('…')`.
fn css_url(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
