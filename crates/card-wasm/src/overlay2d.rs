//! Canvas2D overlay renderer.
//!
//! The card itself is HTML; this draws the editor marks on a transparent
//! `<canvas>` stacked over it. Everything is drawn in card px under one
//! transform, so line widths are divided by the scale to stay hairline.

use card_core::coords::ScreenMapping;
use card_core::layout::{EstimateMeasure, TextMeasure};
use card_core::model::{Axis, Canvas};
use card_render::overlay::EditorOverlay;
use web_sys::CanvasRenderingContext2d;

pub struct OverlayTheme {
    pub selection: &'static str,
    pub guide: &'static str,
    pub outline: &'static str,
    pub readout_bg: &'static str,
    pub readout_text: &'static str,
}

impl Default for OverlayTheme {
    fn default() -> Self {
        Self {
            selection: "#2F80ED",
            guide: "#FF2D87",
            outline: "rgba(0, 0, 0, 0.35)",
            readout_bg: "rgba(17, 17, 17, 0.8)",
            readout_text: "#FFFFFF",
        }
    }
}

/// Clear the overlay canvas and draw the current marks.
pub fn draw_overlay(
    ctx: &CanvasRenderingContext2d,
    overlay: &EditorOverlay,
    canvas: &Canvas,
    mapping: &ScreenMapping,
    theme: &OverlayTheme,
) {
    let scale_x = mapping.width_px / canvas.width;
    let scale_y = mapping.height_px / canvas.height;
    let hairline = 1.0 / scale_x.max(scale_y);

    ctx.save();
    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ctx.clear_rect(0.0, 0.0, mapping.origin_x + mapping.width_px, mapping.origin_y + mapping.height_px);
    let _ = ctx.set_transform(scale_x, 0.0, 0.0, scale_y, mapping.origin_x, mapping.origin_y);

    // Container outlines
    if !overlay.container_outlines.is_empty() {
        set_dash(ctx, &[4.0 * hairline, 3.0 * hairline]);
        ctx.set_stroke_style_str(theme.outline);
        ctx.set_line_width(hairline);
        for b in &overlay.container_outlines {
            ctx.stroke_rect(b.x, b.y, b.width, b.height);
        }
        set_dash(ctx, &[]);
    }

    // Guidelines span the whole card
    ctx.set_stroke_style_str(theme.guide);
    ctx.set_line_width(hairline);
    for guide in &overlay.guidelines {
        ctx.begin_path();
        match guide.axis {
            Axis::Vertical => {
                ctx.move_to(guide.position, 0.0);
                ctx.line_to(guide.position, canvas.height);
            }
            Axis::Horizontal => {
                ctx.move_to(0.0, guide.position);
                ctx.line_to(canvas.width, guide.position);
            }
        }
        ctx.stroke();
    }

    if let Some(selection) = &overlay.selection {
        let b = selection.bounds;
        ctx.set_stroke_style_str(theme.selection);
        ctx.set_line_width(if overlay.dragging { 2.0 * hairline } else { 1.5 * hairline });
        ctx.stroke_rect(b.x, b.y, b.width, b.height);

        if let Some(readout) = &overlay.readout {
            draw_readout(ctx, &readout.label(), b.x, b.y, hairline, theme);
        }
    }

    ctx.restore();
}

/// Small pill with the committed coordinates, just above the selection.
fn draw_readout(ctx: &CanvasRenderingContext2d, label: &str, x: f64, y: f64, hairline: f64, theme: &OverlayTheme) {
    let size = 11.0 * hairline;
    let pad = 4.0 * hairline;
    ctx.set_font(&format!("500 {size}px Inter, sans-serif"));
    let width = ctx
        .measure_text(label)
        .map(|m| m.width())
        .unwrap_or_else(|_| EstimateMeasure.text_width(label, size, None));
    let height = size + pad * 2.0;
    let top = (y - height - pad).max(0.0);

    ctx.set_fill_style_str(theme.readout_bg);
    ctx.fill_rect(x, top, width + pad * 2.0, height);
    ctx.set_fill_style_str(theme.readout_text);
    ctx.set_text_baseline("top");
    let _ = ctx.fill_text(label, x + pad, top + pad);
}

fn set_dash(ctx: &CanvasRenderingContext2d, segments: &[f64]) {
    let array = js_sys::Array::new();
    for s in segments {
        array.push(&(*s).into());
    }
    let _ = ctx.set_line_dash(&array);
}
