//! Center-line detection for imported text.
//!
//! Imported coordinates carry a left edge. Text that visibly sits on the
//! canvas center line is rewritten to anchor on its center instead, so names
//! of any length stay centered once rendered.

use crate::model::{Canvas, LayoutElement};

/// `|x + width/2 − W/2| < tolerance`.
pub fn is_center_aligned(x: f64, width: f64, canvas: &Canvas, tolerance: f64) -> bool {
    (x + width / 2.0 - canvas.center_x()).abs() < tolerance
}

/// Re-anchor a centered text element on the canvas center line.
///
/// Returns whether the element changed. Non-text elements, elements without
/// a pixel width, and elements already flagged are left alone.
pub fn normalize_center_align(el: &mut LayoutElement, canvas: &Canvas, tolerance: f64) -> bool {
    let Some(width) = el.width.px() else {
        return false;
    };
    let x = el.x;
    let Some(text) = el.text_mut() else {
        return false;
    };
    if text.center_align || !is_center_aligned(x, width, canvas, tolerance) {
        return false;
    }
    text.center_align = true;
    el.x = canvas.center_x();
    true
}
