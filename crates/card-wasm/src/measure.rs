//! Text measurement through the browser's font stack.

use card_core::layout::{EstimateMeasure, TextMeasure};
use web_sys::CanvasRenderingContext2d;

const FALLBACK_FAMILY: &str = "sans-serif";

/// Measures auto-width text with `CanvasRenderingContext2d::measure_text`,
/// so editor boxes match what the HTML card lays out.
pub struct CanvasMeasure {
    ctx: CanvasRenderingContext2d,
}

impl CanvasMeasure {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl TextMeasure for CanvasMeasure {
    fn text_width(&self, text: &str, font_size: f64, font_family: Option<&str>) -> f64 {
        let family = font_family.unwrap_or(FALLBACK_FAMILY);
        self.ctx.set_font(&format!("{font_size}px {family}"));
        text.lines()
            .map(|line| match self.ctx.measure_text(line) {
                Ok(metrics) => metrics.width(),
                Err(_) => EstimateMeasure.text_width(line, font_size, font_family),
            })
            .fold(0.0, f64::max)
    }
}
