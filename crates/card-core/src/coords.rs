//! Coordinate mapping between canvas pixels, CSS percentages and screen pixels.
//!
//! Layouts are authored in fixed canvas pixels and rendered as percentages
//! of the container, so any container size preserves the design. Canvas
//! dimensions are validated by `Canvas::new`; these functions assume `base > 0`.

use crate::model::Canvas;
use serde::{Serialize, Serializer};
use std::fmt;

/// A percentage of a canvas dimension (`7.164` means `7.164%`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percent(pub f64);

impl Percent {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Percent {
    /// CSS form, trimmed to 3 decimals: `7.164%`, `50%`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = (self.0 * 1000.0).round() / 1000.0;
        // Avoid printing `-0%`.
        let rounded = if rounded == 0.0 { 0.0 } else { rounded };
        let s = format!("{rounded:.3}");
        let s = s.trim_end_matches('0').trim_end_matches('.');
        write!(f, "{s}%")
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `(px / base) * 100`.
pub fn to_percent(px: f64, base: f64) -> Percent {
    Percent(px / base * 100.0)
}

/// Inverse of `to_percent`.
pub fn percent_to_px(percent: Percent, base: f64) -> f64 {
    percent.0 / 100.0 * base
}

/// Round to 2 decimal places, the precision positions are committed at.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Where the rendered card sits on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMapping {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width_px: f64,
    pub height_px: f64,
}

impl ScreenMapping {
    /// A card rendered at its design size with its origin at `(0, 0)`.
    pub fn identity(canvas: &Canvas) -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            width_px: canvas.width,
            height_px: canvas.height,
        }
    }

    /// Screen px → canvas px: `(screen - origin) / (container / base)`.
    pub fn to_canvas(&self, sx: f64, sy: f64, canvas: &Canvas) -> (f64, f64) {
        let scale_x = self.width_px / canvas.width;
        let scale_y = self.height_px / canvas.height;
        ((sx - self.origin_x) / scale_x, (sy - self.origin_y) / scale_y)
    }

    /// Canvas px → screen px.
    pub fn to_screen(&self, cx: f64, cy: f64, canvas: &Canvas) -> (f64, f64) {
        let scale_x = self.width_px / canvas.width;
        let scale_y = self.height_px / canvas.height;
        (cx * scale_x + self.origin_x, cy * scale_y + self.origin_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_display_matches_css() {
        assert_eq!(to_percent(24.0, 335.0).to_string(), "7.164%");
        assert_eq!(to_percent(395.0, 515.0).to_string(), "76.699%");
        assert_eq!(to_percent(167.5, 335.0).to_string(), "50%");
        assert_eq!(to_percent(0.0, 335.0).to_string(), "0%");
    }

    #[test]
    fn percent_round_trip() {
        for (px, base) in [(24.0, 335.0), (395.0, 515.0), (0.0, 1.0), (1234.5, 777.0)] {
            let back = percent_to_px(to_percent(px, base), base);
            assert!((back - px).abs() < 1e-9, "{px} of {base} came back as {back}");
        }
    }

    #[test]
    fn screen_mapping_scales_and_offsets() {
        let canvas = Canvas::new(335.0, 515.0).unwrap();
        let mapping = ScreenMapping {
            origin_x: 100.0,
            origin_y: 50.0,
            width_px: 670.0,
            height_px: 1030.0,
        };
        assert_eq!(mapping.to_canvas(148.0, 840.0, &canvas), (24.0, 395.0));
        assert_eq!(mapping.to_screen(24.0, 395.0, &canvas), (148.0, 840.0));
        assert_eq!(ScreenMapping::identity(&canvas).to_canvas(5.0, 6.0, &canvas), (5.0, 6.0));
    }

    #[test]
    fn round2_commits_two_decimals() {
        assert_eq!(round2(74.0), 74.0);
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(-0.004), 0.0);
    }
}
