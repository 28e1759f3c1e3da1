//! Visual tree and editor overlay → Vello drawing commands.
//!
//! Native preview only: boxes, fills and outlines in canvas space, mapped to
//! the screen by one transform. Text shaping and image decoding stay with the
//! browser; those nodes are traced, not drawn.

use crate::compose::VisualTree;
use crate::element::VisualContent;
use crate::overlay::EditorOverlay;
use card_core::color::Rgba;
use card_core::coords::ScreenMapping;
use card_core::id::ElementKey;
use card_core::model::{Axis, Bounds, Canvas};
use kurbo::{Affine, Line, Rect, Stroke};
use peniko::{Color, Fill};
use std::collections::HashMap;
use vello::Scene;

const PLACEHOLDER_FILL: Rgba = Rgba::new(0xe9, 0xe6, 0xe1, 255);
const PLACEHOLDER_STROKE: Rgba = Rgba::new(0xc4, 0xbe, 0xb5, 255);
const OUTLINE: Rgba = Rgba::new(0, 0, 0, 90);
const GUIDE: Rgba = Rgba::new(0xff, 0x2d, 0x87, 255);
const SELECTION: Rgba = Rgba::new(0x2f, 0x80, 0xed, 255);

/// Canvas px → screen px for a card drawn at `mapping`.
pub fn screen_transform(mapping: &ScreenMapping, canvas: &Canvas) -> Affine {
    Affine::translate((mapping.origin_x, mapping.origin_y))
        * Affine::scale_non_uniform(mapping.width_px / canvas.width, mapping.height_px / canvas.height)
}

/// Paint a composed card. `bounds` are the canvas-space boxes from
/// `resolve_bounds`; nodes without one are skipped.
pub fn paint_tree(scene: &mut Scene, tree: &VisualTree, bounds: &HashMap<ElementKey, Bounds>, transform: Affine) {
    let card = to_rect(&tree.canvas.bounds());
    let backdrop = tree
        .background_color
        .as_deref()
        .and_then(Rgba::parse)
        .unwrap_or(Rgba::WHITE);
    scene.fill(Fill::NonZero, transform, to_color(backdrop), None, &card);

    for node in &tree.nodes {
        let Some(b) = bounds.get(&node.key) else {
            continue;
        };
        let rect = to_rect(b);
        match &node.content {
            VisualContent::Text { content, style } => {
                log::trace!("TEXT #{} {:?} {}px at ({}, {})", node.key, content, style.font_size, b.x, b.y);
            }
            VisualContent::Image { src: None, .. } => {
                scene.fill(Fill::NonZero, transform, to_color(PLACEHOLDER_FILL), None, &rect);
                scene.stroke(&Stroke::new(1.0), transform, to_color(PLACEHOLDER_STROKE), None, &rect);
            }
            VisualContent::Image { src: Some(src), .. } | VisualContent::Vector { src, .. } => {
                log::trace!("IMAGE #{} {src} at ({}, {})", node.key, b.x, b.y);
            }
            VisualContent::Background { src, .. } => {
                log::trace!("BACKGROUND #{} {src}", node.key);
            }
            VisualContent::Outline => {
                let dashed = Stroke::new(1.0).with_dashes(0.0, [4.0, 3.0]);
                scene.stroke(&dashed, transform, to_color(OUTLINE), None, &rect);
            }
        }
    }
}

/// Paint guidelines, container outlines and the selection box.
pub fn paint_overlay(scene: &mut Scene, overlay: &EditorOverlay, canvas: &Canvas, transform: Affine) {
    let dashed = Stroke::new(1.0).with_dashes(0.0, [4.0, 3.0]);
    for outline in &overlay.container_outlines {
        scene.stroke(&dashed, transform, to_color(OUTLINE), None, &to_rect(outline));
    }

    for guide in &overlay.guidelines {
        let line = match guide.axis {
            Axis::Vertical => Line::new((guide.position, 0.0), (guide.position, canvas.height)),
            Axis::Horizontal => Line::new((0.0, guide.position), (canvas.width, guide.position)),
        };
        scene.stroke(&Stroke::new(1.0), transform, to_color(GUIDE), None, &line);
    }

    if let Some(selection) = &overlay.selection {
        let width = if overlay.dragging { 2.0 } else { 1.5 };
        scene.stroke(&Stroke::new(width), transform, to_color(SELECTION), None, &to_rect(&selection.bounds));
    }

    if let Some(readout) = &overlay.readout {
        log::trace!("READOUT {}", readout.label());
    }
}

fn to_rect(b: &Bounds) -> Rect {
    Rect::new(b.x, b.y, b.right(), b.bottom())
}

fn to_color(c: Rgba) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}
