//! Snap-to-guide for dragged elements.
//!
//! Each axis is handled on its own. Horizontally the candidate box can
//! snap its center to the canvas center line, or its left/right edge to the
//! matching edge of any other element; vertically the same with top/bottom.
//! The closest target under the threshold wins and the coordinate lands on
//! it exactly.

use card_core::id::ElementKey;
use card_core::model::{Axis, Bounds, Canvas, Guideline};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Two edges closer than this count as aligned for guideline purposes.
const ALIGNED_EPSILON: f64 = 1e-6;

/// Snapped left/top edge of the box plus the guidelines it now touches.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub x: f64,
    pub y: f64,
    pub guides: SmallVec<[Guideline; 4]>,
}

/// Boxes that the dragged element may snap against.
pub struct SnapTargets<'a> {
    pub canvas: &'a Canvas,
    /// Sibling boxes, already excluding the background and the dragged element.
    pub siblings: Vec<&'a Bounds>,
}

impl<'a> SnapTargets<'a> {
    /// Collect targets from resolved bounds. `excluded` keys (the dragged
    /// element, the background) are left out.
    pub fn collect(canvas: &'a Canvas, bounds: &'a HashMap<ElementKey, Bounds>, excluded: &[ElementKey]) -> Self {
        let mut keyed: Vec<(&ElementKey, &Bounds)> = bounds.iter().filter(|(k, _)| !excluded.contains(k)).collect();
        // HashMap order is arbitrary; ties must resolve the same way every frame.
        keyed.sort_by_key(|(k, _)| k.as_str());
        Self {
            canvas,
            siblings: keyed.into_iter().map(|(_, b)| b).collect(),
        }
    }
}

/// One snap option on one axis.
struct Candidate {
    distance: f64,
    /// New left (or top) edge of the box.
    edge: f64,
}

fn closest(candidates: impl Iterator<Item = Candidate>, threshold: f64) -> Option<f64> {
    candidates
        .filter(|c| c.distance < threshold)
        .fold(None::<Candidate>, |best, c| match best {
            Some(b) if b.distance <= c.distance => Some(b),
            _ => Some(c),
        })
        .map(|c| c.edge)
}

/// Snap a candidate box (left/top edge plus size) against the targets.
pub fn snap_position(candidate: Bounds, targets: &SnapTargets<'_>, threshold: f64) -> SnapResult {
    let Bounds { x, y, width: w, height: h } = candidate;
    let canvas = targets.canvas;

    let x_candidates = std::iter::once(Candidate {
        distance: (x + w / 2.0 - canvas.center_x()).abs(),
        edge: canvas.center_x() - w / 2.0,
    })
    .chain(targets.siblings.iter().flat_map(|s| {
        [
            Candidate {
                distance: (x - s.x).abs(),
                edge: s.x,
            },
            Candidate {
                distance: (x + w - s.right()).abs(),
                edge: s.right() - w,
            },
        ]
    }));
    let snapped_x = closest(x_candidates, threshold).unwrap_or(x);

    let y_candidates = std::iter::once(Candidate {
        distance: (y + h / 2.0 - canvas.center_y()).abs(),
        edge: canvas.center_y() - h / 2.0,
    })
    .chain(targets.siblings.iter().flat_map(|s| {
        [
            Candidate {
                distance: (y - s.y).abs(),
                edge: s.y,
            },
            Candidate {
                distance: (y + h - s.bottom()).abs(),
                edge: s.bottom() - h,
            },
        ]
    }));
    let snapped_y = closest(y_candidates, threshold).unwrap_or(y);

    SnapResult {
        x: snapped_x,
        y: snapped_y,
        guides: guidelines_for(
            Bounds {
                x: snapped_x,
                y: snapped_y,
                width: w,
                height: h,
            },
            targets,
        ),
    }
}

/// One guideline for every target line the box is exactly aligned with.
pub fn guidelines_for(b: Bounds, targets: &SnapTargets<'_>) -> SmallVec<[Guideline; 4]> {
    let mut guides: SmallVec<[Guideline; 4]> = SmallVec::new();
    let mut push = |axis: Axis, position: f64| {
        if !guides.iter().any(|g| g.axis == axis && (g.position - position).abs() < ALIGNED_EPSILON) {
            guides.push(Guideline { axis, position });
        }
    };
    let aligned = |a: f64, b: f64| (a - b).abs() < ALIGNED_EPSILON;
    let canvas = targets.canvas;

    if aligned(b.x + b.width / 2.0, canvas.center_x()) {
        push(Axis::Vertical, canvas.center_x());
    }
    if aligned(b.y + b.height / 2.0, canvas.center_y()) {
        push(Axis::Horizontal, canvas.center_y());
    }
    for s in &targets.siblings {
        if aligned(b.x, s.x) {
            push(Axis::Vertical, s.x);
        }
        if aligned(b.right(), s.right()) {
            push(Axis::Vertical, s.right());
        }
        if aligned(b.y, s.y) {
            push(Axis::Horizontal, s.y);
        }
        if aligned(b.bottom(), s.bottom()) {
            push(Axis::Horizontal, s.bottom());
        }
    }
    guides
}
