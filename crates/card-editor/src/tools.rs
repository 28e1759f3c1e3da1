//! Select tool: click to select, press-and-drag on the selection to move.
//!
//! The tool turns pointer events into `LayoutMutation::MoveElement`s.
//!
//! ## Drag phases
//!
//! | Phase | Pointer down | Pointer move | Pointer up |
//! |-------|--------------|--------------|------------|
//! | **Idle** | on selection → Pending; elsewhere → select hit | - | - |
//! | **Pending** | - | past threshold → Dragging | → Idle |
//! | **Dragging** | - | clamp, snap, emit move | → Idle, readout lingers |
//!
//! Pressing on an element that is not yet selected only selects it, so a
//! click never nudges anything.

use crate::input::InputEvent;
use crate::snap::{SnapTargets, guidelines_for, snap_position};
use crate::sync::LayoutMutation;
use card_core::config::EngineConfig;
use card_core::coords::round2;
use card_core::id::ElementKey;
use card_core::model::{Bounds, Guideline, LayoutDocument};
use card_render::overlay::Readout;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Read-only view of the session a tool works against.
pub struct ToolContext<'a> {
    pub doc: &'a LayoutDocument,
    pub bounds: &'a HashMap<ElementKey, Bounds>,
    pub config: &'a EngineConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum DragPhase {
    #[default]
    Idle,
    /// Pressed on the selection; not yet past the drag threshold.
    Pending {
        start_x: f64,
        start_y: f64,
        offset_x: f64,
        offset_y: f64,
    },
    /// `offset` is pointer minus box origin at press time.
    Dragging { offset_x: f64, offset_y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ReadoutState {
    readout: Readout,
    /// `None` while the drag is live.
    expires_at: Option<u64>,
}

#[derive(Debug, Default)]
pub struct SelectTool {
    pub selected: Option<ElementKey>,
    phase: DragPhase,
    guides: SmallVec<[Guideline; 4]>,
    readout: Option<ReadoutState>,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a pointer event. `hit` is the topmost element under the
    /// pointer, if any.
    pub fn handle(&mut self, event: &InputEvent, hit: Option<ElementKey>, ctx: &ToolContext<'_>) -> Vec<LayoutMutation> {
        match *event {
            InputEvent::PointerDown { x, y, .. } => {
                self.pointer_down(x, y, hit, ctx);
                vec![]
            }
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(x, y, ctx),
            InputEvent::PointerUp { time_ms, .. } => {
                self.pointer_up(time_ms, ctx.config);
                vec![]
            }
            InputEvent::Key { .. } => vec![],
        }
    }

    fn pointer_down(&mut self, x: f64, y: f64, hit: Option<ElementKey>, ctx: &ToolContext<'_>) {
        self.guides.clear();
        match hit {
            Some(key) if self.selected == Some(key) => {
                if let Some(b) = ctx.bounds.get(&key) {
                    self.phase = DragPhase::Pending {
                        start_x: x,
                        start_y: y,
                        offset_x: x - b.x,
                        offset_y: y - b.y,
                    };
                }
            }
            _ => {
                if self.selected != hit {
                    log::debug!("select {:?}", hit);
                }
                self.selected = hit;
                self.phase = DragPhase::Idle;
            }
        }
    }

    fn pointer_move(&mut self, x: f64, y: f64, ctx: &ToolContext<'_>) -> Vec<LayoutMutation> {
        let (offset_x, offset_y) = match self.phase {
            DragPhase::Idle => return vec![],
            DragPhase::Pending {
                start_x,
                start_y,
                offset_x,
                offset_y,
            } => {
                let threshold = ctx.config.drag_threshold;
                if (x - start_x).abs() <= threshold && (y - start_y).abs() <= threshold {
                    return vec![];
                }
                self.phase = DragPhase::Dragging { offset_x, offset_y };
                (offset_x, offset_y)
            }
            DragPhase::Dragging { offset_x, offset_y } => (offset_x, offset_y),
        };
        let Some(key) = self.selected else {
            self.phase = DragPhase::Idle;
            return vec![];
        };
        self.drag_to(key, x - offset_x, y - offset_y, ctx).into_iter().collect()
    }

    /// Move the selected box so its origin lands near `(left, top)`.
    fn drag_to(&mut self, key: ElementKey, left: f64, top: f64, ctx: &ToolContext<'_>) -> Option<LayoutMutation> {
        let (Some(el), Some(current)) = (ctx.doc.get(key), ctx.bounds.get(&key)) else {
            self.phase = DragPhase::Idle;
            return None;
        };
        let canvas = &ctx.doc.canvas;
        // Auto-width centered text is pinned to the canvas center horizontally.
        let locked_x = el.is_auto_centered() && !el.is_center_anchored();
        let left = if locked_x { current.x } else { left };

        let candidate = Bounds {
            x: clamp_axis(left, current.width, canvas.width),
            y: clamp_axis(top, current.height, canvas.height),
            ..*current
        };

        let mut excluded: Vec<ElementKey> = ctx
            .doc
            .elements()
            .filter(|(_, el)| el.is_background())
            .map(|(k, _)| k)
            .collect();
        excluded.push(key);
        let targets = SnapTargets::collect(canvas, ctx.bounds, &excluded);

        let snapped = snap_position(candidate, &targets, ctx.config.snap_threshold);
        let final_box = Bounds {
            x: if locked_x {
                current.x
            } else {
                clamp_axis(snapped.x, current.width, canvas.width)
            },
            y: clamp_axis(snapped.y, current.height, canvas.height),
            ..*current
        };
        self.guides = guidelines_for(final_box, &targets);

        // Snapped edges are stored exactly so the guide stays true.
        let exact_x = snapped.x != candidate.x && final_box.x == snapped.x;
        let exact_y = snapped.y != candidate.y && final_box.y == snapped.y;
        let settle = |v: f64, exact: bool| if exact { v } else { round2(v) };
        let new_x = if el.is_center_anchored() {
            settle(final_box.x + final_box.width / 2.0, exact_x)
        } else if locked_x {
            el.x
        } else {
            settle(final_box.x, exact_x)
        };
        let new_y = settle(final_box.y, exact_y);
        self.readout = Some(ReadoutState {
            readout: Readout { x: new_x, y: new_y },
            expires_at: None,
        });

        if new_x == el.x && new_y == el.y {
            return None;
        }
        log::trace!("drag {key} → ({new_x}, {new_y})");
        Some(LayoutMutation::MoveElement { key, x: new_x, y: new_y })
    }

    fn pointer_up(&mut self, time_ms: u64, config: &EngineConfig) {
        if matches!(self.phase, DragPhase::Dragging { .. })
            && let Some(state) = &mut self.readout
        {
            state.expires_at = Some(time_ms.saturating_add(config.readout_linger_ms));
        }
        self.phase = DragPhase::Idle;
        self.guides.clear();
    }

    /// Expire a lingering readout. Returns whether anything changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if let Some(ReadoutState {
            expires_at: Some(at), ..
        }) = self.readout
            && now_ms >= at
        {
            self.readout = None;
            return true;
        }
        false
    }

    /// Select from outside the canvas (element list).
    pub fn select(&mut self, key: Option<ElementKey>) {
        self.selected = key;
        self.phase = DragPhase::Idle;
        self.guides.clear();
    }

    /// Drop the selection if it no longer exists in `doc`.
    pub fn retain_valid(&mut self, doc: &LayoutDocument) {
        if let Some(key) = self.selected
            && !doc.contains(key)
        {
            self.select(None);
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// Pressed on the selection, dragging or about to.
    pub fn is_pointer_active(&self) -> bool {
        !matches!(self.phase, DragPhase::Idle)
    }

    pub fn guides(&self) -> &[Guideline] {
        &self.guides
    }

    pub fn readout(&self) -> Option<Readout> {
        self.readout.map(|s| s.readout)
    }
}

/// Keep `[v, v + size]` inside `[0, extent]`; oversized boxes pin to 0.
fn clamp_axis(v: f64, size: f64, extent: f64) -> f64 {
    v.min(extent - size).max(0.0)
}
