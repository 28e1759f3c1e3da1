//! Editor overlay: the transient marks drawn above the card while editing.

use card_core::id::ElementKey;
use card_core::model::{Bounds, Guideline};
use serde::Serialize;

/// Position readout shown near the dragged element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Readout {
    pub x: f64,
    pub y: f64,
}

impl Readout {
    /// `x: 74, y: 395`
    pub fn label(&self) -> String {
        format!("x: {}, y: {}", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionBox {
    pub key: ElementKey,
    pub bounds: Bounds,
}

/// Everything the host draws on top of the rendered card, in canvas px.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOverlay {
    pub selection: Option<SelectionBox>,
    pub guidelines: Vec<Guideline>,
    pub container_outlines: Vec<Bounds>,
    pub readout: Option<Readout>,
    pub dragging: bool,
}

impl EditorOverlay {
    pub fn is_empty(&self) -> bool {
        self.selection.is_none() && self.guidelines.is_empty() && self.container_outlines.is_empty() && self.readout.is_none()
    }
}
