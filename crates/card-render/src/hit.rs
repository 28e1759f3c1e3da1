//! Hit testing: point → element lookup.
//!
//! Walks elements front-to-back and returns the first whose box contains
//! the point. The background covers the whole card, so it never takes
//! pointer hits; clicking empty card space means "nothing".

use card_core::id::ElementKey;
use card_core::model::{Bounds, ElementKind, LayoutDocument};
use std::collections::HashMap;

/// Find the topmost element at canvas position (px, py).
pub fn hit_test(doc: &LayoutDocument, bounds: &HashMap<ElementKey, Bounds>, px: f64, py: f64) -> Option<ElementKey> {
    doc.paint_order()
        .into_iter()
        .rev()
        .filter(|(_, el)| !el.is_background() && !matches!(el.kind, ElementKind::Unknown(_)))
        .find_map(|(key, _)| bounds.get(&key).filter(|b| b.contains(px, py)).map(|_| key))
}
