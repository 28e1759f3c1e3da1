//! Editing session facade.
//!
//! `LayoutEditor` owns one layout for the length of an editing session and
//! routes pointer, keyboard and panel input through the select tool, the
//! command stack and the sync engine. The host hears about every committed
//! change through `EditorHost`; persistence stays with the host.

use crate::commands::CommandStack;
use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::sync::{ElementProp, LayoutMutation, SyncEngine};
use crate::tools::{SelectTool, ToolContext};
use card_core::binding::DataDocument;
use card_core::config::EngineConfig;
use card_core::coords::ScreenMapping;
use card_core::error::LayoutError;
use card_core::id::ElementKey;
use card_core::layout::TextMeasure;
use card_core::model::{Bounds, ElementKind, LayoutDocument};
use card_core::parser::parse_data;
use card_render::compose::{VisualTree, compose_layout};
use card_render::element::RenderMode;
use card_render::hit::hit_test;
use card_render::overlay::{EditorOverlay, SelectionBox};
use std::collections::HashMap;

/// Callbacks into the application hosting the editor.
///
/// Implemented differently by each host: the WASM bridge forwards to
/// JavaScript functions, tests record calls.
pub trait EditorHost {
    /// The layout changed (drag frame, property edit, delete, undo).
    fn on_change(&mut self, layout: &LayoutDocument);

    /// The author asked to persist the current state.
    fn on_save(&mut self, layout: &LayoutDocument, data: &DataDocument);

    /// The layout was restored to the state the session started with.
    fn on_reset(&mut self);
}

/// Host that ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl EditorHost for NullHost {
    fn on_change(&mut self, _layout: &LayoutDocument) {}
    fn on_save(&mut self, _layout: &LayoutDocument, _data: &DataDocument) {}
    fn on_reset(&mut self) {}
}

/// A pending deletion awaiting the author's confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRequest {
    pub key: ElementKey,
}

pub struct LayoutEditor<H: EditorHost> {
    engine: SyncEngine,
    commands: CommandStack,
    tool: SelectTool,
    host: H,
    /// Layout JSON the session started with, for `reset()`.
    initial_text: String,
    pending_delete: Option<DeleteRequest>,
}

impl<H: EditorHost> LayoutEditor<H> {
    /// Open an editing session on a parsed layout.
    pub fn edit(layout: LayoutDocument, data: DataDocument, config: EngineConfig, host: H) -> Self {
        let mut engine = SyncEngine::from_document(layout, data, config);
        let initial_text = engine.current_text().to_string();
        Self {
            engine,
            commands: CommandStack::default(),
            tool: SelectTool::new(),
            host,
            initial_text,
            pending_delete: None,
        }
    }

    /// Open a session from layout and data JSON text.
    pub fn from_json(layout: &str, data: &str, config: EngineConfig, host: H) -> Result<Self, LayoutError> {
        let data = parse_data(data)?;
        let mut engine = SyncEngine::from_text(layout, data, config)?;
        Ok(Self {
            initial_text: engine.current_text().to_string(),
            engine,
            commands: CommandStack::default(),
            tool: SelectTool::new(),
            host,
            pending_delete: None,
        })
    }

    /// Measure auto-width text with host font metrics from now on.
    pub fn set_measure(&mut self, measure: Box<dyn TextMeasure>) {
        self.engine.set_measure(measure);
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    pub fn pointer_down(&mut self, sx: f64, sy: f64, mapping: &ScreenMapping, modifiers: Modifiers) {
        let (x, y) = mapping.to_canvas(sx, sy, &self.engine.doc.canvas);
        self.handle_event(InputEvent::PointerDown { x, y, modifiers });
    }

    pub fn pointer_move(&mut self, sx: f64, sy: f64, mapping: &ScreenMapping, modifiers: Modifiers) {
        let (x, y) = mapping.to_canvas(sx, sy, &self.engine.doc.canvas);
        self.handle_event(InputEvent::PointerMove { x, y, modifiers });
    }

    /// Pointer released anywhere, inside the card or not.
    pub fn pointer_up(&mut self, sx: f64, sy: f64, mapping: &ScreenMapping, time_ms: u64) {
        let (x, y) = mapping.to_canvas(sx, sy, &self.engine.doc.canvas);
        self.handle_event(InputEvent::PointerUp { x, y, time_ms });
    }

    /// Dispatch an event already in canvas coordinates.
    pub fn handle_event(&mut self, event: InputEvent) {
        if let InputEvent::Key { key, modifiers } = &event {
            self.key(key, *modifiers);
            return;
        }

        let hit = match event {
            InputEvent::PointerDown { x, y, .. } => hit_test(&self.engine.doc, &self.engine.bounds, x, y),
            _ => None,
        };
        let was_dragging = self.tool.is_dragging();
        let mutations = {
            let ctx = ToolContext {
                doc: &self.engine.doc,
                bounds: &self.engine.bounds,
                config: &self.engine.config,
            };
            self.tool.handle(&event, hit, &ctx)
        };

        if !was_dragging && self.tool.is_dragging() {
            self.commands.begin_batch(&mut self.engine);
        }
        for mutation in mutations {
            if let Err(err) = self.commands.execute(&mut self.engine, mutation, "move") {
                log::warn!("drag update rejected: {err}");
            } else {
                self.host.on_change(&self.engine.doc);
            }
        }
        if was_dragging && !self.tool.is_dragging() {
            self.commands.end_batch(&mut self.engine, "move element");
        }
    }

    /// End any gesture in progress, keeping the selection. An open drag
    /// batch is committed as one undo step.
    fn finish_gesture(&mut self) {
        if self.commands.in_batch() {
            log::debug!("drag interrupted, committing batch");
            self.commands.end_batch(&mut self.engine, "move element");
        }
        self.tool.select(self.tool.selected);
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a key press. Returns the action taken, if any.
    pub fn key(&mut self, key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve_event(key, modifiers)?;
        if self.tool.is_pointer_active() && action != ShortcutAction::Save {
            log::debug!("{action:?} ignored during drag");
            return None;
        }
        match action {
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Delete => {
                self.request_delete()?;
            }
            ShortcutAction::Deselect => {
                self.finish_gesture();
                self.tool.select(None);
            }
            ShortcutAction::Save => self.save(),
        }
        Some(action)
    }

    // ─── Selection & panel edits ─────────────────────────────────────────

    pub fn selected(&self) -> Option<ElementKey> {
        self.tool.selected
    }

    /// Select from the element list. Unlike pointer hits this can pick the
    /// background.
    pub fn select(&mut self, key: Option<ElementKey>) -> Result<(), LayoutError> {
        if let Some(key) = key
            && !self.engine.doc.contains(key)
        {
            return Err(LayoutError::UnknownElement(key));
        }
        self.finish_gesture();
        self.tool.select(key);
        Ok(())
    }

    /// Set a property of the selected element from its panel text.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<(), LayoutError> {
        let key = self
            .tool
            .selected
            .ok_or_else(|| LayoutError::invalid_property(name, value))?;
        self.set_element_property(key, name, value)
    }

    /// Set a property on any element: immediate, no snapping.
    pub fn set_element_property(&mut self, key: ElementKey, name: &str, value: &str) -> Result<(), LayoutError> {
        let prop = ElementProp::parse(name, value)?;
        let description = format!("set {}", prop.name());
        self.commands
            .execute(&mut self.engine, LayoutMutation::SetProperty { key, prop }, &description)?;
        self.host.on_change(&self.engine.doc);
        Ok(())
    }

    // ─── Deletion ────────────────────────────────────────────────────────

    /// Ask to delete the selection. The host confirms or cancels.
    pub fn request_delete(&mut self) -> Option<DeleteRequest> {
        let key = self.tool.selected?;
        let request = DeleteRequest { key };
        self.pending_delete = Some(request);
        Some(request)
    }

    pub fn pending_delete(&self) -> Option<DeleteRequest> {
        self.pending_delete
    }

    /// Remove the requested key from the layout entirely.
    pub fn confirm_delete(&mut self, request: DeleteRequest) -> Result<(), LayoutError> {
        self.pending_delete = None;
        self.finish_gesture();
        self.commands.execute(
            &mut self.engine,
            LayoutMutation::RemoveElement { key: request.key },
            "delete element",
        )?;
        log::debug!("deleted {}", request.key);
        if self.tool.selected == Some(request.key) {
            self.tool.select(None);
        }
        self.host.on_change(&self.engine.doc);
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    // ─── History & session ───────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.finish_gesture();
        let undone = self.commands.undo(&mut self.engine).is_some();
        if undone {
            self.after_history_change();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        self.finish_gesture();
        let redone = self.commands.redo(&mut self.engine).is_some();
        if redone {
            self.after_history_change();
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    fn after_history_change(&mut self) {
        self.tool.retain_valid(&self.engine.doc);
        self.host.on_change(&self.engine.doc);
    }

    pub fn save(&mut self) {
        self.host.on_save(&self.engine.doc, &self.engine.data);
    }

    /// Restore the layout the session started with. Undoable.
    pub fn reset(&mut self) -> Result<(), LayoutError> {
        self.finish_gesture();
        let before = self.engine.current_text().to_string();
        self.engine.set_text(&self.initial_text)?;
        let after = self.engine.current_text().to_string();
        if before != after {
            self.commands.push_snapshot(before, after, "reset");
        }
        self.pending_delete = None;
        self.tool.select(None);
        self.host.on_reset();
        self.host.on_change(&self.engine.doc);
        Ok(())
    }

    /// Replace the layout from edited JSON text. Undoable.
    pub fn set_text(&mut self, text: &str) -> Result<(), LayoutError> {
        self.finish_gesture();
        let before = self.engine.current_text().to_string();
        self.engine.set_text(text)?;
        self.commands.push_snapshot(before, text.to_string(), "edit JSON");
        self.tool.retain_valid(&self.engine.doc);
        self.host.on_change(&self.engine.doc);
        Ok(())
    }

    pub fn set_data(&mut self, data: DataDocument) {
        self.engine.set_data(data);
    }

    /// Expire the lingering coordinate readout. Returns whether the overlay changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.tool.tick(now_ms)
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Marks drawn over the card: selection, guidelines, container outlines, readout.
    pub fn overlay(&self) -> EditorOverlay {
        let doc = &self.engine.doc;
        let bounds = &self.engine.bounds;
        let selection = self
            .tool
            .selected
            .and_then(|key| bounds.get(&key).map(|b| SelectionBox { key, bounds: *b }));
        let container_outlines = doc
            .elements()
            .filter(|(_, el)| matches!(el.kind, ElementKind::Container))
            .filter_map(|(key, _)| bounds.get(&key).copied())
            .collect();
        EditorOverlay {
            selection,
            guidelines: self.tool.guides().to_vec(),
            container_outlines,
            readout: self.tool.readout(),
            dragging: self.tool.is_dragging(),
        }
    }

    /// Compose the card in editor mode.
    pub fn render(&self) -> Result<VisualTree, LayoutError> {
        compose_layout(&self.engine.doc, &self.engine.data, &self.engine.config, RenderMode::Editor)
    }

    pub fn layout(&self) -> &LayoutDocument {
        &self.engine.doc
    }

    pub fn data(&self) -> &DataDocument {
        &self.engine.data
    }

    pub fn config(&self) -> &EngineConfig {
        &self.engine.config
    }

    pub fn bounds(&self) -> &HashMap<ElementKey, Bounds> {
        self.engine.current_bounds()
    }

    /// Current layout JSON.
    pub fn text(&mut self) -> &str {
        self.engine.current_text()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_core::parser::parse_layout;
    use pretty_assertions::assert_eq;

    const LAYOUT: &str = r#"{
  "baseSize": { "width": 335, "height": 515 },
  "background": { "type": "background", "x": 0, "y": 0, "width": 335, "height": 515, "zIndex": 0 },
  "groom": { "type": "text", "x": 24, "y": 395, "width": 111, "fontSize": 18, "zIndex": 2 },
  "frame": { "type": "container", "x": 12, "y": 20, "width": 100, "height": 40 }
}
"#;

    #[derive(Default)]
    struct Recorder {
        changes: usize,
        saves: usize,
        resets: usize,
    }

    impl EditorHost for Recorder {
        fn on_change(&mut self, _layout: &LayoutDocument) {
            self.changes += 1;
        }
        fn on_save(&mut self, _layout: &LayoutDocument, _data: &DataDocument) {
            self.saves += 1;
        }
        fn on_reset(&mut self) {
            self.resets += 1;
        }
    }

    fn editor() -> LayoutEditor<Recorder> {
        let doc = parse_layout(LAYOUT).unwrap();
        LayoutEditor::edit(doc, DataDocument::default(), EngineConfig::default(), Recorder::default())
    }

    fn groom() -> ElementKey {
        ElementKey::intern("groom")
    }

    fn cmd(key: &str) -> InputEvent {
        InputEvent::Key {
            key: key.to_string(),
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            },
        }
    }

    #[test]
    fn panel_edit_commits_immediately() {
        let mut ed = editor();
        ed.select(Some(groom())).unwrap();
        ed.set_property("x", "40").unwrap();
        assert_eq!(ed.layout().get(groom()).unwrap().x, 40.0);
        assert_eq!(ed.host().changes, 1);
        assert!(ed.undo());
        assert_eq!(ed.layout().get(groom()).unwrap().x, 24.0);
    }

    #[test]
    fn panel_edit_without_selection_fails() {
        let mut ed = editor();
        assert!(ed.set_property("x", "40").is_err());
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut ed = editor();
        ed.select(Some(groom())).unwrap();
        let request = ed.request_delete().unwrap();
        ed.cancel_delete();
        assert!(ed.layout().contains(groom()));

        let request2 = ed.request_delete().unwrap();
        assert_eq!(request, request2);
        ed.confirm_delete(request2).unwrap();
        assert!(!ed.layout().contains(groom()));
        assert_eq!(ed.selected(), None);
        assert!(!ed.text().contains("groom"));

        ed.undo();
        assert!(ed.layout().contains(groom()));
    }

    #[test]
    fn shortcuts_drive_history_and_save() {
        let mut ed = editor();
        ed.select(Some(groom())).unwrap();
        ed.set_property("y", "100").unwrap();
        ed.handle_event(cmd("z"));
        assert_eq!(ed.layout().get(groom()).unwrap().y, 395.0);
        ed.handle_event(cmd("y"));
        assert_eq!(ed.layout().get(groom()).unwrap().y, 100.0);
        ed.handle_event(cmd("s"));
        assert_eq!(ed.host().saves, 1);
    }

    #[test]
    fn escape_deselects_and_delete_key_requests() {
        let mut ed = editor();
        ed.select(Some(groom())).unwrap();
        assert_eq!(ed.key("Delete", Modifiers::NONE), Some(ShortcutAction::Delete));
        assert_eq!(ed.pending_delete(), Some(DeleteRequest { key: groom() }));
        ed.key("Escape", Modifiers::NONE);
        assert_eq!(ed.selected(), None);
    }

    #[test]
    fn reset_restores_initial_layout() {
        let mut ed = editor();
        let original = ed.text().to_string();
        ed.select(Some(groom())).unwrap();
        ed.set_property("width", "auto").unwrap();
        ed.reset().unwrap();
        assert_eq!(ed.text(), original);
        assert_eq!(ed.host().resets, 1);
        assert_eq!(ed.selected(), None);
        // Undo brings back the pre-reset edit.
        ed.undo();
        assert!(ed.layout().get(groom()).unwrap().width.is_auto());
    }

    #[test]
    fn background_selectable_from_list_only() {
        let mut ed = editor();
        let mapping = ScreenMapping::identity(&ed.layout().canvas);
        ed.pointer_down(300.0, 10.0, &mapping, Modifiers::NONE);
        assert_eq!(ed.selected(), None);
        ed.select(Some(ElementKey::background())).unwrap();
        assert_eq!(ed.overlay().selection.map(|s| s.bounds), Some(ed.layout().canvas.bounds()));
        assert!(ed.select(Some(ElementKey::intern("ghost"))).is_err());
    }

    #[test]
    fn overlay_outlines_containers() {
        let ed = editor();
        let overlay = ed.overlay();
        assert_eq!(overlay.container_outlines.len(), 1);
        assert_eq!(overlay.container_outlines[0].x, 12.0);
        assert!(overlay.selection.is_none());
    }
}
