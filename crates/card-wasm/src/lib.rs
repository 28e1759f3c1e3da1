//! WASM bridge for Card Layout: exposes rendering and the template editor
//! to the browser admin page.
//!
//! Compiled via `wasm-pack build --target web`.

mod measure;
mod overlay2d;

use card_core::binding::DataDocument;
use card_core::config::EngineConfig;
use card_core::coords::ScreenMapping;
use card_core::emitter::{emit_data, emit_layout};
use card_core::error::LayoutError;
use card_core::id::ElementKey;
use card_core::lint::{LintSeverity, lint_layout};
use card_core::model::LayoutDocument;
use card_core::parser::{parse_data, parse_layout};
use card_editor::editor::{EditorHost, LayoutEditor};
use card_editor::input::Modifiers;
use card_editor::shortcuts::ShortcutAction;
use card_render::compose::compose_layout;
use card_render::element::RenderMode;
use js_sys::Function;
use serde_json::json;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

// ─── Host callbacks ──────────────────────────────────────────────────────

/// Forwards editor callbacks to JavaScript functions. Each receives the
/// layout JSON text; `onSave` also gets the data JSON.
#[derive(Default)]
struct JsHost {
    on_change: Option<Function>,
    on_save: Option<Function>,
    on_reset: Option<Function>,
}

impl EditorHost for JsHost {
    fn on_change(&mut self, layout: &LayoutDocument) {
        if let Some(f) = &self.on_change {
            report(f.call1(&JsValue::NULL, &JsValue::from_str(&emit_layout(layout))));
        }
    }

    fn on_save(&mut self, layout: &LayoutDocument, data: &DataDocument) {
        if let Some(f) = &self.on_save {
            let data = emit_data(data);
            report(f.call2(
                &JsValue::NULL,
                &JsValue::from_str(&emit_layout(layout)),
                &JsValue::from_str(&data),
            ));
        }
    }

    fn on_reset(&mut self) {
        if let Some(f) = &self.on_reset {
            report(f.call0(&JsValue::NULL));
        }
    }
}

fn report(result: Result<JsValue, JsValue>) {
    if let Err(err) = result {
        web_sys::console::error_2(&"card editor callback failed:".into(), &err);
    }
}

fn to_js(err: LayoutError) -> JsValue {
    log::debug!("editor call failed: {err}");
    JsValue::from_str(&err.to_string())
}

// ─── Editor canvas ───────────────────────────────────────────────────────

/// The WASM-facing editing session.
///
/// Pointer coordinates are page pixels; `set_viewport` tells the editor
/// where the card sits on the page.
#[wasm_bindgen]
pub struct CardCanvas {
    editor: LayoutEditor<JsHost>,
    mapping: ScreenMapping,
}

#[wasm_bindgen]
impl CardCanvas {
    /// Open a session. `config_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(layout_json: &str, data_json: &str, config_json: &str) -> Result<CardCanvas, JsValue> {
        console_error_panic_hook_setup();

        let config = if config_json.trim().is_empty() {
            EngineConfig::default()
        } else {
            EngineConfig::from_json(config_json).map_err(to_js)?
        };
        let editor = LayoutEditor::from_json(layout_json, data_json, config, JsHost::default()).map_err(to_js)?;
        let mapping = ScreenMapping::identity(&editor.layout().canvas);
        Ok(Self { editor, mapping })
    }

    /// Register `onChange(layoutJson)`, `onSave(layoutJson, dataJson)` and `onReset()`.
    pub fn set_callbacks(&mut self, on_change: Option<Function>, on_save: Option<Function>, on_reset: Option<Function>) {
        *self.editor.host_mut() = JsHost {
            on_change,
            on_save,
            on_reset,
        };
    }

    /// Measure auto-width text with this context's fonts.
    pub fn use_canvas_metrics(&mut self, ctx: CanvasRenderingContext2d) {
        self.editor.set_measure(Box::new(measure::CanvasMeasure::new(ctx)));
    }

    /// Where the card is drawn on the page, in page px.
    pub fn set_viewport(&mut self, origin_x: f64, origin_y: f64, width_px: f64, height_px: f64) {
        self.mapping = ScreenMapping {
            origin_x,
            origin_y,
            width_px,
            height_px,
        };
    }

    /// Returns true if the overlay needs a redraw.
    pub fn handle_pointer_down(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let before = self.editor.selected();
        self.editor.pointer_down(x, y, &self.mapping, modifiers(shift, ctrl, alt, meta));
        before != self.editor.selected() || before.is_some()
    }

    /// Returns true if the layout moved.
    pub fn handle_pointer_move(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        self.editor.pointer_move(x, y, &self.mapping, modifiers(shift, ctrl, alt, meta));
        self.editor.overlay().dragging
    }

    /// Call from a window-level listener so releases outside the card end the drag.
    pub fn handle_pointer_up(&mut self, x: f64, y: f64, time_ms: f64) -> bool {
        let was_dragging = self.editor.overlay().dragging;
        self.editor.pointer_up(x, y, &self.mapping, time_ms.max(0.0) as u64);
        was_dragging
    }

    /// Handle a keyboard event. Returns JSON:
    /// `{"action":"<name>","pendingDelete":"<key>"|null}`
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let action = self.editor.key(key, modifiers(shift, ctrl, alt, meta));
        json!({
            "action": action.map_or("none", action_to_name),
            "pendingDelete": self.editor.pending_delete().map(|r| r.key.as_str().to_string()),
        })
        .to_string()
    }

    /// Expire the coordinate readout. Returns true if the overlay changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.editor.tick(now_ms.max(0.0) as u64)
    }

    /// Select from the element list; empty string clears.
    pub fn select(&mut self, key: &str) -> bool {
        let key = (!key.is_empty()).then(|| ElementKey::intern(key));
        match self.editor.select(key) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("select rejected: {err}");
                false
            }
        }
    }

    pub fn get_selected_key(&self) -> String {
        self.editor.selected().map(|k| k.as_str().to_string()).unwrap_or_default()
    }

    /// Properties of the selection for the side panel, as JSON (`{}` if none).
    pub fn get_selected_props(&self) -> String {
        let Some(key) = self.editor.selected() else {
            return "{}".to_string();
        };
        let Some(el) = self.editor.layout().get(key) else {
            return "{}".to_string();
        };
        json!({
            "key": key.as_str(),
            "type": el.kind.type_name(),
            "x": el.x,
            "y": el.y,
            "width": el.width.px().map_or(json!("auto"), |w| json!(w)),
            "height": el.height,
            "zIndex": el.z_index,
            "align": el.text().and_then(|t| t.align).map(|a| a.as_str()),
        })
        .to_string()
    }

    /// Panel edit on the selection. Rejected values leave the layout unchanged.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<(), JsValue> {
        self.editor.set_property(name, value).map_err(to_js)
    }

    /// Returns the key awaiting confirmation, or empty string.
    pub fn request_delete(&mut self) -> String {
        self.editor
            .request_delete()
            .map(|r| r.key.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn confirm_delete(&mut self) -> Result<(), JsValue> {
        match self.editor.pending_delete() {
            Some(request) => self.editor.confirm_delete(request).map_err(to_js),
            None => Ok(()),
        }
    }

    pub fn cancel_delete(&mut self) {
        self.editor.cancel_delete();
    }

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    pub fn save(&mut self) {
        self.editor.save();
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.editor.reset().map_err(to_js)
    }

    /// Current layout JSON.
    pub fn get_text(&mut self) -> String {
        self.editor.text().to_string()
    }

    /// Replace the layout from edited JSON.
    pub fn set_text(&mut self, text: &str) -> Result<(), JsValue> {
        self.editor.set_text(text).map_err(to_js)
    }

    pub fn set_data(&mut self, data_json: &str) -> Result<(), JsValue> {
        let data = parse_data(data_json).map_err(to_js)?;
        self.editor.set_data(data);
        Ok(())
    }

    /// Editor-mode HTML of the card.
    pub fn render_html(&self) -> Result<String, JsValue> {
        let tree = self.editor.render().map_err(to_js)?;
        Ok(card_render::html::render_html(&tree))
    }

    /// Editor-mode visual tree as JSON.
    pub fn get_tree_json(&self) -> Result<String, JsValue> {
        let tree = self.editor.render().map_err(to_js)?;
        serde_json::to_string(&tree).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn get_overlay_json(&self) -> String {
        serde_json::to_string(&self.editor.overlay()).unwrap_or_else(|err| {
            log::warn!("overlay serialization failed: {err}");
            "{}".to_string()
        })
    }

    /// Draw selection, guidelines, outlines and readout onto an overlay canvas.
    pub fn draw_overlay(&self, ctx: &CanvasRenderingContext2d) {
        overlay2d::draw_overlay(
            ctx,
            &self.editor.overlay(),
            &self.editor.layout().canvas,
            &self.mapping,
            &overlay2d::OverlayTheme::default(),
        );
    }
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers { shift, ctrl, alt, meta }
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Delete => "delete",
        ShortcutAction::Deselect => "deselect",
        ShortcutAction::Save => "save",
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Card WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no editor session) ────────────────────────────

/// Render a card for the public page. Returns JSON:
/// `{"ok":true,"html":"..."}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn render_html(layout_json: &str, data_json: &str) -> String {
    let rendered = (|| -> Result<String, LayoutError> {
        let doc = parse_layout(layout_json)?;
        let data = parse_data(data_json)?;
        let tree = compose_layout(&doc, &data, &EngineConfig::default(), RenderMode::Production)?;
        Ok(card_render::html::render_html(&tree))
    })();
    match rendered {
        Ok(html) => json!({ "ok": true, "html": html }).to_string(),
        Err(e) => error_json(&e),
    }
}

/// Lint a template. Returns JSON:
/// `{"ok":true,"diagnostics":[{"key","rule","severity","message"}]}` or
/// `{"ok":false,"error":"..."}` when the layout cannot be parsed at all.
#[wasm_bindgen]
pub fn validate(layout_json: &str, data_json: &str) -> String {
    let doc = match parse_layout(layout_json) {
        Ok(doc) => doc,
        Err(e) => return error_json(&e),
    };
    let data = match parse_data(data_json) {
        Ok(data) => data,
        Err(e) => return error_json(&e),
    };
    let diagnostics: Vec<serde_json::Value> = lint_layout(&doc, &data, &EngineConfig::default())
        .iter()
        .map(|d| {
            json!({
                "key": d.key.as_str(),
                "rule": d.rule,
                "severity": match d.severity {
                    LintSeverity::Warning => "warning",
                    LintSeverity::Info => "info",
                },
                "message": d.message,
            })
        })
        .collect();
    json!({ "ok": true, "diagnostics": diagnostics }).to_string()
}

fn error_json(err: &LayoutError) -> String {
    json!({ "ok": false, "error": err.to_string() }).to_string()
}
