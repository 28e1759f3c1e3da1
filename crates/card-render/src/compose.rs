//! Layout composer: a whole layout document → an ordered visual tree.
//!
//! Only the canvas can fail the render. Every element-level problem is
//! skipped with a diagnostic so one bad entry never blanks the card.

use crate::element::{RenderContext, RenderMode, VisualNode, render_element};
use card_core::binding::DataDocument;
use card_core::config::EngineConfig;
use card_core::error::LayoutError;
use card_core::id::ElementKey;
use card_core::model::*;
use serde::Serialize;

/// Why an entry was left out of the render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderIssue {
    Malformed { reason: String },
    UnknownType { type_name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderDiagnostic {
    pub key: ElementKey,
    pub issue: RenderIssue,
}

/// The composed card: nodes back-to-front.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualTree {
    pub canvas: Canvas,
    /// Solid fill behind every node, from the background element.
    pub background_color: Option<String>,
    pub nodes: Vec<VisualNode>,
    pub diagnostics: Vec<RenderDiagnostic>,
}

impl VisualTree {
    pub fn node(&self, key: ElementKey) -> Option<&VisualNode> {
        self.nodes.iter().find(|n| n.key == key)
    }

    /// Keys in paint order.
    pub fn keys(&self) -> impl Iterator<Item = ElementKey> + '_ {
        self.nodes.iter().map(|n| n.key)
    }
}

/// Compose every entry of `doc` into a visual tree.
pub fn compose_layout(
    doc: &LayoutDocument,
    data: &DataDocument,
    config: &EngineConfig,
    mode: RenderMode,
) -> Result<VisualTree, LayoutError> {
    doc.canvas.validate()?;

    let defaults = config.default_table();
    let ctx = RenderContext {
        canvas: &doc.canvas,
        data,
        config,
        defaults: &defaults,
        mode,
    };

    let mut nodes = Vec::with_capacity(doc.len());
    let mut diagnostics = Vec::new();
    let mut background_color = None;

    for (key, entry) in doc.entries() {
        match entry {
            LayoutEntry::Root => {}
            LayoutEntry::Malformed { reason, .. } => {
                log::warn!("skipping malformed entry `{key}`: {reason}");
                diagnostics.push(RenderDiagnostic {
                    key,
                    issue: RenderIssue::Malformed { reason: reason.clone() },
                });
            }
            LayoutEntry::Element(el) => {
                if let ElementKind::Unknown(type_name) = &el.kind {
                    diagnostics.push(RenderDiagnostic {
                        key,
                        issue: RenderIssue::UnknownType {
                            type_name: type_name.clone(),
                        },
                    });
                }
                if let ElementKind::Background(bg) = &el.kind
                    && background_color.is_none()
                {
                    background_color = bg.background_color.clone();
                }
                if let Some(node) = render_element(key, el, &ctx) {
                    nodes.push(node);
                }
            }
        }
    }

    // Stable: equal z keeps document order.
    nodes.sort_by_key(|n| n.z_index);

    Ok(VisualTree {
        canvas: doc.canvas,
        background_color,
        nodes,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_core::parser::parse_layout;
    use pretty_assertions::assert_eq;

    #[test]
    fn sorts_by_z_then_document_order() {
        let doc = parse_layout(
            r#"{ "baseSize": { "width": 100, "height": 100 },
                 "top_el": { "type": "container", "x": 0, "y": 0, "zIndex": 9 },
                 "a_el": { "type": "container", "x": 0, "y": 0, "zIndex": 1 },
                 "plain": { "type": "container", "x": 0, "y": 0 },
                 "b_el": { "type": "container", "x": 0, "y": 0, "zIndex": 1 } }"#,
        )
        .unwrap();
        let tree = compose_layout(&doc, &DataDocument::default(), &EngineConfig::default(), RenderMode::Editor).unwrap();
        let keys: Vec<&str> = tree.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["plain", "a_el", "b_el", "top_el"]);
    }

    #[test]
    fn bad_entries_do_not_stop_the_render() {
        let doc = parse_layout(
            r#"{ "baseSize": { "width": 100, "height": 100 },
                 "junk": [1, 2],
                 "sparkle": { "type": "particles" },
                 "groom": { "type": "text", "x": 1, "y": 1 } }"#,
        )
        .unwrap();
        let tree = compose_layout(&doc, &DataDocument::default(), &EngineConfig::default(), RenderMode::Production).unwrap();
        assert_eq!(tree.keys().map(|k| k.to_string()).collect::<Vec<_>>(), ["groom"]);
        assert_eq!(tree.diagnostics.len(), 2);
        assert_eq!(
            tree.diagnostics[1],
            RenderDiagnostic {
                key: ElementKey::intern("sparkle"),
                issue: RenderIssue::UnknownType {
                    type_name: "particles".into()
                },
            }
        );
    }

    #[test]
    fn invalid_canvas_is_a_hard_error() {
        let mut doc = parse_layout(r#"{ "baseSize": { "width": 100, "height": 100 } }"#).unwrap();
        doc.canvas.height = 0.0;
        let result = compose_layout(&doc, &DataDocument::default(), &EngineConfig::default(), RenderMode::Production);
        assert!(matches!(result, Err(LayoutError::InvalidCanvas { .. })));
    }

    #[test]
    fn background_color_goes_on_the_root() {
        let doc = parse_layout(
            r##"{ "baseSize": { "width": 100, "height": 100 },
                  "background": { "type": "background", "backgroundColor": "#fdf8f2" } }"##,
        )
        .unwrap();
        let tree = compose_layout(&doc, &DataDocument::default(), &EngineConfig::default(), RenderMode::Production).unwrap();
        assert_eq!(tree.background_color.as_deref(), Some("#fdf8f2"));
        assert!(tree.nodes.is_empty());
    }
}
