//! Lint diagnostics for layout documents.
//!
//! Reports issues without modifying the document. The template checker and
//! the editor's problem list both read these.

use crate::binding::{DataDocument, has_text, resolve_image};
use crate::color::Rgba;
use crate::config::EngineConfig;
use crate::id::ElementKey;
use crate::layout::{EstimateMeasure, resolve_bounds};
use crate::model::*;
use std::collections::HashMap;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Should be fixed, likely a mistake.
    Warning,
    /// Informational.
    Info,
}

/// A single lint diagnostic for a layout entry.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// The entry this diagnostic refers to.
    pub key: ElementKey,
    /// Human-readable message.
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "malformed-element", "out-of-canvas").
    pub rule: &'static str,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run all lint rules and return diagnostics in document order per rule.
#[must_use]
pub fn lint_layout(doc: &LayoutDocument, data: &DataDocument, config: &EngineConfig) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_entries(doc, &mut diags);
    lint_unresolved_bindings(doc, data, &mut diags);
    lint_duplicate_z(doc, &mut diags);
    lint_center_flags(doc, &mut diags);
    lint_colors(doc, &mut diags);
    lint_out_of_canvas(doc, data, config, &mut diags);
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

/// Malformed entries (warning) and unknown types (info). Neither renders.
fn lint_entries(doc: &LayoutDocument, diags: &mut Vec<LintDiagnostic>) {
    for (key, entry) in doc.entries() {
        match entry {
            LayoutEntry::Malformed { reason, .. } => diags.push(LintDiagnostic {
                key,
                message: format!("`{key}` is not a valid element ({reason}) and will not render."),
                severity: LintSeverity::Warning,
                rule: "malformed-element",
            }),
            LayoutEntry::Element(LayoutElement {
                kind: ElementKind::Unknown(type_name),
                ..
            }) => diags.push(LintDiagnostic {
                key,
                message: format!("`{key}` has unknown type `{type_name}` and will not render."),
                severity: LintSeverity::Info,
                rule: "unknown-type",
            }),
            _ => {}
        }
    }
}

/// Elements whose content comes from a fallback instead of the data document.
fn lint_unresolved_bindings(doc: &LayoutDocument, data: &DataDocument, diags: &mut Vec<LintDiagnostic>) {
    for (key, el) in doc.elements() {
        let message = match &el.kind {
            ElementKind::Text(_) if !has_text(key.as_str(), data) => {
                format!("No data for `{key}`; the default placeholder will be shown.")
            }
            ElementKind::Image(_) if resolve_image(key.as_str(), data).is_none() => {
                if key.as_str().starts_with("decoration") {
                    format!("No data for `{key}`; the shared decoration asset will be used.")
                } else {
                    format!("No image for `{key}`; an empty box will be shown.")
                }
            }
            ElementKind::Vector(_) if resolve_image(key.as_str(), data).is_none() => {
                format!("No data for `{key}`; the shared vector asset will be used.")
            }
            ElementKind::Background(bg)
                if bg.background_color.is_none() && resolve_image(key.as_str(), data).is_none() =>
            {
                format!("Background `{key}` has neither an image nor a color.")
            }
            _ => continue,
        };
        diags.push(LintDiagnostic {
            key,
            message,
            severity: LintSeverity::Info,
            rule: "unresolved-binding",
        });
    }
}

/// Explicit `zIndex` values shared by several elements stack by document order.
fn lint_duplicate_z(doc: &LayoutDocument, diags: &mut Vec<LintDiagnostic>) {
    let mut first_holder: HashMap<i64, ElementKey> = HashMap::new();
    for (key, el) in doc.elements() {
        let Some(z) = el.z_index else { continue };
        if let Some(first) = first_holder.get(&z) {
            diags.push(LintDiagnostic {
                key,
                message: format!("`{key}` shares zIndex {z} with `{first}`; document order decides which is on top."),
                severity: LintSeverity::Info,
                rule: "duplicate-z-index",
            });
        } else {
            first_holder.insert(z, key);
        }
    }
}

/// Text whose `x` sits on the center line without `centerAlign` renders its
/// left edge there, which is almost never what the designer meant.
fn lint_center_flags(doc: &LayoutDocument, diags: &mut Vec<LintDiagnostic>) {
    let center = doc.canvas.center_x();
    for (key, el) in doc.elements() {
        let Some(text) = el.text() else { continue };
        if text.center_align || el.is_auto_centered() || (el.x - center).abs() >= 0.5 {
            continue;
        }
        diags.push(LintDiagnostic {
            key,
            message: format!(
                "`{key}` has x = {} (the canvas center) but no `centerAlign`; its left edge will sit on the center line.",
                el.x
            ),
            severity: LintSeverity::Warning,
            rule: "center-flag-mismatch",
        });
    }
}

fn lint_colors(doc: &LayoutDocument, diags: &mut Vec<LintDiagnostic>) {
    for (key, el) in doc.elements() {
        let color = match &el.kind {
            ElementKind::Text(t) => t.color.as_deref(),
            ElementKind::Background(b) => b.background_color.as_deref(),
            _ => None,
        };
        if let Some(color) = color
            && Rgba::parse(color).is_none()
        {
            diags.push(LintDiagnostic {
                key,
                message: format!("`{key}` has unrecognized color `{color}`."),
                severity: LintSeverity::Warning,
                rule: "invalid-color",
            });
        }
    }
}

/// Boxes that extend past the canvas edge (estimated for auto-width text).
fn lint_out_of_canvas(doc: &LayoutDocument, data: &DataDocument, config: &EngineConfig, diags: &mut Vec<LintDiagnostic>) {
    let bounds = resolve_bounds(doc, data, config, &EstimateMeasure);
    for key in doc.keys() {
        let Some(b) = bounds.get(&key) else { continue };
        if b.within(&doc.canvas) {
            continue;
        }
        diags.push(LintDiagnostic {
            key,
            message: format!(
                "`{key}` extends outside the {}×{} canvas (box {:.1},{:.1} {:.1}×{:.1}).",
                doc.canvas.width, doc.canvas.height, b.x, b.y, b.width, b.height
            ),
            severity: LintSeverity::Info,
            rule: "out-of-canvas",
        });
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
