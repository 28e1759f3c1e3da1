pub mod compose;
pub mod element;
pub mod hit;
pub mod html;
pub mod overlay;
pub mod paint;

pub use compose::{RenderDiagnostic, RenderIssue, VisualTree, compose_layout};
pub use element::{RenderContext, RenderMode, VisualContent, VisualNode, render_element};
pub use hit::hit_test;
pub use html::render_html;
pub use overlay::{EditorOverlay, Readout, SelectionBox};
