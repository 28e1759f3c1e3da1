pub mod align;
pub mod binding;
pub mod color;
pub mod config;
pub mod coords;
pub mod emitter;
pub mod error;
pub mod id;
pub mod import;
pub mod layout;
pub mod lint;
pub mod model;
pub mod parser;
pub mod store;

pub use binding::{DataDocument, DefaultTable, resolve_image, resolve_text};
pub use color::Rgba;
pub use config::EngineConfig;
pub use coords::{Percent, ScreenMapping, percent_to_px, round2, to_percent};
pub use emitter::{emit_data, emit_layout};
pub use error::LayoutError;
pub use id::ElementKey;
pub use layout::{EstimateMeasure, TextMeasure, resolve_bounds};
pub use lint::{LintDiagnostic, LintSeverity, lint_layout};
pub use model::*;
pub use parser::{parse_data, parse_layout};
pub use store::{MemoryStore, TemplateBundle, TemplateStore};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
