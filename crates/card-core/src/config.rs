//! Engine configuration shared by the renderer and the editor.

use crate::binding::DefaultTable;
use crate::error::LayoutError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tunables for rendering and editing. Deserializes from camelCase JSON;
/// every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Snap distance in canvas px (strictly less than). Default: **5**.
    pub snap_threshold: f64,

    /// Pointer travel in canvas px before a pending drag starts. Default: **5**.
    pub drag_threshold: f64,

    /// How close an element's center must be to the canvas center line for
    /// import to mark it `centerAlign`. Default: **10**.
    pub center_align_tolerance: f64,

    /// How long the coordinate readout stays after a drag. Default: **1500**.
    pub readout_linger_ms: u64,

    /// Prefix for synthesized decoration/vector asset paths.
    pub asset_root: String,

    /// Text size when an element sets none. Default: **16**.
    pub default_font_size: f64,

    /// Overrides layered over the built-in default text table.
    pub defaults: HashMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_threshold: 5.0,
            drag_threshold: 5.0,
            center_align_tolerance: 10.0,
            readout_linger_ms: 1500,
            asset_root: "/assets/common".to_string(),
            default_font_size: 16.0,
            defaults: HashMap::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(input: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(input)?)
    }

    /// The built-in default table with this config's overrides applied.
    pub fn default_table(&self) -> DefaultTable {
        DefaultTable::builtin().merged(&self.defaults)
    }

    /// Synthesized asset path, e.g. `/assets/common/decoration2.png`.
    pub fn asset_path(&self, key: &str, extension: &str) -> String {
        format!("{}/{key}.{extension}", self.asset_root.trim_end_matches('/'))
    }
}
