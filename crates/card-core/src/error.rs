//! Error type for structural layout failures.
//!
//! Element-level problems (bad `type`, missing data) never surface here;
//! they degrade to diagnostics. Only canvas-level and document-shape failures
//! escalate to the caller.

use crate::id::ElementKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    /// `baseSize` has a zero, negative, or non-finite dimension.
    #[error("invalid canvas size {width}x{height}: both dimensions must be positive")]
    InvalidCanvas { width: f64, height: f64 },

    /// The document has no `baseSize` record.
    #[error("layout document has no `baseSize` record")]
    MissingCanvas,

    /// The document (or the data document) is not a JSON object.
    #[error("{what} must be a JSON object")]
    NotAnObject { what: &'static str },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no element `{0}` in layout")]
    UnknownElement(ElementKey),

    #[error("element `{0}` already exists")]
    DuplicateElement(ElementKey),

    #[error("`{0}` is reserved and cannot be used as an element key")]
    ReservedKey(String),

    /// A property edit with an unknown name or an unparsable value.
    #[error("invalid value `{value}` for property `{property}`")]
    InvalidProperty { property: String, value: String },

    #[error("template `{0}` not found")]
    TemplateNotFound(String),
}

impl LayoutError {
    pub fn invalid_property(property: &str, value: &str) -> Self {
        Self::InvalidProperty {
            property: property.to_string(),
            value: value.to_string(),
        }
    }
}
