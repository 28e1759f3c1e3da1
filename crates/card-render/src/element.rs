//! Element renderer: one layout element → one positioned visual node.
//!
//! Positions become percentages of the canvas so the card scales with its
//! container. Each element type applies its own defaults; missing data shows
//! as a visible placeholder, never as silent emptiness.

use card_core::binding::{DataDocument, DefaultTable, resolve_image, resolve_text};
use card_core::config::EngineConfig;
use card_core::coords::{Percent, to_percent};
use card_core::id::{BACKGROUND_KEY, ElementKey};
use card_core::model::*;
use serde::Serialize;

/// Production output hides editing aids; editor output shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Production,
    Editor,
}

/// Everything an element needs besides itself.
pub struct RenderContext<'a> {
    pub canvas: &'a Canvas,
    pub data: &'a DataDocument,
    pub config: &'a EngineConfig,
    pub defaults: &'a DefaultTable,
    pub mode: RenderMode,
}

// ─── Visual node ─────────────────────────────────────────────────────────

/// Absolute placement inside the card, in canvas percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub left: Option<Percent>,
    pub top: Option<Percent>,
    pub width: Option<Percent>,
    pub height: Option<Percent>,
    /// Shift left by half the node's own width (`translateX(-50%)`).
    pub center_on_left: bool,
    /// Cover the whole card (`inset: 0`); other fields are ignored.
    pub fill_parent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_size: f64,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub color: Option<String>,
    pub align: TextAlign,
    pub letter_spacing: Option<f64>,
    /// `None` is CSS `normal`.
    pub line_height: Option<f64>,
    pub text_transform: TextTransform,
    /// Multi-line values keep their line breaks (`white-space: pre-line`).
    pub preserve_line_breaks: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum VisualContent {
    Text { content: String, style: TextStyle },
    /// `src: None` renders an empty placeholder box.
    Image { src: Option<String>, object_fit: ObjectFit },
    Vector { src: String, object_fit: ObjectFit },
    Background { src: String, size: String, position: String },
    /// Dashed outline of a container, editor mode only.
    Outline,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualNode {
    pub key: ElementKey,
    pub z_index: i64,
    pub placement: Placement,
    pub content: VisualContent,
}

// ─── Renderer ────────────────────────────────────────────────────────────

/// Render one element. `None` means the element produces no output here.
pub fn render_element(key: ElementKey, el: &LayoutElement, ctx: &RenderContext<'_>) -> Option<VisualNode> {
    let content = match &el.kind {
        ElementKind::Text(text) => render_text(key, text, ctx),
        ElementKind::Image(image) => VisualContent::Image {
            src: image_src(key, ctx),
            object_fit: image.object_fit.unwrap_or(ObjectFit::Cover),
        },
        ElementKind::Vector(image) => VisualContent::Vector {
            src: resolve_image(key.as_str(), ctx.data)
                .unwrap_or_else(|| ctx.config.asset_path(key.as_str(), "svg")),
            object_fit: image.object_fit.unwrap_or(ObjectFit::Contain),
        },
        ElementKind::Background(bg) => {
            let src = resolve_image(key.as_str(), ctx.data).or_else(|| resolve_image(BACKGROUND_KEY, ctx.data));
            let Some(src) = src else {
                log::debug!("background `{key}` has no image; color only");
                return None;
            };
            VisualContent::Background {
                src,
                size: bg.background_size.clone().unwrap_or_else(|| "cover".into()),
                position: bg.background_position.clone().unwrap_or_else(|| "center".into()),
            }
        }
        ElementKind::Container => match ctx.mode {
            RenderMode::Production => return None,
            RenderMode::Editor => VisualContent::Outline,
        },
        ElementKind::Unknown(type_name) => {
            log::debug!("skipping `{key}`: unknown type `{type_name}`");
            return None;
        }
    };

    Some(VisualNode {
        key,
        z_index: el.z(),
        placement: placement(el, ctx.canvas),
        content,
    })
}

fn render_text(key: ElementKey, text: &TextProps, ctx: &RenderContext<'_>) -> VisualContent {
    let content = resolve_text(key.as_str(), ctx.data, ctx.defaults);
    let style = TextStyle {
        font_size: text.font_size.unwrap_or(ctx.config.default_font_size),
        font_family: text.font_family.clone(),
        font_weight: text.font_weight.clone(),
        color: text.color.clone(),
        align: text.align.unwrap_or_default(),
        letter_spacing: text.letter_spacing,
        line_height: text.line_height,
        text_transform: text.text_transform.unwrap_or_default(),
        preserve_line_breaks: content.contains('\n'),
    };
    VisualContent::Text { content, style }
}

/// Data first; `decoration*` keys then try the shared decoration image and
/// finally the synthesized asset path.
fn image_src(key: ElementKey, ctx: &RenderContext<'_>) -> Option<String> {
    if let Some(src) = resolve_image(key.as_str(), ctx.data) {
        return Some(src);
    }
    if key.as_str().starts_with("decoration") {
        let src = ctx
            .data
            .lookup("decorationImage")
            .unwrap_or_else(|| ctx.config.asset_path(key.as_str(), "png"));
        return Some(src);
    }
    log::debug!("image `{key}` unresolved; rendering placeholder");
    None
}

fn placement(el: &LayoutElement, canvas: &Canvas) -> Placement {
    if el.is_background() {
        return Placement {
            fill_parent: true,
            ..Default::default()
        };
    }

    let mut placement = Placement {
        left: Some(to_percent(el.x, canvas.width)),
        top: Some(to_percent(el.y, canvas.height)),
        width: el.width.px().map(|w| to_percent(w, canvas.width)),
        height: el.height.map(|h| to_percent(h, canvas.height)),
        center_on_left: false,
        fill_parent: false,
    };

    if el.is_center_anchored() {
        placement.center_on_left = true;
    } else if el.is_auto_centered() {
        placement.left = Some(Percent(50.0));
        placement.center_on_left = true;
    }
    placement
}
