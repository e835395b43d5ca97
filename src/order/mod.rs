//! Transform orders: the serializable description of one step in a pipeline.
//!
//! Orders use the JSON shape `{"type": "<kind>", "options": {...}}` with camelCase option keys.
//! Numeric geometry is in logical units and is multiplied by the device scale when
//! `useDevicePixel` is true (the default).

pub(crate) mod ops;

use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::foundation::error::{RetouchError, RetouchResult};
use crate::render::canvas::{TextAlign, TextBaseline};

/// One image transformation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "camelCase")]
pub enum ImageOrder {
    /// Crop to a sub-region.
    Clip(ClipOptions),
    /// Draw text onto the image in place.
    Mark(MarkOptions),
    /// Round the corners.
    Round(RoundOptions),
    /// Add a drop shadow, growing the image.
    Shadow(ShadowOptions),
    /// Fill a solid color behind the image.
    Background(BackgroundOptions),
}

impl ImageOrder {
    /// Wire name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Clip(_) => "clip",
            Self::Mark(_) => "mark",
            Self::Round(_) => "round",
            Self::Shadow(_) => "shadow",
            Self::Background(_) => "background",
        }
    }
}

fn default_true() -> bool {
    true
}

/// Options for [`ImageOrder::Clip`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipOptions {
    /// Left edge of the region.
    pub x: f64,
    /// Top edge of the region.
    pub y: f64,
    /// Region width; becomes the output width.
    pub width: f64,
    /// Region height; becomes the output height.
    pub height: f64,
    /// Scale geometry by the device factor.
    #[serde(default = "default_true")]
    pub use_device_pixel: bool,
}

/// Options for [`ImageOrder::Mark`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkOptions {
    /// Text to draw (single line).
    pub text: String,
    /// Anchor x.
    #[serde(default)]
    pub x: f64,
    /// Anchor y.
    #[serde(default)]
    pub y: f64,
    /// CSS font-family list.
    #[serde(default = "MarkOptions::default_font_family")]
    pub font_family: String,
    /// Font size in logical pixels.
    #[serde(default = "MarkOptions::default_font_size")]
    pub font_size: f64,
    /// Vertical anchoring.
    #[serde(default)]
    pub text_baseline: TextBaseline,
    /// Horizontal anchoring.
    #[serde(default)]
    pub text_align: TextAlign,
    /// Fill color.
    #[serde(default = "MarkOptions::default_color")]
    pub color: Color,
    /// Scale position and font size by the device factor.
    #[serde(default = "default_true")]
    pub use_device_pixel: bool,
}

impl MarkOptions {
    fn default_font_family() -> String {
        "sans-serif".to_owned()
    }

    fn default_font_size() -> f64 {
        14.0
    }

    fn default_color() -> Color {
        Color::BLACK
    }

    /// Text at `(x, y)` with every other option at its default.
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_family: Self::default_font_family(),
            font_size: Self::default_font_size(),
            text_baseline: TextBaseline::default(),
            text_align: TextAlign::default(),
            color: Self::default_color(),
            use_device_pixel: true,
        }
    }
}

/// Options for [`ImageOrder::Round`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOptions {
    /// Corner radius; clamped to half the shorter side.
    pub radius: f64,
    /// Scale the radius by the device factor.
    #[serde(default = "default_true")]
    pub use_device_pixel: bool,
}

/// Options for [`ImageOrder::Shadow`]. Every field is optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadowOptions {
    /// Shadow color.
    pub shadow_color: Color,
    /// Blur amount; the output grows by this much on every side.
    pub shadow_blur: f64,
    /// Horizontal shadow offset.
    pub shadow_offset_x: f64,
    /// Vertical shadow offset.
    pub shadow_offset_y: f64,
    /// Scale blur and offsets by the device factor.
    pub use_device_pixel: bool,
}

impl Default for ShadowOptions {
    fn default() -> Self {
        Self {
            shadow_color: Color::rgba(0.0, 0.0, 0.0, 0.5),
            shadow_blur: 10.0,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
            use_device_pixel: true,
        }
    }
}

/// Options for [`ImageOrder::Background`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundOptions {
    /// Fill color painted behind the image.
    pub background_color: Color,
}

/// Parse a JSON array of orders (or a single order object).
pub fn parse_orders(json: &str) -> RetouchResult<Vec<ImageOrder>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<ImageOrder>),
        One(ImageOrder),
    }

    let parsed: OneOrMany = serde_json::from_str(json)
        .map_err(|e| RetouchError::order(format!("invalid orders json: {e}")))?;
    Ok(match parsed {
        OneOrMany::Many(v) => v,
        OneOrMany::One(o) => vec![o],
    })
}
