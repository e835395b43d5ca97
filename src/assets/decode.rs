use anyhow::{Context, ensure};

use crate::foundation::math::premultiply_rgba8_in_place;

/// A decoded source image in premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 pixels.
    pub rgba8_premul: Vec<u8>,
}

impl SourceImage {
    /// Wrap already premultiplied pixels, checking the buffer length.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> anyhow::Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .context("image size overflow")?;
        ensure!(
            rgba8_premul.len() == expected,
            "pixel buffer is {} bytes, expected {expected} for {width}x{height}",
            rgba8_premul.len()
        );
        Ok(Self {
            width,
            height,
            rgba8_premul,
        })
    }
}

/// Decode any raster format `image` understands.
pub(crate) fn decode_raster(bytes: &[u8]) -> anyhow::Result<SourceImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(SourceImage {
        width,
        height,
        rgba8_premul,
    })
}

/// Parse and rasterize an SVG document at its intrinsic size.
pub(crate) fn decode_svg(bytes: &[u8]) -> anyhow::Result<SourceImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    let (width, height) = crate::assets::svg_raster::svg_intrinsic_size(&tree)?;
    let rgba8_premul =
        crate::assets::svg_raster::rasterize_svg_to_premul_rgba8(&tree, width, height)?;
    SourceImage::from_premul(width, height, rgba8_premul)
}

/// Sniff SVG markup so `data:` URIs without a mime type still decode.
pub(crate) fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}
