use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use image::ImageEncoder;

use crate::foundation::error::{RetouchError, RetouchResult};
use crate::render::surface::Surface;

/// Image format used when a surface is projected to a `data:` URI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EncodeFormat {
    /// Lossless PNG with alpha.
    #[default]
    Png,
    /// JPEG at `quality` (1..=100). Transparent pixels are flattened onto black.
    Jpeg {
        /// Encoder quality.
        quality: u8,
    },
}

impl EncodeFormat {
    /// MIME type written into the URI.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }
}

pub(crate) fn encode_data_uri(surface: &Surface, format: EncodeFormat) -> RetouchResult<String> {
    if surface.is_empty() {
        return Ok("data:,".to_owned());
    }
    let bytes = encode_bytes(surface, format)?;
    Ok(format!(
        "data:{};base64,{}",
        format.mime(),
        general_purpose::STANDARD.encode(bytes)
    ))
}

fn encode_bytes(surface: &Surface, format: EncodeFormat) -> RetouchResult<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        EncodeFormat::Png => {
            image::DynamicImage::ImageRgba8(surface.to_rgba_image())
                .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .map_err(|e| RetouchError::encode(format!("png: {e}")))?;
        }
        EncodeFormat::Jpeg { quality } => {
            // Dropping alpha from premultiplied pixels is compositing over black.
            let rgb: Vec<u8> = surface
                .data()
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
                .write_image(
                    &rgb,
                    surface.width(),
                    surface.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| RetouchError::encode(format!("jpeg: {e}")))?;
        }
    }
    Ok(buf)
}
