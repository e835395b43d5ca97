use crate::assets::decode::SourceImage;
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::RetouchResult;
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::encode::{EncodeFormat, encode_data_uri};

/// An in-memory raster of fixed size, stored as row-major premultiplied RGBA8.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// A fully transparent surface.
    pub(crate) fn transparent(width: u32, height: u32) -> Self {
        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        Self {
            width,
            height,
            data: vec![0; len],
        }
    }

    /// Adopt decoded pixels. `None` when the buffer does not match the stated size.
    pub(crate) fn from_source(image: SourceImage) -> Option<Self> {
        let expected = (image.width as usize)
            .checked_mul(image.height as usize)?
            .checked_mul(4)?;
        (image.rgba8_premul.len() == expected).then(|| Self {
            width: image.width,
            height: image.height,
            data: image.rgba8_premul,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// `true` when the surface has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Premultiplied RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The pixel at `(x, y)`, or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = &self.data[i..i + 4];
        Some(Rgba8Premul {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
    }

    /// Straight-alpha copy for handing to the `image` ecosystem.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut straight = self.data.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        image::RgbaImage::from_raw(self.width, self.height, straight)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    /// Encode as a `data:` URI.
    ///
    /// A surface without pixels encodes as `data:,`.
    pub fn to_data_uri(&self, format: EncodeFormat) -> RetouchResult<String> {
        encode_data_uri(self, format)
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
