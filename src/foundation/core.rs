pub use kurbo::{BezPath, Point, Rect};

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Byte layout used by surfaces.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Return `true` when nothing would be painted with this color.
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

/// Ratio between logical units and device pixels.
///
/// Order geometry is expressed in logical units; handlers multiply by this factor when an order
/// asks for device pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceScale(f64);

impl DeviceScale {
    /// Identity scale.
    pub const ONE: Self = Self(1.0);

    /// Create a scale factor. Returns `None` unless `factor` is finite and > 0.
    pub fn new(factor: f64) -> Option<Self> {
        (factor.is_finite() && factor > 0.0).then_some(Self(factor))
    }

    /// Raw factor.
    pub fn factor(self) -> f64 {
        self.0
    }

    /// Convert a logical value into the unit the order asked for.
    pub fn apply(self, value: f64, use_device_pixel: bool) -> f64 {
        if use_device_pixel {
            value * self.0
        } else {
            value
        }
    }
}

impl Default for DeviceScale {
    fn default() -> Self {
        Self::ONE
    }
}

/// Convert a (possibly fractional, possibly negative) length into a pixel dimension.
///
/// Fractions truncate and negatives collapse to zero, matching how a 2D canvas treats assigned
/// sizes.
pub(crate) fn to_pixel_dim(v: f64) -> u32 {
    if !v.is_finite() || v <= 0.0 {
        return 0;
    }
    v.min(f64::from(u32::MAX)) as u32
}
