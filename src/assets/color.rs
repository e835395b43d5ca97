use crate::foundation::core::Rgba8Premul;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Straight-alpha color with normalized `0..=1` channels.
///
/// Parses the CSS forms orders are written with: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
/// `rgb(..)`, `rgba(..)`, `transparent` and the common named colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
    /// Alpha.
    pub a: f64,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    /// Build from normalized channels.
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels.
    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            f64::from(a) / 255.0,
        )
    }

    /// Straight-alpha 8-bit channels.
    pub fn to_rgba8(self) -> [u8; 4] {
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    /// Premultiplied 8-bit channels, the layout surfaces store.
    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        let a = self.a.clamp(0.0, 1.0);
        Rgba8Premul {
            r: to_u8(self.r.clamp(0.0, 1.0) * a),
            g: to_u8(self.g.clamp(0.0, 1.0) * a),
            b: to_u8(self.b.clamp(0.0, 1.0) * a),
            a: to_u8(a),
        }
    }
}

fn to_u8(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(args) = function_args(&s, "rgba").or_else(|| function_args(&s, "rgb")) {
            return parse_rgb_args(args);
        }
        named(&s).ok_or_else(|| format!("unrecognized color \"{s}\""))
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Css(String),
            RgbaObj {
                r: f64,
                g: f64,
                b: f64,
                #[serde(default = "one")]
                a: f64,
            },
            Arr(Vec<f64>),
        }

        fn one() -> f64 {
            1.0
        }

        match Repr::deserialize(deserializer)? {
            Repr::Css(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::RgbaObj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgba(*r, *g, *b, 1.0)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_hex(s: &str) -> Result<Color, String> {
    fn nibble(c: char) -> Result<u8, String> {
        c.to_digit(16)
            .map(|d| (d as u8) * 17)
            .ok_or_else(|| format!("invalid hex digit '{c}'"))
    }
    fn byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    let chars: Vec<char> = s.chars().collect();
    let [r, g, b, a] = match chars.len() {
        3 | 4 => {
            let a = if chars.len() == 4 { nibble(chars[3])? } else { 255 };
            [nibble(chars[0])?, nibble(chars[1])?, nibble(chars[2])?, a]
        }
        6 | 8 if s.is_ascii() => {
            let a = if s.len() == 8 { byte(&s[6..8])? } else { 255 };
            [byte(&s[0..2])?, byte(&s[2..4])?, byte(&s[4..6])?, a]
        }
        _ => {
            return Err("hex color must be #rgb, #rgba, #rrggbb or #rrggbbaa".to_owned());
        }
    };
    Ok(Color::rgba8(r, g, b, a))
}

fn parse_rgb_args(args: &str) -> Result<Color, String> {
    // Accept both `rgb(1, 2, 3)` and `rgb(1 2 3 / 0.5)`.
    let parts: Vec<&str> = args
        .split([',', '/', ' '])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!("rgb()/rgba() takes 3 or 4 components, got {}", parts.len()));
    }

    let channel = |p: &str| -> Result<f64, String> {
        match p.strip_suffix('%') {
            Some(pct) => parse_num(pct).map(|v| v / 100.0),
            None => parse_num(p).map(|v| v / 255.0),
        }
    };
    let alpha = |p: &str| -> Result<f64, String> {
        match p.strip_suffix('%') {
            Some(pct) => parse_num(pct).map(|v| v / 100.0),
            None => parse_num(p),
        }
    };

    let a = match parts.get(3) {
        Some(p) => alpha(p)?,
        None => 1.0,
    };
    Ok(Color::rgba(
        channel(parts[0])?.clamp(0.0, 1.0),
        channel(parts[1])?.clamp(0.0, 1.0),
        channel(parts[2])?.clamp(0.0, 1.0),
        a.clamp(0.0, 1.0),
    ))
}

fn parse_num(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid color component \"{s}\""))
}

fn named(name: &str) -> Option<Color> {
    let [r, g, b] = match name {
        "transparent" => return Some(Color::TRANSPARENT),
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "lime" => [0, 255, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "cyan" | "aqua" => [0, 255, 255],
        "magenta" | "fuchsia" => [255, 0, 255],
        "gray" | "grey" => [128, 128, 128],
        "silver" => [192, 192, 192],
        "lightgray" | "lightgrey" => [211, 211, 211],
        "darkgray" | "darkgrey" => [169, 169, 169],
        "maroon" => [128, 0, 0],
        "olive" => [128, 128, 0],
        "navy" => [0, 0, 128],
        "purple" => [128, 0, 128],
        "teal" => [0, 128, 128],
        "orange" => [255, 165, 0],
        "pink" => [255, 192, 203],
        "brown" => [165, 42, 42],
        "gold" => [255, 215, 0],
        "indigo" => [75, 0, 130],
        "violet" => [238, 130, 238],
        "coral" => [255, 127, 80],
        "salmon" => [250, 128, 114],
        "tomato" => [255, 99, 71],
        "crimson" => [220, 20, 60],
        "skyblue" => [135, 206, 235],
        "steelblue" => [70, 130, 180],
        "whitesmoke" => [245, 245, 245],
        _ => return None,
    };
    Some(Color::rgba8(r, g, b, 255))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
