use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::assets::text::{TextBrushRgba8, TextLayoutEngine, first_line_extent};
use crate::foundation::core::{BezPath, Rect};
use crate::render::blur::blur_rgba8_premul;
use crate::render::composite::{
    blit_over, fill_solid, mask_alpha_in_place, over_in_place, shift, tint_by_alpha,
};
use crate::render::surface::Surface;

/// Horizontal anchoring of text relative to the x coordinate passed to [`Canvas::fill_text`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Text starts at x.
    #[default]
    Left,
    /// Text ends at x.
    Right,
    /// Text is centered on x.
    Center,
    /// Same as `Left` (left-to-right only).
    Start,
    /// Same as `Right` (left-to-right only).
    End,
}

/// Which line of the text's em box sits on the y coordinate passed to [`Canvas::fill_text`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    /// Top of the em box.
    #[default]
    Top,
    /// Hanging baseline.
    Hanging,
    /// Middle of the em box.
    Middle,
    /// Alphabetic baseline.
    Alphabetic,
    /// Ideographic baseline.
    Ideographic,
    /// Bottom of the em box.
    Bottom,
}

/// Drop shadow applied to every draw while set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    /// Shadow color.
    pub color: Color,
    /// Blur amount in pixels; the Gaussian sigma is half of it.
    pub blur: f64,
    /// Horizontal offset in pixels.
    pub offset_x: f64,
    /// Vertical offset in pixels.
    pub offset_y: f64,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            color: Color::TRANSPARENT,
            blur: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl Shadow {
    fn is_visible(&self) -> bool {
        !self.color.to_rgba8_premul().is_transparent()
            && (self.blur > 0.0 || self.offset_x != 0.0 || self.offset_y != 0.0)
    }
}

/// A 2D drawing context bound to one [`Surface`].
///
/// Every draw renders into a transparent layer the size of the surface, then goes through the
/// same tail: shadow (if visible), clip mask (if any), source-over onto the surface.
pub struct Canvas {
    surface: Surface,
    fill: Color,
    font_family: String,
    font_size: f64,
    text_align: TextAlign,
    text_baseline: TextBaseline,
    shadow: Shadow,
    clip: Option<Vec<u8>>,
    text: Option<TextLayoutEngine>,
}

impl Canvas {
    /// Bind a drawing context to an existing surface.
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            fill: Color::BLACK,
            font_family: "sans-serif".to_owned(),
            font_size: 10.0,
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::Alphabetic,
            shadow: Shadow::default(),
            clip: None,
            text: None,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// The bound surface.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Release the bound surface.
    pub fn into_surface(self) -> Surface {
        self.surface
    }

    /// Color used by [`Canvas::fill_rect`] and [`Canvas::fill_text`].
    pub fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
    }

    /// Font family list (CSS syntax) and size in pixels.
    pub fn set_font(&mut self, family: impl Into<String>, size_px: f64) {
        self.font_family = family.into();
        self.font_size = size_px;
    }

    /// Horizontal text anchoring.
    pub fn set_text_align(&mut self, align: TextAlign) {
        self.text_align = align;
    }

    /// Vertical text anchoring.
    pub fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.text_baseline = baseline;
    }

    /// Shadow for subsequent draws.
    pub fn set_shadow(&mut self, shadow: Shadow) {
        self.shadow = shadow;
    }

    /// Intersect the clip region with the filled area of `path`.
    pub fn clip_path(&mut self, path: &BezPath) {
        let Some(mut mask) = self.render_layer(|ctx| {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
            ctx.fill_path(&to_cpu_path(path));
        }) else {
            return;
        };
        if let Some(prev) = &self.clip {
            mask_alpha_in_place(&mut mask, prev);
        }
        self.clip = Some(mask);
    }

    /// Fill `rect` with the fill color.
    pub fn fill_rect(&mut self, rect: Rect) {
        let rgba = self.fill.to_rgba8_premul().to_array();
        if is_pixel_aligned(rect) {
            let (w, h) = self.surface.size();
            let x0 = rect.x0.clamp(0.0, f64::from(w)) as usize;
            let x1 = rect.x1.clamp(0.0, f64::from(w)) as usize;
            let y0 = rect.y0.clamp(0.0, f64::from(h)) as usize;
            let y1 = rect.y1.clamp(0.0, f64::from(h)) as usize;
            if x0 >= x1 || y0 >= y1 {
                return;
            }
            let stride = w as usize * 4;
            let mut layer = vec![0u8; self.surface.data().len()];
            for row in layer.chunks_exact_mut(stride).take(y1).skip(y0) {
                fill_solid(&mut row[x0 * 4..x1 * 4], rgba);
            }
            self.composite_layer(layer);
            return;
        }

        let [r, g, b, a] = self.fill.to_rgba8();
        let paint = vello_cpu::peniko::Color::from_rgba8(r, g, b, a);
        let rect = vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1);
        let layer = self.render_layer(|ctx| {
            ctx.set_paint(paint);
            ctx.fill_rect(&rect);
        });
        if let Some(layer) = layer {
            self.composite_layer(layer);
        }
    }

    /// Draw `src` with its top-left corner at `(dx, dy)`.
    ///
    /// Whole-pixel offsets copy pixels exactly; fractional offsets are resampled.
    pub fn draw_surface(&mut self, src: &Surface, dx: f64, dy: f64) {
        if src.is_empty() || self.surface.is_empty() {
            return;
        }
        if dx.fract() == 0.0 && dy.fract() == 0.0 {
            let mut layer = vec![0u8; self.surface.data().len()];
            blit_over(
                &mut layer,
                self.surface.size(),
                src.data(),
                src.size(),
                dx as i64,
                dy as i64,
            );
            self.composite_layer(layer);
            return;
        }

        let Some(paint) = image_paint(src) else {
            return;
        };
        let (sw, sh) = (f64::from(src.width()), f64::from(src.height()));
        let layer = self.render_layer(|ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((dx, dy)));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, sw, sh));
        });
        if let Some(layer) = layer {
            self.composite_layer(layer);
        }
    }

    /// Draw one line of text at `(x, y)` using the current font, alignment, baseline and fill.
    pub fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        if text.is_empty()
            || self.surface.is_empty()
            || !(self.font_size > 0.0)
            || self.fill.a <= 0.0
        {
            return;
        }
        let [r, g, b, a] = self.fill.to_rgba8();
        let brush = TextBrushRgba8 { r, g, b, a };
        let engine = self.text.get_or_insert_with(TextLayoutEngine::new);
        let layout = engine.layout_line(text, &self.font_family, self.font_size as f32, brush);
        let Some(extent) = first_line_extent(&layout) else {
            return;
        };

        let advance = f64::from(extent.advance);
        let ascent = f64::from(extent.ascent);
        let descent = f64::from(extent.descent);
        let align_dx = match self.text_align {
            TextAlign::Left | TextAlign::Start => 0.0,
            TextAlign::Right | TextAlign::End => -advance,
            TextAlign::Center => -advance / 2.0,
        };
        // Distance from the requested anchor line down to the alphabetic baseline.
        let baseline_dy = match self.text_baseline {
            TextBaseline::Top => ascent,
            TextBaseline::Hanging => ascent * 0.8,
            TextBaseline::Middle => (ascent - descent) / 2.0,
            TextBaseline::Alphabetic => 0.0,
            TextBaseline::Ideographic | TextBaseline::Bottom => -descent,
        };
        let tx = x + align_dx;
        let ty = y + baseline_dy - f64::from(extent.baseline);

        let mut fonts: HashMap<(u64, u32), vello_cpu::peniko::FontData> = HashMap::new();
        let Some(layer) = self.render_layer(|ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((tx, ty)));
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let src_font = run.run().font();
                    let font = fonts
                        .entry((src_font.data.id(), src_font.index))
                        .or_insert_with(|| {
                            vello_cpu::peniko::FontData::new(
                                vello_cpu::peniko::Blob::from(src_font.data.data().to_vec()),
                                src_font.index,
                            )
                        });
                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }) else {
            return;
        };
        self.composite_layer(layer);
    }

    fn composite_layer(&mut self, mut layer: Vec<u8>) {
        let size = self.surface.size();
        if self.shadow.is_visible() {
            let tinted = tint_by_alpha(&layer, self.shadow.color.to_rgba8_premul());
            let shifted = shift(
                &tinted,
                size,
                self.shadow.offset_x.round() as i64,
                self.shadow.offset_y.round() as i64,
            );
            let sigma = (self.shadow.blur / 2.0) as f32;
            let mut shadow = blur_rgba8_premul(&shifted, size.0, size.1, sigma);
            if let Some(mask) = &self.clip {
                mask_alpha_in_place(&mut shadow, mask);
            }
            over_in_place(self.surface.data_mut(), &shadow);
        }
        if let Some(mask) = &self.clip {
            mask_alpha_in_place(&mut layer, mask);
        }
        over_in_place(self.surface.data_mut(), &layer);
    }

    /// Rasterize with `vello_cpu` into a fresh transparent layer the size of the surface.
    ///
    /// `None` when the surface has no pixels or exceeds what the rasterizer addresses.
    fn render_layer(&self, draw: impl FnOnce(&mut vello_cpu::RenderContext)) -> Option<Vec<u8>> {
        let w: u16 = self.surface.width().try_into().ok()?;
        let h: u16 = self.surface.height().try_into().ok()?;
        if w == 0 || h == 0 {
            return None;
        }
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        draw(&mut ctx);
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        Some(pixmap.data_as_u8_slice().to_vec())
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("surface", &self.surface)
            .field("fill", &self.fill)
            .field("font_family", &self.font_family)
            .field("font_size", &self.font_size)
            .field("text_align", &self.text_align)
            .field("text_baseline", &self.text_baseline)
            .field("shadow", &self.shadow)
            .field("clipped", &self.clip.is_some())
            .finish()
    }
}

fn is_pixel_aligned(rect: Rect) -> bool {
    [rect.x0, rect.y0, rect.x1, rect.y1]
        .iter()
        .all(|v| v.is_finite() && v.fract() == 0.0)
        && rect.x1 >= rect.x0
        && rect.y1 >= rect.y0
}

fn image_paint(src: &Surface) -> Option<vello_cpu::Image> {
    let w: u16 = src.width().try_into().ok()?;
    let h: u16 = src.height().try_into().ok()?;
    let mut may_have_opacities = false;
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = src
        .data()
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Some(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn to_cpu_path(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
