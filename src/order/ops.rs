use std::sync::Arc;

use kurbo::Shape;

use crate::foundation::core::{BezPath, DeviceScale, Rect, to_pixel_dim};
use crate::order::{
    BackgroundOptions, ClipOptions, ImageOrder, MarkOptions, RoundOptions, ShadowOptions,
};
use crate::render::canvas::{Canvas, Shadow};
use crate::render::provider::SurfaceProvider;
use crate::render::surface::Surface;

/// Collaborators every handler needs.
pub(crate) struct HandlerCtx<'a> {
    pub(crate) provider: &'a dyn SurfaceProvider,
    pub(crate) scale: DeviceScale,
}

impl HandlerCtx<'_> {
    fn px(&self, value: f64, use_device_pixel: bool) -> f64 {
        self.scale.apply(value, use_device_pixel)
    }
}

/// Apply one order to `current` and return the result.
///
/// Every variant except `mark` renders into a fresh surface from the provider.
pub(crate) fn apply_order(
    current: Arc<Surface>,
    order: &ImageOrder,
    ctx: &HandlerCtx<'_>,
) -> Arc<Surface> {
    match order {
        ImageOrder::Clip(opts) => Arc::new(clip(&current, opts, ctx)),
        ImageOrder::Mark(opts) => mark(current, opts, ctx),
        ImageOrder::Round(opts) => Arc::new(round(&current, opts, ctx)),
        ImageOrder::Shadow(opts) => Arc::new(shadow(&current, opts, ctx)),
        ImageOrder::Background(opts) => Arc::new(background(&current, opts, ctx)),
    }
}

fn clip(current: &Surface, opts: &ClipOptions, ctx: &HandlerCtx<'_>) -> Surface {
    let dp = opts.use_device_pixel;
    let mut canvas = ctx.provider.create_surface(
        to_pixel_dim(ctx.px(opts.width, dp)),
        to_pixel_dim(ctx.px(opts.height, dp)),
    );
    canvas.draw_surface(current, -ctx.px(opts.x, dp), -ctx.px(opts.y, dp));
    canvas.into_surface()
}

// Draws in place; the surface is only copied if a reader still holds the previous result.
fn mark(mut current: Arc<Surface>, opts: &MarkOptions, ctx: &HandlerCtx<'_>) -> Arc<Surface> {
    let dp = opts.use_device_pixel;
    let target = Arc::make_mut(&mut current);
    let mut canvas = Canvas::new(std::mem::replace(target, Surface::transparent(0, 0)));
    canvas.set_font(opts.font_family.as_str(), ctx.px(opts.font_size, dp));
    canvas.set_text_baseline(opts.text_baseline);
    canvas.set_text_align(opts.text_align);
    canvas.set_fill_color(opts.color);
    canvas.fill_text(&opts.text, ctx.px(opts.x, dp), ctx.px(opts.y, dp));
    *target = canvas.into_surface();
    current
}

fn round(current: &Surface, opts: &RoundOptions, ctx: &HandlerCtx<'_>) -> Surface {
    let (w, h) = current.size();
    let (fw, fh) = (f64::from(w), f64::from(h));
    let radius = ctx
        .px(opts.radius, opts.use_device_pixel)
        .max(0.0)
        .min(fw.min(fh) / 2.0);

    let mut canvas = ctx.provider.create_surface(w, h);
    canvas.clip_path(&rounded_rect_path(fw, fh, radius));
    canvas.draw_surface(current, 0.0, 0.0);
    canvas.into_surface()
}

fn rounded_rect_path(w: f64, h: f64, radius: f64) -> BezPath {
    let rr = kurbo::RoundedRect::new(0.0, 0.0, w, h, radius);
    let mut path = BezPath::new();
    for el in rr.path_elements(0.1) {
        path.push(el);
    }
    path
}

fn shadow(current: &Surface, opts: &ShadowOptions, ctx: &HandlerCtx<'_>) -> Surface {
    let dp = opts.use_device_pixel;
    let blur = ctx.px(opts.shadow_blur, dp).max(0.0);
    let (w, h) = current.size();

    let mut canvas = ctx.provider.create_surface(
        to_pixel_dim(f64::from(w) + 2.0 * blur),
        to_pixel_dim(f64::from(h) + 2.0 * blur),
    );
    canvas.set_shadow(Shadow {
        color: opts.shadow_color,
        blur,
        offset_x: ctx.px(opts.shadow_offset_x, dp),
        offset_y: ctx.px(opts.shadow_offset_y, dp),
    });
    canvas.draw_surface(current, blur, blur);
    canvas.into_surface()
}

fn background(current: &Surface, opts: &BackgroundOptions, ctx: &HandlerCtx<'_>) -> Surface {
    let (w, h) = current.size();
    let mut canvas = ctx.provider.create_surface(w, h);
    canvas.set_fill_color(opts.background_color);
    canvas.fill_rect(Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
    canvas.draw_surface(current, 0.0, 0.0);
    canvas.into_surface()
}

#[cfg(test)]
#[path = "../../tests/unit/order/ops.rs"]
mod tests;
