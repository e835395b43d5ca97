use crate::render::canvas::Canvas;
use crate::render::surface::Surface;

/// Largest side the raster backend addresses.
pub const MAX_SURFACE_DIM: u32 = u16::MAX as u32;

/// Factory for offscreen surfaces paired with a drawing context.
///
/// Handlers never allocate surfaces directly; they ask the pipeline's provider, which keeps the
/// engine testable with a counting or recording implementation.
pub trait SurfaceProvider: Send + Sync + 'static {
    /// Allocate a fully transparent `width x height` surface and bind a [`Canvas`] to it.
    fn create_surface(&self, width: u32, height: u32) -> Canvas;
}

/// Default in-memory provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuSurfaceProvider;

impl SurfaceProvider for CpuSurfaceProvider {
    fn create_surface(&self, width: u32, height: u32) -> Canvas {
        Canvas::new(Surface::transparent(
            width.min(MAX_SURFACE_DIM),
            height.min(MAX_SURFACE_DIM),
        ))
    }
}
