//! Queued raster image edits on a CPU canvas.
//!
//! A [`Pipeline`] loads one source image (a `data:` URI, `file://` URL or path), collects
//! [`ImageOrder`]s and applies them in order when [`Pipeline::exec`] is called: crop, text
//! watermark, rounded corners, drop shadow and background fill. The result is read back as a
//! [`Surface`] or as an encoded `data:` URI.
//!
//! Loading and draining run as Tokio tasks; construct pipelines from inside a runtime.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;
mod order;
mod render;
mod session;

pub use assets::color::Color;
pub use assets::decode::SourceImage;
pub use assets::source::{ResolverOpts, SourceResolver, UriResolver};
pub use foundation::core::{BezPath, DeviceScale, Point, Rect, Rgba8Premul};
pub use foundation::error::{LoadError, RetouchError, RetouchResult};
pub use order::{
    BackgroundOptions, ClipOptions, ImageOrder, MarkOptions, RoundOptions, ShadowOptions,
    parse_orders,
};
pub use render::canvas::{Canvas, Shadow, TextAlign, TextBaseline};
pub use render::encode::EncodeFormat;
pub use render::provider::{CpuSurfaceProvider, MAX_SURFACE_DIM, SurfaceProvider};
pub use render::surface::Surface;
pub use session::pipeline::{Pipeline, PipelineOpts};
