use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::assets::source::{SourceResolver, UriResolver};
use crate::foundation::core::DeviceScale;
use crate::foundation::error::{LoadError, RetouchError, RetouchResult};
use crate::order::ImageOrder;
use crate::order::ops::{HandlerCtx, apply_order};
use crate::render::encode::EncodeFormat;
use crate::render::provider::{CpuSurfaceProvider, SurfaceProvider};
use crate::render::surface::Surface;
use crate::session::task::{TaskCompleter, TaskHandle, task_pair};

/// Collaborators and knobs for a [`Pipeline`].
#[derive(Clone)]
pub struct PipelineOpts {
    /// Factor applied to order geometry that asks for device pixels.
    pub device_scale: DeviceScale,
    /// Format used by [`Pipeline::get_uri`].
    pub encode: EncodeFormat,
    /// Allocates every surface handlers draw into.
    pub provider: Arc<dyn SurfaceProvider>,
    /// Turns the source identifier into pixels.
    pub resolver: Arc<dyn SourceResolver>,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            device_scale: DeviceScale::ONE,
            encode: EncodeFormat::Png,
            provider: Arc::new(CpuSurfaceProvider),
            resolver: Arc::new(UriResolver::default()),
        }
    }
}

impl PipelineOpts {
    /// Defaults with `RETOUCH_DEVICE_SCALE` and `RETOUCH_JPEG_QUALITY` applied when set and valid.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(scale) = std::env::var("RETOUCH_DEVICE_SCALE")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .and_then(DeviceScale::new)
        {
            opts.device_scale = scale;
        }
        if let Some(quality) = std::env::var("RETOUCH_JPEG_QUALITY")
            .ok()
            .and_then(|v| v.trim().parse::<u8>().ok())
            .filter(|q| (1..=100).contains(q))
        {
            opts.encode = EncodeFormat::Jpeg { quality };
        }
        opts
    }

    /// Override the device scale.
    pub fn with_device_scale(mut self, scale: DeviceScale) -> Self {
        self.device_scale = scale;
        self
    }

    /// Override the output format.
    pub fn with_encode(mut self, encode: EncodeFormat) -> Self {
        self.encode = encode;
        self
    }

    /// Override the surface provider.
    pub fn with_provider(mut self, provider: impl SurfaceProvider) -> Self {
        self.provider = Arc::new(provider);
        self
    }

    /// Override the source resolver.
    pub fn with_resolver(mut self, resolver: impl SourceResolver) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }
}

impl std::fmt::Debug for PipelineOpts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOpts")
            .field("device_scale", &self.device_scale)
            .field("encode", &self.encode)
            .finish_non_exhaustive()
    }
}

struct Control {
    queue: VecDeque<ImageOrder>,
    exec: Option<TaskHandle>,
    draining: bool,
}

struct Shared {
    source: String,
    opts: PipelineOpts,
    load: TaskHandle,
    control: Mutex<Control>,
    current: Mutex<Option<Arc<Surface>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An image source plus an ordered queue of transforms.
///
/// Loading starts on construction. Orders run when [`Pipeline::exec`] is called, strictly in the
/// order they were added; orders added while a drain is running are picked up by that drain.
/// Both constructors spawn onto the current Tokio runtime and panic outside one.
///
/// ```no_run
/// # async fn demo() -> retouch::RetouchResult<()> {
/// use retouch::{ImageOrder, Pipeline, RoundOptions};
///
/// let pipeline = Pipeline::new("photo.png");
/// pipeline
///     .add_order(ImageOrder::Round(RoundOptions {
///         radius: 12.0,
///         use_device_pixel: true,
///     }))
///     .exec();
/// let _uri = pipeline.get_uri().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Pipeline {
    shared: Arc<Shared>,
}

impl Pipeline {
    /// Start loading `source` with default options.
    pub fn new(source: impl Into<String>) -> Self {
        Self::with_opts(source, PipelineOpts::default())
    }

    /// Start loading `source` with explicit collaborators.
    pub fn with_opts(source: impl Into<String>, opts: PipelineOpts) -> Self {
        Self::spawn(source.into(), opts)
    }

    #[tracing::instrument(skip_all, fields(source_len = source.len()))]
    fn spawn(source: String, opts: PipelineOpts) -> Self {
        let (done, load) = task_pair();
        let shared = Arc::new(Shared {
            source,
            opts,
            load,
            control: Mutex::new(Control {
                queue: VecDeque::new(),
                exec: None,
                draining: false,
            }),
            current: Mutex::new(None),
        });
        tokio::spawn(load_source(Arc::clone(&shared), done));
        Self { shared }
    }

    /// Append one order.
    pub fn add_order(&self, order: ImageOrder) -> &Self {
        lock(&self.shared.control).queue.push_back(order);
        self
    }

    /// Append several orders, keeping their order.
    pub fn add_orders(&self, orders: impl IntoIterator<Item = ImageOrder>) -> &Self {
        lock(&self.shared.control).queue.extend(orders);
        self
    }

    /// Start draining the queue in the background.
    ///
    /// While a drain is running this joins it. Once it has finished, a new call starts a fresh
    /// drain over whatever has been queued since.
    pub fn exec(&self) -> &Self {
        let mut control = lock(&self.shared.control);
        if control.draining {
            debug!(
                pending = control.queue.len(),
                "exec joined the running drain"
            );
            return self;
        }
        let (done, handle) = task_pair();
        control.draining = true;
        control.exec = Some(handle);
        drop(control);

        tokio::spawn(drain(Arc::clone(&self.shared), done));
        self
    }

    /// The result as a `data:` URI, or the untouched source if [`Pipeline::exec`] was never called.
    pub async fn get_uri(&self) -> RetouchResult<String> {
        let Some(exec) = self.exec_handle() else {
            return Ok(self.shared.source.clone());
        };
        let surface = self.settled_current(exec).await?;
        surface.to_data_uri(self.shared.opts.encode)
    }

    /// The result surface, or the freshly loaded one if [`Pipeline::exec`] was never called.
    pub async fn get_canvas(&self) -> RetouchResult<Arc<Surface>> {
        let task = self
            .exec_handle()
            .unwrap_or_else(|| self.shared.load.clone());
        self.settled_current(task).await
    }

    /// The identifier the pipeline was built from.
    pub fn original_source(&self) -> &str {
        &self.shared.source
    }

    /// Orders queued and not yet dispatched.
    pub fn pending_orders(&self) -> usize {
        lock(&self.shared.control).queue.len()
    }

    /// `true` while a drain is running.
    pub fn is_executing(&self) -> bool {
        lock(&self.shared.control).draining
    }

    fn exec_handle(&self) -> Option<TaskHandle> {
        lock(&self.shared.control).exec.clone()
    }

    // A drain holds the surface outside the lock while an order runs. A reader landing in that
    // window waits for the newest drain and reads again.
    async fn settled_current(&self, mut task: TaskHandle) -> RetouchResult<Arc<Surface>> {
        loop {
            task.wait().await?;
            if let Some(surface) = lock(&self.shared.current).clone() {
                return Ok(surface);
            }
            task = self
                .exec_handle()
                .ok_or_else(|| RetouchError::task("no surface after a successful load"))?;
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("source_len", &self.shared.source.len())
            .field("opts", &self.shared.opts)
            .field("pending_orders", &self.pending_orders())
            .field("executing", &self.is_executing())
            .finish()
    }
}

#[tracing::instrument(skip_all)]
async fn load_source(shared: Arc<Shared>, done: TaskCompleter) {
    match decode_source(&shared).await {
        Ok(surface) => {
            debug!(
                width = surface.width(),
                height = surface.height(),
                "source loaded"
            );
            *lock(&shared.current) = Some(Arc::new(surface));
            done.settle(Ok(()));
        }
        Err(err) => {
            warn!(error = %err, "source failed to load");
            done.settle(Err(err));
        }
    }
}

async fn decode_source(shared: &Shared) -> Result<Surface, LoadError> {
    let resolver = Arc::clone(&shared.opts.resolver);
    let uri = shared.source.clone();
    let image = tokio::task::spawn_blocking(move || resolver.resolve(&uri))
        .await
        .map_err(|e| LoadError::new(&shared.source, format!("resolver task failed: {e}")))??;

    let (w, h) = (image.width, image.height);
    let decoded = Surface::from_source(image).ok_or_else(|| {
        LoadError::new(&shared.source, format!("pixel buffer does not match {w}x{h}"))
    })?;
    let mut canvas = shared.opts.provider.create_surface(w, h);
    canvas.draw_surface(&decoded, 0.0, 0.0);
    Ok(canvas.into_surface())
}

#[tracing::instrument(skip_all)]
async fn drain(shared: Arc<Shared>, done: TaskCompleter) {
    if let Err(err) = shared.load.wait().await {
        lock(&shared.control).draining = false;
        let err = match err {
            RetouchError::Load(e) => e,
            other => LoadError::new(&shared.source, other.to_string()),
        };
        done.settle(Err(err));
        return;
    }

    let ctx = HandlerCtx {
        provider: shared.opts.provider.as_ref(),
        scale: shared.opts.device_scale,
    };
    let mut applied = 0usize;
    loop {
        let order = {
            let mut control = lock(&shared.control);
            match control.queue.pop_front() {
                Some(order) => order,
                None => {
                    control.draining = false;
                    break;
                }
            }
        };

        // Handlers run with the lock released.
        let Some(current) = lock(&shared.current).take() else {
            continue;
        };
        let next = apply_order(current, &order, &ctx);
        debug!(
            kind = order.kind(),
            width = next.width(),
            height = next.height(),
            "order applied"
        );
        *lock(&shared.current) = Some(next);
        applied += 1;
        tokio::task::yield_now().await;
    }

    debug!(applied, "drain finished");
    done.settle(Ok(()));
}
