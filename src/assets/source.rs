use std::path::{Path, PathBuf};

use anyhow::{Context, bail, ensure};
use base64::{Engine as _, engine::general_purpose};

use crate::assets::decode::{SourceImage, decode_raster, decode_svg, looks_like_svg};
use crate::foundation::error::LoadError;

/// Turns a source identifier into a decoded image.
///
/// Implementations are called on Tokio's blocking pool, so they may do file IO and CPU-heavy
/// decoding directly.
pub trait SourceResolver: Send + Sync + 'static {
    /// Resolve and decode `uri`.
    fn resolve(&self, uri: &str) -> Result<SourceImage, LoadError>;
}

impl<F> SourceResolver for F
where
    F: Fn(&str) -> Result<SourceImage, LoadError> + Send + Sync + 'static,
{
    fn resolve(&self, uri: &str) -> Result<SourceImage, LoadError> {
        self(uri)
    }
}

/// Options for [`UriResolver`].
#[derive(Debug, Clone)]
pub struct ResolverOpts {
    /// Base directory for relative filesystem paths. `None` uses the process working directory.
    pub root: Option<PathBuf>,
    /// Upper bound on the encoded source size.
    pub max_source_bytes: u64,
}

impl Default for ResolverOpts {
    fn default() -> Self {
        Self {
            root: None,
            max_source_bytes: 64 * 1024 * 1024,
        }
    }
}

impl ResolverOpts {
    /// Resolve relative paths against `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Override the source size limit.
    pub fn with_max_source_bytes(mut self, max: u64) -> Self {
        self.max_source_bytes = max;
        self
    }
}

/// Default resolver: `data:` URIs, `file://` URLs and plain filesystem paths.
///
/// Raster payloads are decoded with `image`; SVG payloads are rasterized at their intrinsic size.
#[derive(Debug, Clone, Default)]
pub struct UriResolver {
    opts: ResolverOpts,
}

impl UriResolver {
    /// Create a resolver with the given options.
    pub fn new(opts: ResolverOpts) -> Self {
        Self { opts }
    }

    fn load(&self, uri: &str) -> anyhow::Result<SourceImage> {
        let uri = uri.trim();
        ensure!(!uri.is_empty(), "source identifier is empty");

        if let Some(rest) = strip_scheme(uri, "data:") {
            let (mime, bytes) = parse_data_uri(rest)?;
            self.check_size(bytes.len() as u64)?;
            return decode_bytes(&bytes, mime.as_deref() == Some("image/svg+xml"));
        }
        if let Some(rest) = strip_scheme(uri, "file://") {
            let path = percent_decode(rest.as_bytes())?;
            let path = String::from_utf8(path).context("file url is not valid utf-8")?;
            return self.load_path(Path::new(&path));
        }
        if strip_scheme(uri, "http://").is_some() || strip_scheme(uri, "https://").is_some() {
            bail!("network sources are not supported");
        }
        self.load_path(Path::new(uri))
    }

    fn load_path(&self, path: &Path) -> anyhow::Result<SourceImage> {
        let full = match &self.opts.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        };
        let meta = std::fs::metadata(&full)
            .with_context(|| format!("stat source file '{}'", full.display()))?;
        self.check_size(meta.len())?;
        let bytes = std::fs::read(&full)
            .with_context(|| format!("read source file '{}'", full.display()))?;
        let is_svg = full
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
        decode_bytes(&bytes, is_svg)
    }

    fn check_size(&self, len: u64) -> anyhow::Result<()> {
        ensure!(
            len <= self.opts.max_source_bytes,
            "source is {len} bytes, limit is {}",
            self.opts.max_source_bytes
        );
        Ok(())
    }
}

impl SourceResolver for UriResolver {
    fn resolve(&self, uri: &str) -> Result<SourceImage, LoadError> {
        self.load(uri).map_err(|e| LoadError::from_chain(uri, &e))
    }
}

fn decode_bytes(bytes: &[u8], svg_hint: bool) -> anyhow::Result<SourceImage> {
    if svg_hint || looks_like_svg(bytes) {
        decode_svg(bytes)
    } else {
        decode_raster(bytes)
    }
}

fn strip_scheme<'a>(uri: &'a str, scheme: &str) -> Option<&'a str> {
    let head = uri.get(..scheme.len())?;
    head.eq_ignore_ascii_case(scheme)
        .then(|| &uri[scheme.len()..])
}

/// Split `[<mime>][;param]*[;base64],<payload>` into its mime type and decoded payload.
pub(crate) fn parse_data_uri(rest: &str) -> anyhow::Result<(Option<String>, Vec<u8>)> {
    let (meta, payload) = rest
        .split_once(',')
        .context("data uri is missing the ',' separator")?;

    let mut params = meta.split(';');
    let mime = params
        .next()
        .map(|m| m.trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty());
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let compact: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        general_purpose::STANDARD
            .decode(compact.as_bytes())
            .context("data uri base64 payload")?
    } else {
        percent_decode(payload.as_bytes())?
    };
    Ok((mime, bytes))
}

fn percent_decode(input: &[u8]) -> anyhow::Result<Vec<u8>> {
    fn hex(b: u8) -> Option<u8> {
        (b as char).to_digit(16).map(|d| d as u8)
    }

    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i] == b'%' {
            let (Some(hi), Some(lo)) = (
                input.get(i + 1).copied().and_then(hex),
                input.get(i + 2).copied().and_then(hex),
            ) else {
                bail!("invalid percent escape at byte {i}");
            };
            out.push(hi << 4 | lo);
            i += 3;
        } else {
            out.push(input[i]);
            i += 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
