/// Convenience alias for results returned by this crate.
pub type RetouchResult<T> = Result<T, RetouchError>;

/// Top-level error type.
#[derive(thiserror::Error, Debug)]
pub enum RetouchError {
    /// The source image could not be resolved or decoded.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// The result surface could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// An order list could not be parsed.
    #[error("order error: {0}")]
    Order(String),

    /// A background task went away before settling.
    #[error("task error: {0}")]
    Task(String),

    /// Anything else, with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RetouchError {
    /// Build an [`RetouchError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build an [`RetouchError::Order`].
    pub fn order(msg: impl Into<String>) -> Self {
        Self::Order(msg.into())
    }

    /// Build an [`RetouchError::Task`].
    pub fn task(msg: impl Into<String>) -> Self {
        Self::Task(msg.into())
    }

    /// Return the load failure if this error is one.
    pub fn as_load(&self) -> Option<&LoadError> {
        match self {
            Self::Load(e) => Some(e),
            _ => None,
        }
    }
}

const URI_DISPLAY_MAX: usize = 64;

/// Failure to resolve or decode a source image.
///
/// Cloneable so a single load failure can be handed to every caller awaiting the pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: {reason}", display_uri(.uri))]
pub struct LoadError {
    /// Identifier that failed to load.
    pub uri: String,
    /// Human-readable cause.
    pub reason: String,
}

impl LoadError {
    /// Build a load error for `uri`.
    pub fn new(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Build a load error from an `anyhow` chain, keeping every context layer.
    pub fn from_chain(uri: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::new(uri, format!("{err:#}"))
    }
}

// Data URIs can be megabytes long.
fn display_uri(uri: &str) -> String {
    if uri.chars().count() <= URI_DISPLAY_MAX {
        return uri.to_owned();
    }
    let head: String = uri.chars().take(URI_DISPLAY_MAX).collect();
    format!("{head}...")
}
