use thiserror::Error;

/// Fatal problems found while bringing the runtime up.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("viewport must be non-empty, got {width}x{height}")]
    ZeroViewport { width: u32, height: u32 },

    #[error("no drawable surface: {0}")]
    MissingSurface(String),

    #[error("rendering backend unavailable: {0}")]
    Backend(String),

    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}
