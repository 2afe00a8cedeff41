use thiserror::Error;

pub type RelayResult<T> = Result<T, TransportError>;

/// Failures on the relay side. None of these stop the frame loop; the
/// affected message is dropped.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("relay peer disconnected")]
    Disconnected,

    #[error("send queue full, message dropped")]
    Backlogged,

    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unrecognized message: {0}")]
    Unrecognized(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
