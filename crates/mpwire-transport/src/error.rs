/// Errors that can occur in frame transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer endpoint is gone; no further frames can be sent.
    #[error("transport disconnected")]
    Disconnected,

    /// The payload exceeds the configured maximum size.
    #[error("frame payload too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, TransportError>;
