/// Errors from the flat wire encoding.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The buffer ends inside a length field or before the frame count.
    #[error("truncated encoding")]
    Truncated,

    /// A declared frame length exceeds the remaining buffer.
    #[error("declared length {declared} exceeds remaining {remaining} bytes")]
    LengthOverrun { declared: usize, remaining: usize },

    /// Bytes remain after the declared frame count was consumed.
    #[error("{count} trailing bytes after final frame")]
    TrailingBytes { count: usize },
}

/// Errors that can occur in frame and message operations.
#[derive(Debug, thiserror::Error)]
pub enum MsgError {
    /// Wire encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] mpwire_transport::TransportError),

    /// An I/O error occurred while persisting or loading a message.
    #[error("message I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MsgError>;
