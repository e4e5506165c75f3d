/// Errors that can occur while marshalling typed fields.
#[derive(Debug, thiserror::Error)]
pub enum PictureError {
    /// Not even the first requested field could be read.
    #[error("message too short: first field missing")]
    ShortMessage,

    /// A field's wire form does not match its declared kind.
    #[error("malformed {kind} field at position {index}")]
    MalformedField { index: usize, kind: &'static str },

    /// A short string exceeds its 255-byte limit.
    #[error("short string too long ({len} bytes, max 255)")]
    StringTooLong { len: usize },

    /// A string field holds invalid UTF-8.
    #[error("string field is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// An embedded submessage failed to decode.
    #[error("codec error: {0}")]
    Codec(#[from] mpwire_msg::CodecError),

    /// Message-level failure.
    #[error("message error: {0}")]
    Msg(#[from] mpwire_msg::MsgError),

    /// Transport-level failure.
    #[error("transport error: {0}")]
    Transport(#[from] mpwire_transport::TransportError),
}

pub type Result<T> = std::result::Result<T, PictureError>;
