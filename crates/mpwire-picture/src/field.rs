use bytes::Bytes;

use mpwire_msg::Message;

/// One typed field value of a picture.
///
/// The closed set of variants replaces the format letters of the source
/// protocol: `i` → [`Int32`](Field::Int32), `1`/`2`/`4`/`8` → the unsigned
/// widths, `s`/`S` → the string variants, `b`/`z` → the blob variants,
/// `p` → [`Handle`](Field::Handle), `m` → [`Msg`](Field::Msg).
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 8-bit integer.
    UInt8(u8),
    /// Unsigned 16-bit integer.
    UInt16(u16),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// String under 256 bytes; travels with a 1-byte length in flat form.
    ShortStr(String),
    /// String of any length; travels with a 4-byte length in flat form.
    LongStr(String),
    /// Binary blob whose length the caller supplies out of band; travels
    /// raw, with no header.
    Blob(Bytes),
    /// Binary blob whose length travels with the value.
    SizedBlob(Bytes),
    /// Opaque same-process token. Never meaningful across process
    /// boundaries; pass handles only over an in-process transport.
    Handle(usize),
    /// Embedded submessage, nested in its flat wire encoding.
    Msg(Message),
}

impl Field {
    /// The kind this value belongs to, for error reporting.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Field::Int32(_) => "int32",
            Field::UInt8(_) => "uint8",
            Field::UInt16(_) => "uint16",
            Field::UInt32(_) => "uint32",
            Field::UInt64(_) => "uint64",
            Field::ShortStr(_) => "short-string",
            Field::LongStr(_) => "long-string",
            Field::Blob(_) => "blob",
            Field::SizedBlob(_) => "sized-blob",
            Field::Handle(_) => "handle",
            Field::Msg(_) => "msg",
        }
    }

    /// The integer value, if this is an `Int32` field.
    pub fn as_int32(&self) -> Option<i32> {
        match self {
            Field::Int32(value) => Some(*value),
            _ => None,
        }
    }

    /// The unsigned value widened to 64 bits, for any unsigned variant.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Field::UInt8(value) => Some(u64::from(*value)),
            Field::UInt16(value) => Some(u64::from(*value)),
            Field::UInt32(value) => Some(u64::from(*value)),
            Field::UInt64(value) => Some(*value),
            _ => None,
        }
    }

    /// The text of either string variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::ShortStr(text) | Field::LongStr(text) => Some(text),
            _ => None,
        }
    }

    /// The bytes of either blob variant.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Field::Blob(bytes) | Field::SizedBlob(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The token of a `Handle` field.
    pub fn as_handle(&self) -> Option<usize> {
        match self {
            Field::Handle(token) => Some(*token),
            _ => None,
        }
    }

    /// The embedded message of a `Msg` field.
    pub fn as_msg(&self) -> Option<&Message> {
        match self {
            Field::Msg(message) => Some(message),
            _ => None,
        }
    }
}

/// The receive-side description of one expected field.
///
/// Mirrors [`Field`] variant for variant. `Blob` carries the expected byte
/// length, which is how the raw blob's out-of-band length reaches the
/// unmarshaller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int32,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    ShortStr,
    LongStr,
    Blob(usize),
    SizedBlob,
    Handle,
    Msg,
}

impl FieldKind {
    /// Kind name for error reporting.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Int32 => "int32",
            FieldKind::UInt8 => "uint8",
            FieldKind::UInt16 => "uint16",
            FieldKind::UInt32 => "uint32",
            FieldKind::UInt64 => "uint64",
            FieldKind::ShortStr => "short-string",
            FieldKind::LongStr => "long-string",
            FieldKind::Blob(_) => "blob",
            FieldKind::SizedBlob => "sized-blob",
            FieldKind::Handle => "handle",
            FieldKind::Msg => "msg",
        }
    }

    /// The zero/empty value this kind defaults to when truncated away.
    pub fn default_value(&self) -> Field {
        match self {
            FieldKind::Int32 => Field::Int32(0),
            FieldKind::UInt8 => Field::UInt8(0),
            FieldKind::UInt16 => Field::UInt16(0),
            FieldKind::UInt32 => Field::UInt32(0),
            FieldKind::UInt64 => Field::UInt64(0),
            FieldKind::ShortStr => Field::ShortStr(String::new()),
            FieldKind::LongStr => Field::LongStr(String::new()),
            FieldKind::Blob(_) => Field::Blob(Bytes::new()),
            FieldKind::SizedBlob => Field::SizedBlob(Bytes::new()),
            FieldKind::Handle => Field::Handle(0),
            FieldKind::Msg => Field::Msg(Message::new()),
        }
    }
}

/// Compact builder for a field sequence.
///
/// ```
/// use mpwire_picture::Picture;
///
/// let fields = Picture::new()
///     .int32(-1)
///     .short_str("status")
///     .into_fields();
/// assert_eq!(fields.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Picture {
    fields: Vec<Field>,
}

impl Picture {
    /// Start an empty picture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a signed 32-bit integer field.
    pub fn int32(mut self, value: i32) -> Self {
        self.fields.push(Field::Int32(value));
        self
    }

    /// Append an unsigned 8-bit integer field.
    pub fn uint8(mut self, value: u8) -> Self {
        self.fields.push(Field::UInt8(value));
        self
    }

    /// Append an unsigned 16-bit integer field.
    pub fn uint16(mut self, value: u16) -> Self {
        self.fields.push(Field::UInt16(value));
        self
    }

    /// Append an unsigned 32-bit integer field.
    pub fn uint32(mut self, value: u32) -> Self {
        self.fields.push(Field::UInt32(value));
        self
    }

    /// Append an unsigned 64-bit integer field.
    pub fn uint64(mut self, value: u64) -> Self {
        self.fields.push(Field::UInt64(value));
        self
    }

    /// Append a short string field (< 256 bytes on the flat carrier).
    pub fn short_str(mut self, text: impl Into<String>) -> Self {
        self.fields.push(Field::ShortStr(text.into()));
        self
    }

    /// Append a long string field.
    pub fn long_str(mut self, text: impl Into<String>) -> Self {
        self.fields.push(Field::LongStr(text.into()));
        self
    }

    /// Append a raw blob field.
    pub fn blob(mut self, bytes: impl Into<Bytes>) -> Self {
        self.fields.push(Field::Blob(bytes.into()));
        self
    }

    /// Append a length-carrying blob field.
    pub fn sized_blob(mut self, bytes: impl Into<Bytes>) -> Self {
        self.fields.push(Field::SizedBlob(bytes.into()));
        self
    }

    /// Append an opaque same-process handle field.
    pub fn handle(mut self, token: usize) -> Self {
        self.fields.push(Field::Handle(token));
        self
    }

    /// Append an embedded submessage field, consuming the message.
    pub fn msg(mut self, message: Message) -> Self {
        self.fields.push(Field::Msg(message));
        self
    }

    /// The built field sequence.
    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }
}

impl From<Picture> for Vec<Field> {
    fn from(picture: Picture) -> Self {
        picture.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_order() {
        let fields = Picture::new()
            .int32(-5)
            .uint64(7)
            .short_str("hello")
            .handle(42)
            .into_fields();

        assert_eq!(fields[0], Field::Int32(-5));
        assert_eq!(fields[1], Field::UInt64(7));
        assert_eq!(fields[2], Field::ShortStr("hello".into()));
        assert_eq!(fields[3], Field::Handle(42));
    }

    #[test]
    fn defaults_are_zero_or_empty() {
        assert_eq!(FieldKind::Int32.default_value(), Field::Int32(0));
        assert_eq!(
            FieldKind::LongStr.default_value(),
            Field::LongStr(String::new())
        );
        assert_eq!(
            FieldKind::SizedBlob.default_value(),
            Field::SizedBlob(Bytes::new())
        );
        assert_eq!(FieldKind::Handle.default_value(), Field::Handle(0));
        assert_eq!(FieldKind::Msg.default_value(), Field::Msg(Message::new()));
    }

    #[test]
    fn accessors_match_variants() {
        assert_eq!(Field::Int32(-1).as_int32(), Some(-1));
        assert_eq!(Field::UInt16(9).as_uint(), Some(9));
        assert_eq!(Field::ShortStr("s".into()).as_str(), Some("s"));
        assert_eq!(
            Field::Blob(Bytes::from_static(b"b")).as_bytes(),
            Some(&b"b"[..])
        );
        assert_eq!(Field::Handle(3).as_handle(), Some(3));
        assert!(Field::Int32(0).as_str().is_none());
    }
}
