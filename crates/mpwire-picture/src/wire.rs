use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use mpwire_msg::{Frame, Message};
use mpwire_transport::FrameTransport;

use crate::error::{PictureError, Result};
use crate::field::{Field, FieldKind};

/// Transmit a field sequence as one multi-frame message.
///
/// Each field becomes one frame: numbers in their fixed-width big-endian
/// form, strings and blobs raw (the frame boundary carries their length),
/// handles as 8 bytes, submessages in their flat encoding. The whole
/// message goes out atomically.
pub fn send_picture<T: FrameTransport>(
    fields: impl Into<Vec<Field>>,
    transport: &mut T,
) -> Result<()> {
    let fields = fields.into();
    let mut message = Message::new();
    trace!(fields = fields.len(), "sending picture");
    for field in fields {
        message.append(Frame::new(field_to_frame(field)?));
    }
    message.send(transport)?;
    Ok(())
}

/// Receive one message and decode one frame per expected kind.
///
/// Returns `Ok(None)` if the transport is interrupted. Missing trailing
/// fields default to zero/empty; a message without even the first field
/// fails with [`PictureError::ShortMessage`]. Surplus frames beyond the
/// requested kinds are discarded.
pub fn recv_picture<T: FrameTransport>(
    kinds: &[FieldKind],
    transport: &mut T,
) -> Result<Option<Vec<Field>>> {
    let Some(mut message) = Message::recv(transport)? else {
        return Ok(None);
    };

    let mut fields = Vec::with_capacity(kinds.len());
    for (index, kind) in kinds.iter().enumerate() {
        match message.pop() {
            Some(frame) => fields.push(field_from_frame(&frame, index, kind)?),
            None if index == 0 => return Err(PictureError::ShortMessage),
            None => fields.push(kind.default_value()),
        }
    }
    Ok(Some(fields))
}

fn field_to_frame(field: Field) -> Result<Bytes> {
    Ok(match field {
        Field::Int32(value) => Bytes::copy_from_slice(&value.to_be_bytes()),
        Field::UInt8(value) => Bytes::copy_from_slice(&[value]),
        Field::UInt16(value) => Bytes::copy_from_slice(&value.to_be_bytes()),
        Field::UInt32(value) => Bytes::copy_from_slice(&value.to_be_bytes()),
        Field::UInt64(value) => Bytes::copy_from_slice(&value.to_be_bytes()),
        Field::ShortStr(text) => {
            if text.len() > u8::MAX as usize {
                return Err(PictureError::StringTooLong { len: text.len() });
            }
            Bytes::from(text.into_bytes())
        }
        Field::LongStr(text) => Bytes::from(text.into_bytes()),
        Field::Blob(bytes) | Field::SizedBlob(bytes) => bytes,
        Field::Handle(token) => {
            let mut buf = BytesMut::with_capacity(8);
            buf.put_u64(token as u64);
            buf.freeze()
        }
        Field::Msg(message) => message.encode(),
    })
}

fn field_from_frame(frame: &Frame, index: usize, kind: &FieldKind) -> Result<Field> {
    let malformed = || PictureError::MalformedField {
        index,
        kind: kind.name(),
    };
    let data = frame.data();

    Ok(match kind {
        FieldKind::Int32 => {
            let bytes: [u8; 4] = data.try_into().map_err(|_| malformed())?;
            Field::Int32(i32::from_be_bytes(bytes))
        }
        FieldKind::UInt8 => {
            let bytes: [u8; 1] = data.try_into().map_err(|_| malformed())?;
            Field::UInt8(bytes[0])
        }
        FieldKind::UInt16 => {
            let bytes: [u8; 2] = data.try_into().map_err(|_| malformed())?;
            Field::UInt16(u16::from_be_bytes(bytes))
        }
        FieldKind::UInt32 => {
            let bytes: [u8; 4] = data.try_into().map_err(|_| malformed())?;
            Field::UInt32(u32::from_be_bytes(bytes))
        }
        FieldKind::UInt64 => {
            let bytes: [u8; 8] = data.try_into().map_err(|_| malformed())?;
            Field::UInt64(u64::from_be_bytes(bytes))
        }
        FieldKind::ShortStr => {
            if data.len() > u8::MAX as usize {
                return Err(malformed());
            }
            Field::ShortStr(String::from_utf8(data.to_vec())?)
        }
        FieldKind::LongStr => Field::LongStr(String::from_utf8(data.to_vec())?),
        FieldKind::Blob(expected) => {
            if data.len() != *expected {
                return Err(malformed());
            }
            Field::Blob(Bytes::copy_from_slice(data))
        }
        FieldKind::SizedBlob => Field::SizedBlob(Bytes::copy_from_slice(data)),
        FieldKind::Handle => {
            let bytes: [u8; 8] = data.try_into().map_err(|_| malformed())?;
            Field::Handle(u64::from_be_bytes(bytes) as usize)
        }
        FieldKind::Msg => Field::Msg(Message::decode(data).map_err(|_| malformed())?),
    })
}
