use bytes::{BufMut, Bytes, BytesMut};

use mpwire_msg::Message;

use crate::error::{PictureError, Result};
use crate::field::{Field, FieldKind};

/// Marshal a field sequence into one flat buffer.
///
/// Fixed layout, all integers big-endian: numbers at their declared width,
/// short strings as 1-byte length + bytes, long strings and sized blobs as
/// 4-byte length + bytes, raw blobs with no header, handles as 8 bytes,
/// submessages as 4-byte length + their flat encoding.
pub fn pack(fields: &[Field]) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    for field in fields {
        match field {
            Field::Int32(value) => buf.put_i32(*value),
            Field::UInt8(value) => buf.put_u8(*value),
            Field::UInt16(value) => buf.put_u16(*value),
            Field::UInt32(value) => buf.put_u32(*value),
            Field::UInt64(value) => buf.put_u64(*value),
            Field::ShortStr(text) => {
                if text.len() > u8::MAX as usize {
                    return Err(PictureError::StringTooLong { len: text.len() });
                }
                buf.put_u8(text.len() as u8);
                buf.put_slice(text.as_bytes());
            }
            Field::LongStr(text) => {
                buf.put_u32(text.len() as u32);
                buf.put_slice(text.as_bytes());
            }
            Field::Blob(bytes) => buf.put_slice(bytes),
            Field::SizedBlob(bytes) => {
                buf.put_u32(bytes.len() as u32);
                buf.put_slice(bytes);
            }
            Field::Handle(token) => buf.put_u64(*token as u64),
            Field::Msg(message) => {
                let encoded = message.encode();
                buf.put_u32(encoded.len() as u32);
                buf.put_slice(&encoded);
            }
        }
    }
    Ok(buf.freeze())
}

/// Unmarshal a flat buffer against an expected kind sequence.
///
/// Total over the kinds: on success there is exactly one [`Field`] per
/// requested kind. A buffer that runs out cleanly between fields defaults
/// every remaining field to zero/empty, unless the very first field is
/// already missing, which fails with [`PictureError::ShortMessage`]. A
/// buffer that runs out inside a field is malformed.
pub fn unpack(kinds: &[FieldKind], buf: &[u8]) -> Result<Vec<Field>> {
    let mut pos = 0usize;
    let mut fields = Vec::with_capacity(kinds.len());

    for (index, kind) in kinds.iter().enumerate() {
        if pos == buf.len() {
            if index == 0 {
                return Err(PictureError::ShortMessage);
            }
            fields.push(kind.default_value());
            continue;
        }
        fields.push(read_field(buf, &mut pos, index, kind)?);
    }
    Ok(fields)
}

fn read_field(
    buf: &[u8],
    pos: &mut usize,
    index: usize,
    kind: &FieldKind,
) -> Result<Field> {
    Ok(match kind {
        FieldKind::Int32 => {
            let bytes = take(buf, pos, 4, index, kind)?;
            Field::Int32(i32::from_be_bytes(bytes.try_into().unwrap()))
        }
        FieldKind::UInt8 => {
            let bytes = take(buf, pos, 1, index, kind)?;
            Field::UInt8(bytes[0])
        }
        FieldKind::UInt16 => {
            let bytes = take(buf, pos, 2, index, kind)?;
            Field::UInt16(u16::from_be_bytes(bytes.try_into().unwrap()))
        }
        FieldKind::UInt32 => {
            let bytes = take(buf, pos, 4, index, kind)?;
            Field::UInt32(u32::from_be_bytes(bytes.try_into().unwrap()))
        }
        FieldKind::UInt64 => {
            let bytes = take(buf, pos, 8, index, kind)?;
            Field::UInt64(u64::from_be_bytes(bytes.try_into().unwrap()))
        }
        FieldKind::ShortStr => {
            let len = take(buf, pos, 1, index, kind)?[0] as usize;
            let bytes = take(buf, pos, len, index, kind)?;
            Field::ShortStr(String::from_utf8(bytes.to_vec())?)
        }
        FieldKind::LongStr => {
            let len = take_u32(buf, pos, index, kind)? as usize;
            let bytes = take(buf, pos, len, index, kind)?;
            Field::LongStr(String::from_utf8(bytes.to_vec())?)
        }
        FieldKind::Blob(expected) => {
            let bytes = take(buf, pos, *expected, index, kind)?;
            Field::Blob(Bytes::copy_from_slice(bytes))
        }
        FieldKind::SizedBlob => {
            let len = take_u32(buf, pos, index, kind)? as usize;
            let bytes = take(buf, pos, len, index, kind)?;
            Field::SizedBlob(Bytes::copy_from_slice(bytes))
        }
        FieldKind::Handle => {
            let bytes = take(buf, pos, 8, index, kind)?;
            Field::Handle(u64::from_be_bytes(bytes.try_into().unwrap()) as usize)
        }
        FieldKind::Msg => {
            let len = take_u32(buf, pos, index, kind)? as usize;
            let bytes = take(buf, pos, len, index, kind)?;
            Field::Msg(Message::decode(bytes)?)
        }
    })
}

/// Consume `n` bytes, or fail the field without reading out of bounds.
fn take<'a>(
    buf: &'a [u8],
    pos: &mut usize,
    n: usize,
    index: usize,
    kind: &FieldKind,
) -> Result<&'a [u8]> {
    if buf.len() - *pos < n {
        return Err(PictureError::MalformedField {
            index,
            kind: kind.name(),
        });
    }
    let bytes = &buf[*pos..*pos + n];
    *pos += n;
    Ok(bytes)
}

fn take_u32(buf: &[u8], pos: &mut usize, index: usize, kind: &FieldKind) -> Result<u32> {
    let bytes = take(buf, pos, 4, index, kind)?;
    Ok(u32::from_be_bytes(bytes.try_into().unwrap()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Picture;

    #[test]
    fn roundtrip_every_kind() {
        let mut sub = Message::new();
        sub.append_str("nested");

        let fields = Picture::new()
            .int32(-12345)
            .uint8(0xAB)
            .uint16(0xBEEF)
            .uint32(0xDEADBEEF)
            .uint64(0x0102030405060708)
            .short_str("short")
            .long_str("a longer string value")
            .blob(&b"rawblob"[..])
            .sized_blob(&b"sizedblob"[..])
            .handle(0x1000)
            .msg(sub.clone())
            .into_fields();

        let kinds = [
            FieldKind::Int32,
            FieldKind::UInt8,
            FieldKind::UInt16,
            FieldKind::UInt32,
            FieldKind::UInt64,
            FieldKind::ShortStr,
            FieldKind::LongStr,
            FieldKind::Blob(7),
            FieldKind::SizedBlob,
            FieldKind::Handle,
            FieldKind::Msg,
        ];

        let packed = pack(&fields).unwrap();
        let unpacked = unpack(&kinds, &packed).unwrap();
        assert_eq!(unpacked, fields);
        assert_eq!(unpacked[10].as_msg(), Some(&sub));
    }

    #[test]
    fn layout_is_big_endian_and_length_prefixed() {
        let packed = pack(&[Field::Int32(-12345), Field::ShortStr("ab".into())]).unwrap();
        // -12345 = 0xFFFFCFC7, then length 2 and the text.
        assert_eq!(
            packed.as_ref(),
            &[0xFF, 0xFF, 0xCF, 0xC7, 0x02, b'a', b'b']
        );
    }

    #[test]
    fn short_string_limit_enforced() {
        let oversized = "x".repeat(256);
        let err = pack(&[Field::ShortStr(oversized)]).unwrap_err();
        assert!(matches!(err, PictureError::StringTooLong { len: 256 }));

        let at_limit = "x".repeat(255);
        assert!(pack(&[Field::ShortStr(at_limit)]).is_ok());
    }

    #[test]
    fn truncated_input_defaults_later_fields() {
        let packed = pack(&[Field::Int32(-12345)]).unwrap();
        let kinds = [
            FieldKind::Int32,
            FieldKind::LongStr,
            FieldKind::SizedBlob,
            FieldKind::Handle,
        ];

        let fields = unpack(&kinds, &packed).unwrap();
        assert_eq!(fields[0], Field::Int32(-12345));
        assert_eq!(fields[1], Field::LongStr(String::new()));
        assert_eq!(fields[2], Field::SizedBlob(Bytes::new()));
        assert_eq!(fields[3], Field::Handle(0));
    }

    #[test]
    fn missing_first_field_fails() {
        let err = unpack(&[FieldKind::Int32], &[]).unwrap_err();
        assert!(matches!(err, PictureError::ShortMessage));
    }

    #[test]
    fn partial_field_is_malformed() {
        // Two of the four bytes an Int32 needs.
        let err = unpack(&[FieldKind::Int32], &[0x00, 0x01]).unwrap_err();
        assert!(matches!(
            err,
            PictureError::MalformedField {
                index: 0,
                kind: "int32"
            }
        ));
    }

    #[test]
    fn overrunning_declared_length_is_malformed() {
        // SizedBlob declaring 100 bytes with 2 present.
        let buf = [0u8, 0, 0, 100, 0xAA, 0xBB];
        let err = unpack(&[FieldKind::SizedBlob], &buf).unwrap_err();
        assert!(matches!(
            err,
            PictureError::MalformedField {
                index: 0,
                kind: "sized-blob"
            }
        ));
    }

    #[test]
    fn raw_blob_needs_its_out_of_band_length() {
        let packed = pack(&[Field::Blob(Bytes::from_static(b"12345678"))]).unwrap();
        assert_eq!(packed.len(), 8); // no header at all

        let fields = unpack(&[FieldKind::Blob(8)], &packed).unwrap();
        assert_eq!(fields[0].as_bytes(), Some(&b"12345678"[..]));
    }

    #[test]
    fn invalid_utf8_string_rejected() {
        let buf = [0x02u8, 0xFF, 0xFE];
        let err = unpack(&[FieldKind::ShortStr], &buf).unwrap_err();
        assert!(matches!(err, PictureError::Utf8(_)));
    }
}
