use std::io::{ErrorKind, Read};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{CodecError, MsgError};
use crate::frame::Frame;

/// Size of the leading frame-count field.
const COUNT_SIZE: usize = 4;

/// Length escape byte: the four following bytes carry the real length.
const LENGTH_ESCAPE: u8 = 0xFF;

/// Frame lengths below this fit in a single length byte.
const SHORT_LENGTH_LIMIT: usize = 0xFF;

// Preallocation cap for decode; the declared count is attacker-controlled.
const MAX_PREALLOC_FRAMES: usize = 4096;

/// The wire size of one frame's length field plus payload.
fn frame_wire_size(len: usize) -> usize {
    if len < SHORT_LENGTH_LIMIT {
        1 + len
    } else {
        5 + len
    }
}

/// Total encoded size of a frame sequence.
pub fn encoded_size<'a, I>(frames: I) -> usize
where
    I: IntoIterator<Item = &'a Frame>,
{
    COUNT_SIZE
        + frames
            .into_iter()
            .map(|frame| frame_wire_size(frame.size()))
            .sum::<usize>()
}

/// Encode an ordered frame sequence into one self-delimiting flat buffer.
///
/// Layout: 4-byte big-endian frame count (zero is valid), then per frame a
/// length field — one byte below 255, the 0xFF escape byte plus a 4-byte
/// big-endian length otherwise — followed by the raw payload bytes.
pub fn encode<'a, I>(frames: I) -> Bytes
where
    I: IntoIterator<Item = &'a Frame>,
    I::IntoIter: ExactSizeIterator + Clone,
{
    let frames = frames.into_iter();
    let mut buf = BytesMut::with_capacity(encoded_size(frames.clone()));

    buf.put_u32(frames.len() as u32);
    for frame in frames {
        let len = frame.size();
        // The length field cannot represent more than u32::MAX bytes.
        assert!(len <= u32::MAX as usize);
        if len < SHORT_LENGTH_LIMIT {
            buf.put_u8(len as u8);
        } else {
            buf.put_u8(LENGTH_ESCAPE);
            buf.put_u32(len as u32);
        }
        buf.put_slice(frame.data());
    }
    buf.freeze()
}

/// Decode a flat buffer back into its frame sequence.
///
/// The buffer must be a complete, self-consistent encoding: exactly the
/// declared number of well-formed length/byte fields and nothing after
/// them. Truncated length fields, lengths overrunning the buffer, and
/// trailing bytes are all rejected without reading out of bounds.
pub fn decode(buf: &[u8]) -> std::result::Result<Vec<Frame>, CodecError> {
    if buf.len() < COUNT_SIZE {
        return Err(CodecError::Truncated);
    }
    let count = u32::from_be_bytes(buf[..COUNT_SIZE].try_into().unwrap()) as usize;
    let mut pos = COUNT_SIZE;
    let mut frames = Vec::with_capacity(count.min(MAX_PREALLOC_FRAMES));

    for _ in 0..count {
        if pos >= buf.len() {
            return Err(CodecError::Truncated);
        }
        let first = buf[pos];
        pos += 1;
        let len = if first == LENGTH_ESCAPE {
            if buf.len() - pos < 4 {
                return Err(CodecError::Truncated);
            }
            let len = u32::from_be_bytes(buf[pos..pos + 4].try_into().unwrap()) as usize;
            pos += 4;
            len
        } else {
            first as usize
        };

        if len > buf.len() - pos {
            return Err(CodecError::LengthOverrun {
                declared: len,
                remaining: buf.len() - pos,
            });
        }
        frames.push(Frame::new(Bytes::copy_from_slice(&buf[pos..pos + len])));
        pos += len;
    }

    if pos != buf.len() {
        return Err(CodecError::TrailingBytes {
            count: buf.len() - pos,
        });
    }
    Ok(frames)
}

/// Read exactly one encoding's worth of bytes off a stream.
///
/// Returns `Ok(None)` at clean EOF before any byte of the frame count; a
/// stream ending anywhere later is a truncated encoding.
pub(crate) fn read_encoded<R: Read>(
    reader: &mut R,
) -> crate::error::Result<Option<Vec<Frame>>> {
    let mut count_buf = [0u8; COUNT_SIZE];
    if !fill_or_eof(reader, &mut count_buf)? {
        return Ok(None);
    }
    let count = u32::from_be_bytes(count_buf) as usize;
    let mut frames = Vec::with_capacity(count.min(MAX_PREALLOC_FRAMES));

    for _ in 0..count {
        let mut length_byte = [0u8; 1];
        read_full(reader, &mut length_byte)?;
        let len = if length_byte[0] == LENGTH_ESCAPE {
            let mut length_buf = [0u8; 4];
            read_full(reader, &mut length_buf)?;
            u32::from_be_bytes(length_buf) as usize
        } else {
            length_byte[0] as usize
        };

        let mut payload = vec![0u8; len];
        read_full(reader, &mut payload)?;
        frames.push(Frame::new(payload));
    }
    Ok(Some(frames))
}

/// Fill `buf` completely, or return `Ok(false)` if the stream was already
/// at EOF before the first byte.
fn fill_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> crate::error::Result<bool> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(MsgError::Codec(CodecError::Truncated)),
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(MsgError::Io(err)),
        }
    }
    Ok(true)
}

fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> crate::error::Result<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
            Err(MsgError::Codec(CodecError::Truncated))
        }
        Err(err) => Err(MsgError::Io(err)),
    }
}
