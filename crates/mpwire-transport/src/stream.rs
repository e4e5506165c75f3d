use std::io::{ErrorKind, Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::FrameTransport;

/// Per-frame header: flags (1) + payload length (4, big-endian) = 5 bytes.
pub const FRAME_HEADER_SIZE: usize = 5;

/// Flags bit marking that another frame of the same message follows.
const FLAG_MORE: u8 = 0x01;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Configuration for a stream-backed transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// Frame transport over any `Read + Write` stream.
///
/// Each frame travels as a 5-byte header — one flags byte (bit 0 = MORE)
/// and a 4-byte big-endian payload length — followed by the payload.
/// Handles partial reads internally; callers always get complete frames.
///
/// Clean EOF at a frame boundary surfaces as interruption (`Ok(None)` from
/// `recv_frame`); EOF in the middle of a frame is an error.
pub struct StreamTransport<T> {
    inner: T,
    buf: BytesMut,
    config: TransportConfig,
}

impl<T: Read + Write> StreamTransport<T> {
    /// Create a stream transport with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, TransportConfig::default())
    }

    /// Create a stream transport with explicit configuration.
    pub fn with_config(inner: T, config: TransportConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the transport and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Try to decode one complete frame from the internal buffer.
    fn decode_buffered(&mut self) -> Result<Option<(Bytes, bool)>> {
        if self.buf.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        let flags = self.buf[0];
        let payload_len = u32::from_be_bytes(self.buf[1..5].try_into().unwrap()) as usize;

        if payload_len > self.config.max_payload_size {
            return Err(TransportError::FrameTooLarge {
                size: payload_len,
                max: self.config.max_payload_size,
            });
        }

        if self.buf.len() < FRAME_HEADER_SIZE + payload_len {
            return Ok(None);
        }

        self.buf.advance(FRAME_HEADER_SIZE);
        let payload = self.buf.split_to(payload_len).freeze();
        Ok(Some((payload, flags & FLAG_MORE != 0)))
    }

    fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl<T: Read + Write> FrameTransport for StreamTransport<T> {
    fn send_frame(&mut self, payload: Bytes, more: bool) -> Result<()> {
        if payload.len() > self.config.max_payload_size {
            return Err(TransportError::FrameTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        let mut wire = BytesMut::with_capacity(FRAME_HEADER_SIZE + payload.len());
        wire.put_u8(if more { FLAG_MORE } else { 0 });
        wire.put_u32(payload.len() as u32);
        wire.put_slice(&payload);
        trace!(size = payload.len(), more, "writing frame to stream");

        let mut offset = 0usize;
        while offset < wire.len() {
            match self.inner.write(&wire[offset..]) {
                Ok(0) => return Err(TransportError::Disconnected),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        self.flush()
    }

    fn recv_frame(&mut self) -> Result<Option<(Bytes, bool)>> {
        loop {
            if let Some(frame) = self.decode_buffered()? {
                return Ok(Some(frame));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    // Clean shutdown between frames.
                    return Ok(None);
                }
                return Err(TransportError::Disconnected);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }
}
