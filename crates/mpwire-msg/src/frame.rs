use bytes::Bytes;

use mpwire_transport::FrameTransport;

use crate::error::Result;

/// Send-flag constants for [`Frame::send`].
///
/// Flags combine with bitwise OR: `flags::MORE | flags::REUSE`.
pub mod flags {
    /// Another frame of the same logical message follows.
    pub const MORE: u8 = 0x01;

    /// Hand the frame back after sending instead of consuming it, so the
    /// same instance can be resent without reallocation.
    pub const REUSE: u8 = 0x02;

    /// Check if a specific flag is set.
    #[inline]
    pub fn has_flag(flags: u8, flag: u8) -> bool {
        flags & flag != 0
    }
}

/// The smallest transmissible unit: an owned byte payload with a
/// continuation flag.
///
/// The continuation flag records whether more frames follow in the same
/// logical message. It is set by [`Frame::recv`] from the wire and ignored
/// by equality: two frames are equal iff their payload bytes are equal.
#[derive(Debug, Clone)]
pub struct Frame {
    payload: Bytes,
    more: bool,
}

impl Frame {
    /// Create a frame owning the given bytes.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            more: false,
        }
    }

    /// Create an empty frame.
    pub fn empty() -> Self {
        Self::new(Bytes::new())
    }

    /// Replace the frame's content in place.
    pub fn reset(&mut self, payload: impl Into<Bytes>) {
        self.payload = payload.into();
    }

    /// The payload bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.payload
    }

    /// The payload length in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// True if the payload is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// The continuation flag: more frames follow in this logical message.
    #[inline]
    pub fn more(&self) -> bool {
        self.more
    }

    /// Set the continuation flag.
    pub fn set_more(&mut self, more: bool) {
        self.more = more;
    }

    /// Lowercase hex rendering of the payload.
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(self.payload.len() * 2);
        for byte in self.payload.iter() {
            hex.push_str(&format!("{byte:02x}"));
        }
        hex
    }

    /// Take the payload out of the frame.
    pub(crate) fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Transmit this frame.
    ///
    /// `send_flags` is a bitwise OR of [`flags::MORE`] and [`flags::REUSE`].
    /// The wire continuation bit is driven by `MORE`, not by the frame's own
    /// flag. With `REUSE` the frame is handed back (`Ok(Some(frame))`) for
    /// resending the same instance; without it the frame is consumed and
    /// `Ok(None)` returned.
    pub fn send<T: FrameTransport>(
        self,
        transport: &mut T,
        send_flags: u8,
    ) -> Result<Option<Frame>> {
        let more = flags::has_flag(send_flags, flags::MORE);
        if flags::has_flag(send_flags, flags::REUSE) {
            transport.send_frame(self.payload.clone(), more)?;
            Ok(Some(self))
        } else {
            transport.send_frame(self.payload, more)?;
            Ok(None)
        }
    }

    /// Receive one frame, with its continuation flag populated from the
    /// wire. Returns `Ok(None)` if the transport was interrupted.
    pub fn recv<T: FrameTransport>(transport: &mut T) -> Result<Option<Frame>> {
        Ok(transport
            .recv_frame()?
            .map(|(payload, more)| Frame { payload, more }))
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload
    }
}

impl Eq for Frame {}

impl PartialEq<[u8]> for Frame {
    fn eq(&self, other: &[u8]) -> bool {
        self.payload.as_ref() == other
    }
}

impl PartialEq<&[u8]> for Frame {
    fn eq(&self, other: &&[u8]) -> bool {
        self.payload.as_ref() == *other
    }
}

impl PartialEq<str> for Frame {
    fn eq(&self, other: &str) -> bool {
        self.payload.as_ref() == other.as_bytes()
    }
}

impl PartialEq<&str> for Frame {
    fn eq(&self, other: &&str) -> bool {
        self.payload.as_ref() == other.as_bytes()
    }
}

impl std::fmt::Display for Frame {
    /// Printable payloads render as text, everything else as hex.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match std::str::from_utf8(&self.payload) {
            Ok(text) if !text.chars().any(char::is_control) => f.write_str(text),
            _ => f.write_str(&self.to_hex()),
        }
    }
}
