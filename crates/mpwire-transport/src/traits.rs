use bytes::Bytes;

use crate::error::Result;

/// A connected endpoint that moves individual frames.
///
/// This is the entire contract the message layer places on a socket layer:
/// send one payload with a continuation flag, receive one payload with its
/// continuation flag. How endpoints are created, addressed, or secured is
/// the implementor's business.
///
/// Only one logical multi-frame send may be in flight per endpoint at a
/// time; interleaving two senders' frames on one endpoint corrupts framing.
/// The `&mut self` receivers make that a compile-time property within a
/// single process.
pub trait FrameTransport {
    /// Transmit one frame.
    ///
    /// `more` marks that another frame of the same logical message follows.
    fn send_frame(&mut self, payload: Bytes, more: bool) -> Result<()>;

    /// Receive one frame, blocking until it arrives.
    ///
    /// Returns `Ok(None)` when the transport is interrupted (the peer
    /// endpoint shut down before a frame arrived). The transport imposes no
    /// timeout; bounded waiting is the implementor's responsibility.
    fn recv_frame(&mut self) -> Result<Option<(Bytes, bool)>>;
}
