use std::sync::mpsc::{channel, Receiver, Sender};

use bytes::Bytes;
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::FrameTransport;

/// A blocking in-process pipe pair.
///
/// `PairTransport::pair()` returns two connected endpoints. Frames sent on
/// one side arrive on the other in order. Dropping an endpoint interrupts
/// the peer: its next `recv_frame` returns `Ok(None)` once the in-flight
/// frames are drained, and its sends fail with
/// [`TransportError::Disconnected`].
///
/// Endpoints are `Send`, so the usual arrangement is one endpoint per
/// thread.
pub struct PairTransport {
    tx: Sender<(Bytes, bool)>,
    rx: Receiver<(Bytes, bool)>,
}

impl PairTransport {
    /// Create a connected pair of endpoints.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = channel();
        let (tx_b, rx_a) = channel();
        (
            Self { tx: tx_a, rx: rx_a },
            Self { tx: tx_b, rx: rx_b },
        )
    }
}

impl FrameTransport for PairTransport {
    fn send_frame(&mut self, payload: Bytes, more: bool) -> Result<()> {
        trace!(size = payload.len(), more, "sending frame on pair");
        self.tx
            .send((payload, more))
            .map_err(|_| TransportError::Disconnected)
    }

    fn recv_frame(&mut self) -> Result<Option<(Bytes, bool)>> {
        match self.rx.recv() {
            Ok((payload, more)) => {
                trace!(size = payload.len(), more, "received frame on pair");
                Ok(Some((payload, more)))
            }
            // Peer endpoint dropped: interruption, not an error.
            Err(_) => Ok(None),
        }
    }
}

impl std::fmt::Debug for PairTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairTransport").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_arrive_in_order() {
        let (mut left, mut right) = PairTransport::pair();

        left.send_frame(Bytes::from_static(b"one"), true).unwrap();
        left.send_frame(Bytes::from_static(b"two"), false).unwrap();

        let (payload, more) = right.recv_frame().unwrap().unwrap();
        assert_eq!(payload.as_ref(), b"one");
        assert!(more);

        let (payload, more) = right.recv_frame().unwrap().unwrap();
        assert_eq!(payload.as_ref(), b"two");
        assert!(!more);
    }

    #[test]
    fn both_directions() {
        let (mut left, mut right) = PairTransport::pair();

        left.send_frame(Bytes::from_static(b"ping"), false).unwrap();
        let (payload, _) = right.recv_frame().unwrap().unwrap();
        assert_eq!(payload.as_ref(), b"ping");

        right.send_frame(Bytes::from_static(b"pong"), false).unwrap();
        let (payload, _) = left.recv_frame().unwrap().unwrap();
        assert_eq!(payload.as_ref(), b"pong");
    }

    #[test]
    fn drop_interrupts_receiver() {
        let (left, mut right) = PairTransport::pair();
        drop(left);
        assert!(right.recv_frame().unwrap().is_none());
    }

    #[test]
    fn in_flight_frames_drain_before_interrupt() {
        let (mut left, mut right) = PairTransport::pair();
        left.send_frame(Bytes::from_static(b"last"), false).unwrap();
        drop(left);

        let (payload, _) = right.recv_frame().unwrap().unwrap();
        assert_eq!(payload.as_ref(), b"last");
        assert!(right.recv_frame().unwrap().is_none());
    }

    #[test]
    fn send_after_peer_drop_fails() {
        let (mut left, right) = PairTransport::pair();
        drop(right);
        let err = left
            .send_frame(Bytes::from_static(b"void"), false)
            .unwrap_err();
        assert!(matches!(err, TransportError::Disconnected));
    }

    #[test]
    fn blocking_recv_across_threads() {
        let (mut left, mut right) = PairTransport::pair();

        let receiver = std::thread::spawn(move || {
            let (payload, more) = right.recv_frame().unwrap().unwrap();
            assert_eq!(payload.as_ref(), b"delayed");
            assert!(!more);
        });

        left.send_frame(Bytes::from_static(b"delayed"), false)
            .unwrap();
        receiver.join().unwrap();
    }
}
