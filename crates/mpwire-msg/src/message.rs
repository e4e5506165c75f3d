use std::collections::VecDeque;
use std::io::{Read, Write};

use bytes::Bytes;
use tracing::trace;

use mpwire_transport::FrameTransport;

use crate::codec;
use crate::error::{CodecError, Result};
use crate::frame::Frame;

/// An ordered, owned sequence of frames handled atomically.
///
/// Order is transmission and storage order. Frames enter by ownership
/// transfer (`append`, `prepend`, `push`) and leave the same way (`pop`,
/// `send`). A whole message can be embedded inside another as one opaque
/// frame (`append_msg`/`pop_msg`), flattened to a self-delimiting buffer
/// (`encode`/`decode`), persisted (`save`/`load`), or transmitted
/// atomically over a [`FrameTransport`] (`send`/`recv`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    frames: VecDeque<Frame>,
}

impl Message {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames.
    pub fn size(&self) -> usize {
        self.frames.len()
    }

    /// True if the message holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Sum of all frame payload lengths.
    pub fn content_size(&self) -> usize {
        self.frames.iter().map(Frame::size).sum()
    }

    /// Add a frame to the front of the message.
    pub fn prepend(&mut self, frame: Frame) {
        self.frames.push_front(frame);
    }

    /// Add a frame to the end of the message.
    pub fn append(&mut self, frame: Frame) {
        self.frames.push_back(frame);
    }

    /// Wrap raw bytes as a new frame appended to the end.
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        self.append(Frame::new(Bytes::copy_from_slice(bytes)));
    }

    /// Wrap text as a new frame appended to the end.
    pub fn append_str(&mut self, text: &str) {
        self.append_bytes(text.as_bytes());
    }

    /// Add a frame to the front of the message.
    pub fn push(&mut self, frame: Frame) {
        self.prepend(frame);
    }

    /// Remove and return the front frame, or `None` on an empty message.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    /// Wrap text as a new frame pushed to the front.
    pub fn push_str(&mut self, text: &str) {
        self.push(Frame::new(Bytes::copy_from_slice(text.as_bytes())));
    }

    /// Remove the front frame and return its payload as text.
    ///
    /// The frame is consumed either way; a non-UTF-8 payload yields `None`.
    pub fn pop_str(&mut self) -> Option<String> {
        let frame = self.pop()?;
        String::from_utf8(frame.data().to_vec()).ok()
    }

    /// Serialize a whole message into one opaque frame appended to the end.
    ///
    /// The submessage is consumed; it round-trips through [`Message::pop_msg`].
    pub fn append_msg(&mut self, submessage: Message) {
        self.append(Frame::new(submessage.encode()));
    }

    /// Remove the front frame and decode it as an embedded message.
    ///
    /// The frame is consumed either way. A frame whose bytes are not a
    /// complete, self-consistent encoding yields `None`, so plain-data
    /// frames can be probed safely without disturbing the rest of the
    /// message.
    pub fn pop_msg(&mut self) -> Option<Message> {
        let frame = self.pop()?;
        Message::decode(frame.data()).ok()
    }

    /// The front frame, without removing it.
    pub fn first(&self) -> Option<&Frame> {
        self.frames.front()
    }

    /// The back frame, without removing it.
    pub fn last(&self) -> Option<&Frame> {
        self.frames.back()
    }

    /// Non-destructive front-to-back traversal.
    ///
    /// Independent iterators can traverse the same message concurrently.
    pub fn iter(&self) -> Frames<'_> {
        Frames {
            inner: self.frames.iter(),
        }
    }

    /// Delete every frame whose content matches the given frame, O(n).
    pub fn remove(&mut self, frame: &Frame) {
        self.frames.retain(|candidate| candidate != frame);
    }

    /// Flatten the message into one self-delimiting buffer.
    ///
    /// An empty message encodes validly (a lone zero frame count).
    pub fn encode(&self) -> Bytes {
        codec::encode(self.frames.iter())
    }

    /// Rebuild a message from a flat buffer produced by [`Message::encode`].
    pub fn decode(buf: &[u8]) -> std::result::Result<Message, CodecError> {
        Ok(Message {
            frames: codec::decode(buf)?.into(),
        })
    }

    /// Transmit the whole message atomically.
    ///
    /// Frames go out in order with the continuation flag set on all but the
    /// last. The message is consumed regardless of outcome; a zero-frame
    /// message transmits nothing and succeeds.
    pub fn send<T: FrameTransport>(self, transport: &mut T) -> Result<()> {
        let last = self.frames.len().saturating_sub(1);
        trace!(frames = self.frames.len(), "sending message");
        for (index, frame) in self.frames.into_iter().enumerate() {
            transport.send_frame(frame.into_payload(), index < last)?;
        }
        Ok(())
    }

    /// Receive one whole message.
    ///
    /// Loops until a frame without the continuation flag arrives. Returns
    /// `Ok(None)` if the transport is interrupted, discarding any partial
    /// frames; the result is all-or-nothing.
    pub fn recv<T: FrameTransport>(transport: &mut T) -> Result<Option<Message>> {
        let mut message = Message::new();
        loop {
            match transport.recv_frame()? {
                None => return Ok(None),
                Some((payload, more)) => {
                    let mut frame = Frame::new(payload);
                    frame.set_more(more);
                    message.append(frame);
                    if !more {
                        trace!(frames = message.size(), "received message");
                        return Ok(Some(message));
                    }
                }
            }
        }
    }

    /// Persist the message in its flat encoding.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.encode())?;
        Ok(())
    }

    /// Read one message back from a stream written by [`Message::save`].
    ///
    /// Returns `Ok(None)` at clean end of stream.
    pub fn load<R: Read>(reader: &mut R) -> Result<Option<Message>> {
        Ok(codec::read_encoded(reader)?.map(|frames| Message {
            frames: frames.into(),
        }))
    }

    /// Construct a single-frame control message carrying one status byte.
    pub fn new_signal(status: u8) -> Message {
        let mut message = Message::new();
        message.append(Frame::new(vec![status]));
        message
    }

    /// Extract the status byte of a signal message.
    ///
    /// Returns `None` unless the message is a single one-byte frame.
    pub fn signal(&self) -> Option<u8> {
        match self.frames.front() {
            Some(frame) if self.frames.len() == 1 && frame.size() == 1 => {
                Some(frame.data()[0])
            }
            _ => None,
        }
    }
}

/// Non-destructive frame traversal over a [`Message`].
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    inner: std::collections::vec_deque::Iter<'a, Frame>,
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a Frame;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Frames<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for Frames<'_> {}

impl<'a> IntoIterator for &'a Message {
    type Item = &'a Frame;
    type IntoIter = Frames<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use mpwire_transport::PairTransport;

    use super::*;

    fn message_of(texts: &[&str]) -> Message {
        let mut message = Message::new();
        for text in texts {
            message.append_str(text);
        }
        message
    }

    #[test]
    fn ten_frames_size_and_content() {
        let mut message = Message::new();
        for i in 0..10 {
            message.append_str(&format!("Frame{i}"));
        }
        assert_eq!(message.size(), 10);
        assert_eq!(message.content_size(), 60);
    }

    #[test]
    fn push_pop_are_front_operations() {
        let mut message = Message::new();
        message.push_str("second");
        message.push_str("first");

        assert_eq!(message.pop_str().as_deref(), Some("first"));
        assert_eq!(message.pop_str().as_deref(), Some("second"));
        assert!(message.pop().is_none());
    }

    #[test]
    fn prepend_append_order() {
        let mut message = Message::new();
        message.append(Frame::new(&b"middle"[..]));
        message.prepend(Frame::new(&b"front"[..]));
        message.append(Frame::new(&b"back"[..]));

        let contents: Vec<&[u8]> = message.iter().map(Frame::data).collect();
        assert_eq!(contents, vec![&b"front"[..], &b"middle"[..], &b"back"[..]]);
    }

    #[test]
    fn cursor_traversal_is_non_destructive() {
        let message = message_of(&["a", "b", "c"]);

        let mut iter = message.iter();
        assert_eq!(iter.next().unwrap(), "a");
        assert_eq!(iter.next().unwrap(), "b");
        assert_eq!(iter.next().unwrap(), "c");
        assert!(iter.next().is_none());

        // Two independent traversals don't interfere.
        let first_pass: Vec<_> = message.iter().collect();
        let second_pass: Vec<_> = message.iter().collect();
        assert_eq!(first_pass, second_pass);

        assert_eq!(message.first().unwrap(), "a");
        assert_eq!(message.last().unwrap(), "c");
        assert_eq!(message.size(), 3);
    }

    #[test]
    fn remove_deletes_matching_frames() {
        let mut message = message_of(&["keep", "drop", "keep", "drop"]);
        message.remove(&Frame::new(&b"drop"[..]));

        assert_eq!(message.size(), 2);
        assert!(message.iter().all(|frame| frame == "keep"));
    }

    #[test]
    fn equality_by_count_and_content() {
        assert_eq!(Message::new(), Message::new());
        assert_eq!(
            message_of(&["One", "Two", "Three"]),
            message_of(&["One", "Two", "Three"])
        );
        assert_ne!(
            message_of(&["One", "Two", "Three"]),
            message_of(&["One", "Two", "One-Hundred"])
        );
        assert_ne!(message_of(&["One"]), message_of(&["One", "Two"]));
    }

    #[test]
    fn deep_copy_is_independent() {
        let original = message_of(&["a", "b"]);
        let mut copy = original.clone();
        copy.pop();

        assert_eq!(original.size(), 2);
        assert_eq!(copy.size(), 1);
    }

    #[test]
    fn empty_message_round_trips_through_codec() {
        let decoded = Message::decode(&Message::new().encode()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn submessage_round_trip() {
        let mut outer = Message::new();
        outer.append_str("plain");

        let inner = message_of(&["nested", "payload"]);
        outer.append_msg(inner.clone());

        // The plain-text frame is not a valid encoding; probing discards it
        // and leaves the rest of the message intact.
        assert!(outer.pop_msg().is_none());
        assert_eq!(outer.size(), 1);

        let recovered = outer.pop_msg().unwrap();
        assert_eq!(recovered, inner);
        assert!(outer.is_empty());
    }

    #[test]
    fn save_and_load() {
        let mut message = Message::new();
        for i in 0..10 {
            message.append_str(&format!("Frame{i}"));
        }

        let mut store = Vec::new();
        message.save(&mut store).unwrap();

        let mut reader = Cursor::new(store);
        let loaded = Message::load(&mut reader).unwrap().unwrap();
        assert_eq!(loaded.size(), 10);
        assert_eq!(loaded.content_size(), 60);
        assert_eq!(loaded, message);

        // Stream exhausted: clean end.
        assert!(Message::load(&mut reader).unwrap().is_none());
    }

    #[test]
    fn save_surfaces_stream_errors() {
        struct BrokenWriter;

        impl Write for BrokenWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let message = message_of(&["doomed"]);
        let err = message.save(&mut BrokenWriter).unwrap_err();
        assert!(matches!(err, crate::error::MsgError::Io(_)));
    }

    #[test]
    fn send_recv_atomic_over_pair() {
        let (mut left, mut right) = PairTransport::pair();

        message_of(&["head", "body", "tail"]).send(&mut left).unwrap();

        let received = Message::recv(&mut right).unwrap().unwrap();
        assert_eq!(received, message_of(&["head", "body", "tail"]));
        // Continuation flags populated from the wire.
        assert!(received.first().unwrap().more());
        assert!(!received.last().unwrap().more());
    }

    #[test]
    fn single_frame_message_terminates_reception() {
        let (mut left, mut right) = PairTransport::pair();
        message_of(&["only"]).send(&mut left).unwrap();

        let received = Message::recv(&mut right).unwrap().unwrap();
        assert_eq!(received.size(), 1);
        assert!(!received.first().unwrap().more());
    }

    #[test]
    fn zero_frame_send_succeeds() {
        let (mut left, right) = PairTransport::pair();
        Message::new().send(&mut left).unwrap();
        drop(right);
    }

    #[test]
    fn recv_none_on_interrupt_discards_partials() {
        let (mut left, mut right) = PairTransport::pair();
        // A dangling MORE frame with no terminator, then disconnect.
        left.send_frame(Bytes::from_static(b"orphan"), true).unwrap();
        drop(left);

        assert!(Message::recv(&mut right).unwrap().is_none());
    }

    #[test]
    fn signal_round_trip() {
        for status in [0u8, 1, 127, 255] {
            let message = Message::new_signal(status);
            assert_eq!(message.size(), 1);
            assert_eq!(message.signal(), Some(status));
        }
    }

    #[test]
    fn signal_rejects_non_signal_shapes() {
        assert_eq!(Message::new().signal(), None);
        assert_eq!(message_of(&["ab"]).signal(), None);
        assert_eq!(message_of(&["a", "b"]).signal(), None);
    }
}
