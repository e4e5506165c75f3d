//! Multi-part message container with a length-prefixed wire codec.
//!
//! A [`Frame`] is the smallest transmissible unit: an owned byte payload
//! with a continuation flag. A [`Message`] is an ordered sequence of frames
//! handled atomically — built up frame by frame, then sent, persisted, or
//! embedded inside another message as a single opaque frame.
//!
//! The wire codec turns a message into one self-delimiting flat buffer:
//! a 4-byte frame count, then per frame a length (one byte below 255,
//! 0xFF-escaped 4-byte big-endian otherwise) and the raw bytes.

pub mod codec;
pub mod error;
pub mod frame;
pub mod message;

pub use codec::{decode, encode, encoded_size};
pub use error::{CodecError, MsgError, Result};
pub use frame::{flags, Frame};
pub use message::{Frames, Message};
