//! Typed-field marshalling ("picture" protocol) over multi-part messages
//! and flat buffers.
//!
//! A picture is a sequence of typed field values — integers, strings,
//! blobs, opaque handles, embedded submessages — marshalled over one of two
//! carriers that share field semantics:
//!
//! - **frames**: each field becomes one frame of a message sent atomically
//!   ([`send_picture`]/[`recv_picture`])
//! - **flat buffer**: all fields concatenate into one fixed-layout buffer
//!   ([`pack`]/[`unpack`])
//!
//! The field set is a closed enum rather than a runtime-interpreted format
//! string; the receive side names the expected kinds and gets one value per
//! kind back. Short input is tolerated: fields beyond the first that are
//! missing default to zero/empty, so a status-only message decodes safely
//! against a longer picture.

pub mod error;
pub mod field;
pub mod pack;
pub mod wire;

pub use error::{PictureError, Result};
pub use field::{Field, FieldKind, Picture};
pub use pack::{pack, unpack};
pub use wire::{recv_picture, send_picture};
