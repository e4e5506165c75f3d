//! Frame transport abstraction for multi-part wire messaging.
//!
//! A transport moves individual frames (a byte payload plus a continuation
//! flag) between two endpoints. Everything above this layer, messages and
//! typed marshalling alike, is built purely on the two operations of
//! [`FrameTransport`].
//!
//! Two implementations ship with the crate:
//! - [`PairTransport`] — a blocking in-process pipe pair, the same-process
//!   carrier and the workspace's test vehicle
//! - [`StreamTransport`] — frame transport over any `Read + Write` stream

pub mod error;
pub mod pair;
pub mod stream;
pub mod traits;

pub use error::{Result, TransportError};
pub use pair::PairTransport;
pub use stream::{StreamTransport, TransportConfig, DEFAULT_MAX_PAYLOAD, FRAME_HEADER_SIZE};
pub use traits::FrameTransport;
