//! Multi-part message containers, wire codec, and typed-field marshalling.
//!
//! mpwire moves ordered sequences of binary frames (atomically over a
//! frame transport, flattened into self-delimiting buffers, or embedded
//! inside each other as submessages) and marshals heterogeneous typed
//! values over both carriers.
//!
//! # Crate Structure
//!
//! - [`transport`] — Frame transport abstraction (in-process pair, streams)
//! - [`msg`] — Frame and Message containers with the flat wire codec
//! - [`picture`] — Typed-field marshalling over frames or flat buffers

/// Re-export transport types.
pub mod transport {
    pub use mpwire_transport::*;
}

/// Re-export frame and message types.
pub mod msg {
    pub use mpwire_msg::*;
}

/// Re-export picture marshalling types.
pub mod picture {
    pub use mpwire_picture::*;
}
