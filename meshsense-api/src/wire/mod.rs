mod error;
mod layout;

pub use error::{CodecError, Result};
pub use layout::{FrameReader, FrameWriter};

/// Largest payload the peer link carries in one datagram.
pub const MAX_DATAGRAM_SIZE: usize = 250;
