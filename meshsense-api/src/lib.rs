#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod message;
pub mod peer;
pub mod time;
pub mod wire;

pub use message::*;
pub use peer::{DEFAULT_PEERS, PeerAddress, Role};
pub use time::{ManualClock, TimeProvider};
pub use wire::{CodecError, MAX_DATAGRAM_SIZE};
