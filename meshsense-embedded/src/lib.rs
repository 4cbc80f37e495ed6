#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod aggregator;
pub mod control;
pub mod error;
pub mod node;
pub mod radio;
pub mod sensor;
pub mod time;

pub use aggregator::{CommandDispatcher, DecisionEngine, Directive, FusedState};
pub use error::*;
pub use node::{AggregatorNode, SensorRuntime, bootstrap};
pub use radio::{Inbox, PeerLink, PeerRegistry, RadioEvent, WifiRadio};
pub use sensor::{Lifecycle, SensorNode};
pub use time::EmbeddedTimeProvider;
