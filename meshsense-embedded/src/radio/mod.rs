mod channel;
#[cfg(test)]
pub(crate) mod mock;
mod registry;

pub use channel::*;
pub use registry::*;

use alloc::string::String;
use alloc::vec::Vec;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use meshsense_api::{MAX_DATAGRAM_SIZE, PeerAddress};

use crate::error::Result;

/// Number of radio events buffered between two loop iterations.
pub const INBOX_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub ssid: String,
    pub channel: u8,
}

impl ScanEntry {
    pub fn new(ssid: &str, channel: u8) -> Self {
        Self {
            ssid: String::from(ssid),
            channel,
        }
    }
}

/// Station-mode controls of the Wi-Fi radio the peer link rides on.
pub trait WifiRadio {
    fn scan(&mut self) -> Result<Vec<ScanEntry>>;

    fn channel(&self) -> u8;

    fn set_promiscuous(&mut self, enabled: bool) -> Result<()>;

    fn set_channel(&mut self, channel: u8) -> Result<()>;
}

/// Connectionless datagram link between known peers.
///
/// `send` only reports whether the frame was queued; delivery is reported
/// later through [`RadioEvent::SendCompleted`].
pub trait PeerLink {
    fn add_peer(&mut self, address: PeerAddress) -> Result<()>;

    fn send(&mut self, address: PeerAddress, payload: &[u8]) -> Result<()>;
}

impl<T: PeerLink + ?Sized> PeerLink for &mut T {
    fn add_peer(&mut self, address: PeerAddress) -> Result<()> {
        (**self).add_peer(address)
    }

    fn send(&mut self, address: PeerAddress, payload: &[u8]) -> Result<()> {
        (**self).send(address, payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioEvent {
    Received {
        sender: PeerAddress,
        payload: heapless::Vec<u8, MAX_DATAGRAM_SIZE>,
    },
    SendCompleted {
        destination: PeerAddress,
        delivered: bool,
    },
}

impl RadioEvent {
    /// `None` when the payload exceeds the largest frame the link carries.
    pub fn received(sender: PeerAddress, payload: &[u8]) -> Option<Self> {
        let payload = heapless::Vec::from_slice(payload).ok()?;
        Some(Self::Received { sender, payload })
    }
}

/// Queue filled by radio callbacks and drained by the node loop.
pub type Inbox = Channel<CriticalSectionRawMutex, RadioEvent, INBOX_CAPACITY>;

/// Queues an event from callback context. Never blocks; a full inbox drops it.
pub fn post_event(inbox: &Inbox, event: RadioEvent) -> bool {
    match inbox.try_send(event) {
        Ok(()) => true,
        Err(_) => {
            log::warn!("Radio inbox full, dropping event");
            false
        }
    }
}
