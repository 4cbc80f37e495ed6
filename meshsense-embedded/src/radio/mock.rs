use alloc::vec::Vec;

use meshsense_api::PeerAddress;

use super::{PeerLink, ScanEntry, WifiRadio};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct MockRadio {
    pub networks: Vec<ScanEntry>,
    pub channel: u8,
    pub promiscuous: bool,
    pub promiscuous_toggles: usize,
    pub reject_channel: bool,
}

impl WifiRadio for MockRadio {
    fn scan(&mut self) -> Result<Vec<ScanEntry>> {
        Ok(self.networks.clone())
    }

    fn channel(&self) -> u8 {
        self.channel
    }

    fn set_promiscuous(&mut self, enabled: bool) -> Result<()> {
        self.promiscuous = enabled;
        self.promiscuous_toggles += 1;
        Ok(())
    }

    fn set_channel(&mut self, channel: u8) -> Result<()> {
        if self.reject_channel || !self.promiscuous {
            return Err(Error::Radio);
        }
        self.channel = channel;
        Ok(())
    }
}

/// Link that records every frame and can be told to refuse peers or sends.
#[derive(Debug, Default)]
pub struct MockLink {
    pub peers: Vec<PeerAddress>,
    pub sent: Vec<(PeerAddress, Vec<u8>)>,
    pub refuse_peers: Vec<PeerAddress>,
    pub refuse_sends: Vec<PeerAddress>,
}

impl PeerLink for MockLink {
    fn add_peer(&mut self, address: PeerAddress) -> Result<()> {
        if self.refuse_peers.contains(&address) {
            return Err(Error::Radio);
        }
        self.peers.push(address);
        Ok(())
    }

    fn send(&mut self, address: PeerAddress, payload: &[u8]) -> Result<()> {
        if self.refuse_sends.contains(&address) || !self.peers.contains(&address) {
            return Err(Error::Radio);
        }
        self.sent.push((address, payload.to_vec()));
        Ok(())
    }
}
