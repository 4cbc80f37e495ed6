use super::WifiRadio;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelAlignment {
    AlreadyAligned(u8),
    Switched { from: u8, to: u8 },
}

impl ChannelAlignment {
    pub fn channel(&self) -> u8 {
        match self {
            Self::AlreadyAligned(channel) => *channel,
            Self::Switched { to, .. } => *to,
        }
    }
}

/// Moves the radio onto the channel a named network is operating on, so the
/// peer link shares the channel of the infrastructure Wi-Fi.
#[derive(Debug, Clone)]
pub struct ChannelSynchronizer<'a> {
    network_name: &'a str,
}

impl<'a> ChannelSynchronizer<'a> {
    pub fn new(network_name: &'a str) -> Self {
        Self { network_name }
    }

    pub fn network_name(&self) -> &str {
        self.network_name
    }

    /// Channel the named network was seen on; entries reporting channel 0 are
    /// ignored.
    pub fn find_channel<R: WifiRadio>(&self, radio: &mut R) -> Result<u8> {
        radio
            .scan()?
            .into_iter()
            .find(|entry| entry.ssid == self.network_name && entry.channel != 0)
            .map(|entry| entry.channel)
            .ok_or(Error::ChannelNotFound)
    }

    pub fn synchronize<R: WifiRadio>(&self, radio: &mut R) -> Result<ChannelAlignment> {
        let target = self.find_channel(radio)?;
        let current = radio.channel();

        if current == target {
            log::debug!("Already on channel {} of {}", target, self.network_name);
            return Ok(ChannelAlignment::AlreadyAligned(target));
        }

        // Switching channels is only allowed while promiscuous.
        radio.set_promiscuous(true)?;
        let switched = radio.set_channel(target);
        let restored = radio.set_promiscuous(false);
        switched?;
        restored?;

        log::info!(
            "Switched radio from channel {} to {} ({})",
            current,
            target,
            self.network_name
        );

        Ok(ChannelAlignment::Switched {
            from: current,
            to: target,
        })
    }
}
