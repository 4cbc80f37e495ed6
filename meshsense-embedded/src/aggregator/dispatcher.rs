use meshsense_api::{PeerAddress, Role};
use serde::Serialize;

use super::{Directive, MAX_TARGETS};
use crate::error::{Error, Result};
use crate::radio::{PeerLink, PeerRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub role: Role,
    pub result: Result<()>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryStats {
    pub sent: u32,
    pub send_failures: u32,
    pub delivered: u32,
    pub undelivered: u32,
}

/// Sends command tokens to sensor roles. Each target is handled on its own; a
/// failure is logged and never retried.
#[derive(Debug, Default)]
pub struct CommandDispatcher {
    stats: DeliveryStats,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> DeliveryStats {
        self.stats
    }

    pub fn dispatch<L: PeerLink>(
        &mut self,
        link: &mut L,
        registry: &PeerRegistry,
        directive: &Directive,
    ) -> heapless::Vec<DispatchOutcome, MAX_TARGETS> {
        let command = directive.command();
        let payload = command.encode();
        let mut outcomes = heapless::Vec::new();

        for &role in directive.targets() {
            let result = self.send_to(link, registry, role, &payload);

            match &result {
                Ok(()) => log::info!("Command '{}' sent to {}", command, role),
                Err(err) => log::error!("Command '{}' not sent: {}", command, err),
            }

            let recorded = outcomes.push(DispatchOutcome { role, result }).is_ok();
            debug_assert!(recorded, "directive exceeds {} targets", MAX_TARGETS);
        }

        outcomes
    }

    fn send_to<L: PeerLink>(
        &mut self,
        link: &mut L,
        registry: &PeerRegistry,
        role: Role,
        payload: &[u8],
    ) -> Result<()> {
        let address = registry
            .address_of(role)
            .ok_or(Error::PeerNotRegistered(role))?;

        match link.send(address, payload) {
            Ok(()) => {
                self.stats.sent += 1;
                Ok(())
            }
            Err(_) => {
                self.stats.send_failures += 1;
                Err(Error::SendFailure(role))
            }
        }
    }

    /// Records the asynchronous delivery report of an earlier send.
    pub fn record_delivery(&mut self, registry: &PeerRegistry, destination: PeerAddress, delivered: bool) {
        let peer = registry.role_of(destination);

        if delivered {
            self.stats.delivered += 1;
            match peer {
                Some(role) => log::debug!("Delivery success to {}", role),
                None => log::debug!("Delivery success to {}", destination),
            }
        } else {
            self.stats.undelivered += 1;
            match peer {
                Some(role) => log::warn!("Delivery fail to {}", role),
                None => log::warn!("Delivery fail to {}", destination),
            }
        }
    }
}
