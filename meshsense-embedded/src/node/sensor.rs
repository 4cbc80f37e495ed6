use meshsense_api::{Command, Role, StatusDatagram};

use crate::error::{Error, Result};
use crate::radio::{Inbox, PeerLink, PeerRegistry, RadioEvent};
use crate::sensor::{Lifecycle, SensorNode};

/// Runs one sensor state machine against the peer link.
///
/// Radio callbacks only fill the [`Inbox`]; `step` drains it and then polls
/// the sensor once. After a halt the runtime neither polls nor reacts to
/// events.
pub struct SensorRuntime<N, L>
where
    N: SensorNode,
    L: PeerLink,
{
    node: N,
    link: L,
    registry: PeerRegistry,
}

impl<N, L> SensorRuntime<N, L>
where
    N: SensorNode,
    L: PeerLink,
{
    pub fn new(node: N, link: L, registry: PeerRegistry) -> Self {
        Self {
            node,
            link,
            registry,
        }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn role(&self) -> Role {
        self.node.role()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.node.lifecycle()
    }

    pub fn step(&mut self, inbox: &Inbox, now_ms: u64) -> Lifecycle {
        while let Ok(event) = inbox.try_receive() {
            self.handle_event(event, now_ms);
        }

        if !self.lifecycle().is_halted() {
            if let Some(report) = self.node.poll(now_ms) {
                self.send_report(&report);
            }
        }

        self.lifecycle()
    }

    pub fn handle_event(&mut self, event: RadioEvent, now_ms: u64) {
        if self.lifecycle().is_halted() {
            return;
        }

        match event {
            RadioEvent::Received { sender, payload } => {
                if self.registry.role_of(sender) != Some(Role::Aggregator) {
                    log::warn!("{}", Error::UnknownSender(sender));
                    return;
                }

                let command = match Command::decode(&payload) {
                    Ok(command) => command,
                    Err(err) => {
                        log::warn!("{}", Error::from(err));
                        return;
                    }
                };

                log::info!("{} received '{}'", self.role(), command);

                if let Some(report) = self.node.apply_command(command, now_ms) {
                    self.send_report(&report);
                }

                if self.lifecycle().is_halted() {
                    log::info!("{} halted", self.role());
                }
            }
            RadioEvent::SendCompleted { delivered, .. } => {
                if delivered {
                    log::debug!("Last packet send status: delivery success");
                } else {
                    log::warn!("Last packet send status: delivery fail");
                }
            }
        }
    }

    fn send_report(&mut self, report: &StatusDatagram) {
        match self.try_send_report(report) {
            Ok(()) => log::debug!("Sent {}", report),
            Err(err) => log::warn!("Report not sent: {}", err),
        }
    }

    fn try_send_report(&mut self, report: &StatusDatagram) -> Result<()> {
        let address = self
            .registry
            .address_of(Role::Aggregator)
            .ok_or(Error::PeerNotRegistered(Role::Aggregator))?;
        let payload = report.encode()?;

        self.link
            .send(address, &payload)
            .map_err(|_| Error::SendFailure(Role::Aggregator))
    }
}
