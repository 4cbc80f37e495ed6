use meshsense_api::PeerAddress;

use crate::aggregator::{CommandDispatcher, DecisionEngine, DeliveryStats, FusedState, Ingested};
use crate::error::Result;
use crate::radio::{Inbox, PeerLink, PeerRegistry, RadioEvent};

/// Aggregator loop: ingests sensor reports, keeps the fused state and sends
/// the commands the fusion rules produce.
pub struct AggregatorNode<L: PeerLink> {
    link: L,
    registry: PeerRegistry,
    engine: DecisionEngine,
    dispatcher: CommandDispatcher,
    rejected: u32,
}

impl<L: PeerLink> AggregatorNode<L> {
    pub fn new(link: L, registry: PeerRegistry) -> Self {
        Self {
            link,
            registry,
            engine: DecisionEngine::new(),
            dispatcher: CommandDispatcher::new(),
            rejected: 0,
        }
    }

    /// Status query surface for the presentation layer.
    pub fn fused_state(&self) -> &FusedState {
        self.engine.state()
    }

    pub fn delivery_stats(&self) -> DeliveryStats {
        self.dispatcher.stats()
    }

    /// Datagrams discarded for an unknown sender or a wrong size.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Drains the inbox. Returns how many events were handled.
    pub fn step(&mut self, inbox: &Inbox) -> usize {
        let mut handled = 0;
        while let Ok(event) = inbox.try_receive() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: RadioEvent) {
        match event {
            RadioEvent::Received { sender, payload } => {
                log::debug!("Data received from {}", sender);
                if let Err(err) = self.ingest(sender, &payload) {
                    self.rejected += 1;
                    log::warn!("Datagram discarded: {}", err);
                }
            }
            RadioEvent::SendCompleted {
                destination,
                delivered,
            } => self
                .dispatcher
                .record_delivery(&self.registry, destination, delivered),
        }
    }

    fn ingest(&mut self, sender: PeerAddress, payload: &[u8]) -> Result<()> {
        let Ingested {
            datagram,
            directive,
            ..
        } = self.engine.ingest(&self.registry, sender, payload)?;

        log::info!("{}", datagram);

        if let Some(directive) = directive {
            log::info!(
                "{} triggers '{}' to {} nodes",
                datagram.role(),
                directive.command(),
                directive.targets().len()
            );
            self.dispatcher
                .dispatch(&mut self.link, &self.registry, &directive);
        }

        Ok(())
    }
}
