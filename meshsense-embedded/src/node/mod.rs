mod aggregator;
mod sensor;

pub use aggregator::AggregatorNode;
pub use sensor::SensorRuntime;

use meshsense_api::{PeerAddress, Role};

use crate::radio::{ChannelSynchronizer, PeerLink, PeerRegistry, WifiRadio};

/// Network the aggregator's access point is named after. Sensors align to it.
pub const AGGREGATOR_NETWORK: &str = "ESP32_WS";

/// Startup sequence shared by every node: align the radio channel with
/// `network_name`, then register `peers`.
///
/// A missing network is not fatal; the node stays on its current channel.
pub fn bootstrap<R, L>(
    radio: &mut R,
    link: &mut L,
    network_name: &str,
    peers: &[(PeerAddress, Role)],
) -> PeerRegistry
where
    R: WifiRadio,
    L: PeerLink,
{
    match ChannelSynchronizer::new(network_name).synchronize(radio) {
        Ok(alignment) => log::info!("Radio on channel {}", alignment.channel()),
        Err(err) => log::warn!(
            "{} ({}), staying on channel {}",
            err,
            network_name,
            radio.channel()
        ),
    }

    let mut registry = PeerRegistry::new();
    let reachable = registry.register_all(link, peers);
    log::info!("{} of {} peers registered", reachable, peers.len());

    registry
}

/// Peers a sensor node talks to: only the aggregator.
pub fn aggregator_peer(peers: &[(PeerAddress, Role)]) -> heapless::Vec<(PeerAddress, Role), 1> {
    peers
        .iter()
        .filter(|(_, role)| *role == Role::Aggregator)
        .take(1)
        .copied()
        .collect()
}

/// Peers the aggregator talks to: every sensor.
pub fn sensor_peers(peers: &[(PeerAddress, Role)]) -> heapless::Vec<(PeerAddress, Role), 4> {
    peers
        .iter()
        .filter(|(_, role)| role.is_sensor())
        .take(4)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use meshsense_api::DEFAULT_PEERS;

    use super::*;
    use crate::radio::ScanEntry;
    use crate::radio::mock::{MockLink, MockRadio};

    #[test]
    fn test_bootstrap_aligns_then_registers() {
        let mut radio = MockRadio {
            networks: alloc::vec![ScanEntry::new(AGGREGATOR_NETWORK, 9)],
            channel: 1,
            ..Default::default()
        };
        let mut link = MockLink::default();

        let registry = bootstrap(&mut radio, &mut link, AGGREGATOR_NETWORK, &aggregator_peer(&DEFAULT_PEERS));

        assert_eq!(radio.channel, 9);
        assert_eq!(registry.len(), 1);
        assert!(registry.address_of(Role::Aggregator).is_some());
    }

    #[test]
    fn test_bootstrap_survives_missing_network() {
        let mut radio = MockRadio {
            channel: 4,
            ..Default::default()
        };
        let mut link = MockLink::default();

        let registry = bootstrap(&mut radio, &mut link, "Man2", &sensor_peers(&DEFAULT_PEERS));

        assert_eq!(radio.channel, 4);
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.address_of(Role::Aggregator), None);
    }
}
