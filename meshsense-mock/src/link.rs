use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use meshsense_api::PeerAddress;
use meshsense_embedded::radio::ScanEntry;
use meshsense_embedded::{Error, PeerLink, RadioEvent, Result, WifiRadio};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::settings::{Loss, Network};

#[derive(Debug, Clone)]
struct Frame {
    seq: u64,
    from: PeerAddress,
    to: PeerAddress,
    channel: u8,
    payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AirStats {
    pub transmitted: u64,
    pub delivered: u64,
    pub lost: u64,
    pub off_channel: u64,
}

#[derive(Debug, Clone, Copy)]
struct Station {
    channel: u8,
    promiscuous: bool,
}

enum LossModel {
    None,
    Every(u64),
    Random { rate: f64, rng: StdRng },
}

impl LossModel {
    fn new(loss: &Loss) -> Self {
        match loss {
            Loss::None => Self::None,
            Loss::Every { n } => Self::Every(*n as u64),
            Loss::Random { rate, seed } => Self::Random {
                rate: *rate,
                rng: match seed {
                    Some(seed) => StdRng::seed_from_u64(*seed),
                    None => StdRng::from_os_rng(),
                },
            },
        }
    }

    fn drops(&mut self, seq: u64) -> bool {
        match self {
            Self::None => false,
            Self::Every(n) => seq % *n == 0,
            Self::Random { rate, rng } => rng.random_bool(*rate),
        }
    }
}

struct AirState {
    networks: Vec<ScanEntry>,
    stations: HashMap<PeerAddress, Station>,
    pending: VecDeque<Frame>,
    loss: LossModel,
    stats: AirStats,
}

/// Shared radio medium. A frame reaches its destination only if both
/// stations sit on the same channel and the loss model lets it through.
#[derive(Clone)]
pub struct SimulatedAir {
    state: Rc<RefCell<AirState>>,
}

impl SimulatedAir {
    pub fn new(network: &Network, loss: &Loss) -> Self {
        let networks = vec![
            ScanEntry::new(&network.upstream_name, network.upstream_channel),
            ScanEntry::new(&network.access_point_name, network.access_point_channel),
        ];

        Self {
            state: Rc::new(RefCell::new(AirState {
                networks,
                stations: HashMap::new(),
                pending: VecDeque::new(),
                loss: LossModel::new(loss),
                stats: AirStats::default(),
            })),
        }
    }

    /// Powers up a station on `channel`. Returns its radio and link halves.
    pub fn attach(&self, address: PeerAddress, channel: u8) -> (AirRadio, AirLink) {
        self.state.borrow_mut().stations.insert(
            address,
            Station {
                channel,
                promiscuous: false,
            },
        );

        let radio = AirRadio {
            address,
            air: self.clone(),
        };
        let link = AirLink {
            address,
            peers: Vec::new(),
            air: self.clone(),
        };
        (radio, link)
    }

    pub fn stats(&self) -> AirStats {
        self.state.borrow().stats
    }

    pub fn channel_of(&self, address: PeerAddress) -> Option<u8> {
        self.state.borrow().stations.get(&address).map(|s| s.channel)
    }

    /// Resolves every queued frame. `post` receives the event and the
    /// station it is meant for.
    pub fn deliver(&self, mut post: impl FnMut(PeerAddress, RadioEvent)) {
        let frames: Vec<Frame> = self.state.borrow_mut().pending.drain(..).collect();

        for frame in frames {
            let delivered = {
                let mut state = self.state.borrow_mut();
                let receiver = state.stations.get(&frame.to).map(|s| s.channel);

                if receiver != Some(frame.channel) {
                    state.stats.off_channel += 1;
                    false
                } else if state.loss.drops(frame.seq) {
                    state.stats.lost += 1;
                    false
                } else {
                    state.stats.delivered += 1;
                    true
                }
            };

            if delivered {
                match RadioEvent::received(frame.from, &frame.payload) {
                    Some(event) => post(frame.to, event),
                    None => tracing::warn!("Oversized frame from {} dropped", frame.from),
                }
            } else {
                tracing::debug!("Frame {} from {} to {} lost", frame.seq, frame.from, frame.to);
            }

            post(
                frame.from,
                RadioEvent::SendCompleted {
                    destination: frame.to,
                    delivered,
                },
            );
        }
    }

    fn transmit(&self, from: PeerAddress, to: PeerAddress, payload: &[u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let channel = state.stations.get(&from).ok_or(Error::Radio)?.channel;

        state.stats.transmitted += 1;
        let seq = state.stats.transmitted;
        state.pending.push_back(Frame {
            seq,
            from,
            to,
            channel,
            payload: payload.to_vec(),
        });
        Ok(())
    }

    fn with_station<T>(&self, address: PeerAddress, f: impl FnOnce(&mut Station) -> T) -> Result<T> {
        let mut state = self.state.borrow_mut();
        state.stations.get_mut(&address).map(f).ok_or(Error::Radio)
    }
}

/// Station-mode controls of one simulated node.
pub struct AirRadio {
    address: PeerAddress,
    air: SimulatedAir,
}

impl WifiRadio for AirRadio {
    fn scan(&mut self) -> Result<Vec<ScanEntry>> {
        Ok(self.air.state.borrow().networks.clone())
    }

    fn channel(&self) -> u8 {
        self.air.channel_of(self.address).unwrap_or(0)
    }

    fn set_promiscuous(&mut self, enabled: bool) -> Result<()> {
        self.air
            .with_station(self.address, |station| station.promiscuous = enabled)
    }

    fn set_channel(&mut self, channel: u8) -> Result<()> {
        self.air.with_station(self.address, |station| {
            if station.promiscuous {
                station.channel = channel;
                Ok(())
            } else {
                Err(Error::Radio)
            }
        })?
    }
}

/// Peer link of one simulated node.
pub struct AirLink {
    address: PeerAddress,
    peers: Vec<PeerAddress>,
    air: SimulatedAir,
}

impl AirLink {
    pub fn address(&self) -> PeerAddress {
        self.address
    }
}

impl PeerLink for AirLink {
    fn add_peer(&mut self, address: PeerAddress) -> Result<()> {
        if !self.peers.contains(&address) {
            self.peers.push(address);
        }
        Ok(())
    }

    fn send(&mut self, address: PeerAddress, payload: &[u8]) -> Result<()> {
        if !self.peers.contains(&address) {
            return Err(Error::Radio);
        }
        self.air.transmit(self.address, address, payload)
    }
}

#[cfg(test)]
mod tests {
    use meshsense_embedded::radio::ChannelSynchronizer;

    use super::*;

    fn network() -> Network {
        Network {
            upstream_name: String::from("Man2"),
            upstream_channel: 11,
            access_point_name: String::from("ESP32_WS"),
            access_point_channel: 6,
            boot_channel: 1,
        }
    }

    fn collect(air: &SimulatedAir) -> Vec<(PeerAddress, RadioEvent)> {
        let mut events = Vec::new();
        air.deliver(|to, event| events.push((to, event)));
        events
    }

    #[test]
    fn test_frames_cross_only_on_a_shared_channel() {
        let air = SimulatedAir::new(&network(), &Loss::None);
        let a = PeerAddress::new([2, 0, 0, 0, 0, 1]);
        let b = PeerAddress::new([2, 0, 0, 0, 0, 2]);
        let (_, mut link_a) = air.attach(a, 1);
        let (mut radio_b, _) = air.attach(b, 1);
        link_a.add_peer(b).unwrap();

        link_a.send(b, b"turn on\0").unwrap();
        let events = collect(&air);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], (to, RadioEvent::Received { sender, .. }) if *to == b && *sender == a));
        assert!(matches!(events[1], (to, RadioEvent::SendCompleted { delivered: true, .. }) if to == a));

        ChannelSynchronizer::new("ESP32_WS")
            .synchronize(&mut radio_b)
            .unwrap();
        assert_eq!(air.channel_of(b), Some(6));

        link_a.send(b, b"turn on\0").unwrap();
        let events = collect(&air);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].1, RadioEvent::SendCompleted { delivered: false, .. }));
        assert_eq!(air.stats().off_channel, 1);
    }

    #[test]
    fn test_every_nth_frame_is_lost() {
        let air = SimulatedAir::new(&network(), &Loss::Every { n: 2 });
        let a = PeerAddress::new([2, 0, 0, 0, 0, 1]);
        let b = PeerAddress::new([2, 0, 0, 0, 0, 2]);
        let (_, mut link_a) = air.attach(a, 6);
        air.attach(b, 6);
        link_a.add_peer(b).unwrap();

        for _ in 0..4 {
            link_a.send(b, b"disable\0").unwrap();
        }
        collect(&air);

        let stats = air.stats();
        assert_eq!(stats.transmitted, 4);
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.lost, 2);
    }

    #[test]
    fn test_channel_change_needs_promiscuous_mode() {
        let air = SimulatedAir::new(&network(), &Loss::None);
        let a = PeerAddress::new([2, 0, 0, 0, 0, 1]);
        let (mut radio, _) = air.attach(a, 1);

        assert_eq!(radio.set_channel(6), Err(Error::Radio));
        radio.set_promiscuous(true).unwrap();
        radio.set_channel(6).unwrap();
        assert_eq!(radio.channel(), 6);
    }

    #[test]
    fn test_unknown_peer_is_refused() {
        let air = SimulatedAir::new(&network(), &Loss::None);
        let (_, mut link) = air.attach(PeerAddress::new([2, 0, 0, 0, 0, 1]), 1);

        assert_eq!(link.send(PeerAddress::new([9; 6]), b"x"), Err(Error::Radio));
    }
}
