#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use meshsense_api::peer::default_address;
use meshsense_api::{DEFAULT_PEERS, PeerAddress, Role, StatusDatagram};
use meshsense_embedded::node::{AGGREGATOR_NETWORK, aggregator_peer, bootstrap, sensor_peers};
use meshsense_embedded::radio::{ScanEntry, post_event};
use meshsense_embedded::sensor::{
    LevelOutput, LightConfig, LightSensor, MotionConfig, MotionSensor, SampleSource, SmokeConfig,
    SmokeSensor, SoundConfig, SoundSensor,
};
use meshsense_embedded::{
    AggregatorNode, Error, Inbox, PeerLink, RadioEvent, Result, SensorRuntime, WifiRadio,
};

pub const UPSTREAM_NETWORK: &str = "Man2";
pub const MESH_CHANNEL: u8 = 6;
pub const TICK_MS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Frame {
    pub seq: usize,
    pub from: PeerAddress,
    pub to: PeerAddress,
    pub payload: Vec<u8>,
}

/// Shared medium. Frames queue here until the next tick delivers them.
#[derive(Debug, Default)]
pub struct Air {
    pending: VecDeque<Frame>,
    pub history: Vec<Frame>,
    /// Drop every n-th frame.
    pub drop_every: Option<usize>,
    pub dropped: usize,
}

impl Air {
    fn transmit(&mut self, from: PeerAddress, to: PeerAddress, payload: &[u8]) {
        let frame = Frame {
            seq: self.history.len() + 1,
            from,
            to,
            payload: payload.to_vec(),
        };
        self.history.push(frame.clone());
        self.pending.push_back(frame);
    }

    fn is_lost(&mut self, frame: &Frame) -> bool {
        let lost = self.drop_every.is_some_and(|n| frame.seq % n == 0);
        if lost {
            self.dropped += 1;
        }
        lost
    }
}

#[derive(Debug)]
pub struct AirLink {
    address: PeerAddress,
    peers: Vec<PeerAddress>,
    air: Rc<RefCell<Air>>,
}

impl PeerLink for AirLink {
    fn add_peer(&mut self, address: PeerAddress) -> Result<()> {
        self.peers.push(address);
        Ok(())
    }

    fn send(&mut self, address: PeerAddress, payload: &[u8]) -> Result<()> {
        if !self.peers.contains(&address) {
            return Err(Error::Radio);
        }
        self.air.borrow_mut().transmit(self.address, address, payload);
        Ok(())
    }
}

pub struct SimRadio {
    channel: u8,
}

impl WifiRadio for SimRadio {
    fn scan(&mut self) -> Result<Vec<ScanEntry>> {
        Ok(vec![
            ScanEntry::new(UPSTREAM_NETWORK, MESH_CHANNEL),
            ScanEntry::new(AGGREGATOR_NETWORK, MESH_CHANNEL),
        ])
    }

    fn channel(&self) -> u8 {
        self.channel
    }

    fn set_promiscuous(&mut self, _enabled: bool) -> Result<()> {
        Ok(())
    }

    fn set_channel(&mut self, channel: u8) -> Result<()> {
        self.channel = channel;
        Ok(())
    }
}

/// Analog or digital input whose value the test sets directly.
#[derive(Debug, Clone, Default)]
pub struct Signal(Rc<Cell<u16>>);

impl Signal {
    pub fn new(value: u16) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    pub fn set(&self, value: u16) {
        self.0.set(value);
    }
}

impl SampleSource for Signal {
    fn read_sample(&mut self) -> Result<u16> {
        Ok(self.0.get())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Led(Rc<Cell<bool>>);

impl Led {
    pub fn is_on(&self) -> bool {
        self.0.get()
    }
}

impl ErrorType for Led {
    type Error = Infallible;
}

impl OutputPin for Led {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dimmer(Rc<Cell<u8>>);

impl Dimmer {
    pub fn level(&self) -> u8 {
        self.0.get()
    }
}

impl LevelOutput for Dimmer {
    fn set_level(&mut self, level: u8) -> Result<()> {
        self.0.set(level);
        Ok(())
    }
}

pub struct Inputs {
    pub pir: Signal,
    pub button: Signal,
    pub smoke: Signal,
    pub sound: Signal,
    pub ambient: Signal,
}

pub struct Outputs {
    pub motion_led: Led,
    pub smoke_led: Led,
    pub sound_led: Led,
    pub dimmer: Dimmer,
}

pub type MotionNode = SensorRuntime<MotionSensor<Signal, Signal, Led>, AirLink>;
pub type SmokeNode = SensorRuntime<SmokeSensor<Signal, Led>, AirLink>;
pub type SoundNode = SensorRuntime<SoundSensor<Signal, Led>, AirLink>;
pub type LightNode = SensorRuntime<LightSensor<Signal, Dimmer>, AirLink>;

/// All five nodes of the deployment on one simulated medium.
pub struct Mesh {
    pub air: Rc<RefCell<Air>>,
    pub aggregator: AggregatorNode<AirLink>,
    pub motion: MotionNode,
    pub smoke: SmokeNode,
    pub sound: SoundNode,
    pub light: LightNode,
    pub inputs: Inputs,
    pub outputs: Outputs,
    pub channels: Vec<u8>,
    inboxes: [Inbox; 5],
    pub now: u64,
}

impl Mesh {
    pub fn new() -> Self {
        let air = Rc::new(RefCell::new(Air::default()));
        let mut channels = Vec::new();

        let mut join = |role: Role| {
            let mut radio = SimRadio { channel: 1 };
            let mut link = AirLink {
                address: default_address(role),
                peers: Vec::new(),
                air: air.clone(),
            };
            let registry = if role == Role::Aggregator {
                bootstrap(&mut radio, &mut link, UPSTREAM_NETWORK, &sensor_peers(&DEFAULT_PEERS))
            } else {
                bootstrap(&mut radio, &mut link, AGGREGATOR_NETWORK, &aggregator_peer(&DEFAULT_PEERS))
            };
            channels.push(radio.channel());
            (link, registry)
        };

        let inputs = Inputs {
            pir: Signal::new(0),
            button: Signal::new(1),
            smoke: Signal::new(150),
            sound: Signal::new(100),
            ambient: Signal::new(50),
        };
        let outputs = Outputs {
            motion_led: Led::default(),
            smoke_led: Led::default(),
            sound_led: Led::default(),
            dimmer: Dimmer::default(),
        };

        let (link, registry) = join(Role::Aggregator);
        let aggregator = AggregatorNode::new(link, registry);

        let (link, registry) = join(Role::Motion);
        let motion = SensorRuntime::new(
            MotionSensor::new(
                MotionConfig::default(),
                inputs.pir.clone(),
                inputs.button.clone(),
                outputs.motion_led.clone(),
            ),
            link,
            registry,
        );

        let (link, registry) = join(Role::Smoke);
        let smoke = SensorRuntime::new(
            SmokeSensor::new(
                SmokeConfig::default(),
                inputs.smoke.clone(),
                outputs.smoke_led.clone(),
            ),
            link,
            registry,
        );

        let (link, registry) = join(Role::Sound);
        let sound = SensorRuntime::new(
            SoundSensor::calibrate(
                SoundConfig::default(),
                inputs.sound.clone(),
                outputs.sound_led.clone(),
            )
            .expect("baseline"),
            link,
            registry,
        );

        let (link, registry) = join(Role::Light);
        let light = SensorRuntime::new(
            LightSensor::new(
                LightConfig::default(),
                inputs.ambient.clone(),
                outputs.dimmer.clone(),
            ),
            link,
            registry,
        );

        Self {
            air,
            aggregator,
            motion,
            smoke,
            sound,
            light,
            inputs,
            outputs,
            channels,
            inboxes: std::array::from_fn(|_| Inbox::new()),
            now: 0,
        }
    }

    pub fn lossy(self, drop_every: usize) -> Self {
        self.air.borrow_mut().drop_every = Some(drop_every);
        self
    }

    fn inbox(&self, address: PeerAddress) -> Option<&Inbox> {
        DEFAULT_PEERS
            .iter()
            .find(|(a, _)| *a == address)
            .map(|(_, role)| &self.inboxes[role.index()])
    }

    /// Moves queued frames into the receivers' inboxes and reports the
    /// outcome to each sender.
    fn deliver(&mut self) {
        let frames: Vec<Frame> = self.air.borrow_mut().pending.drain(..).collect();

        for frame in frames {
            let delivered = !self.air.borrow_mut().is_lost(&frame);

            if delivered {
                if let (Some(inbox), Some(event)) = (
                    self.inbox(frame.to),
                    RadioEvent::received(frame.from, &frame.payload),
                ) {
                    post_event(inbox, event);
                }
            }

            if let Some(inbox) = self.inbox(frame.from) {
                post_event(
                    inbox,
                    RadioEvent::SendCompleted {
                        destination: frame.to,
                        delivered,
                    },
                );
            }
        }
    }

    pub fn tick(&mut self) {
        self.now += TICK_MS;
        self.deliver();

        let now = self.now;
        self.aggregator.step(&self.inboxes[Role::Aggregator.index()]);
        self.motion.step(&self.inboxes[Role::Motion.index()], now);
        self.smoke.step(&self.inboxes[Role::Smoke.index()], now);
        self.sound.step(&self.inboxes[Role::Sound.index()], now);
        self.light.step(&self.inboxes[Role::Light.index()], now);
    }

    pub fn run_for(&mut self, duration_ms: u64) {
        let until = self.now + duration_ms;
        while self.now < until {
            self.tick();
        }
    }

    pub fn run_until(&mut self, at_ms: u64) {
        while self.now < at_ms {
            self.tick();
        }
    }

    /// Puts a frame for the aggregator on the air as if `from` had sent it.
    pub fn inject_from(&mut self, from: PeerAddress, payload: &[u8]) {
        self.air
            .borrow_mut()
            .transmit(from, default_address(Role::Aggregator), payload);
    }

    pub fn inject(&mut self, role: Role, payload: &[u8]) {
        self.inject_from(default_address(role), payload);
    }

    pub fn inject_report(&mut self, datagram: StatusDatagram) {
        let payload = datagram.encode().expect("encodable");
        self.inject(datagram.role(), &payload);
    }

    /// Frames `role` has put on the air so far.
    pub fn sent_by(&self, role: Role) -> usize {
        let address = default_address(role);
        self.air
            .borrow()
            .history
            .iter()
            .filter(|frame| frame.from == address)
            .count()
    }

    /// Commands the aggregator has put on the air, oldest first.
    pub fn commands(&self) -> Vec<(Role, meshsense_api::Command)> {
        let aggregator = default_address(Role::Aggregator);
        self.air
            .borrow()
            .history
            .iter()
            .filter(|frame| frame.from == aggregator)
            .filter_map(|frame| {
                let role = DEFAULT_PEERS
                    .iter()
                    .find(|(a, _)| *a == frame.to)
                    .map(|(_, role)| *role)?;
                let command = meshsense_api::Command::decode(&frame.payload).ok()?;
                Some((role, command))
            })
            .collect()
    }
}
