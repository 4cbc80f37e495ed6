use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use meshsense_api::{PeerAddress, Role};
use meshsense_embedded::aggregator::DeliveryStats;
use meshsense_embedded::node::{aggregator_peer, sensor_peers};
use meshsense_embedded::radio::post_event;
use meshsense_embedded::sensor::{
    LevelOutput, LightSensor, MotionSensor, SampleSource, SmokeSensor, SoundSensor,
};
use meshsense_embedded::{
    AggregatorNode, FusedState, Inbox, Lifecycle, Result, SensorRuntime, bootstrap,
};
use serde::Serialize;

use crate::error::SimulationError;
use crate::link::{AirLink, AirStats, SimulatedAir};
use crate::settings::Settings;
use crate::simulate::Readings;

/// Input line driven by the simulated environment.
#[derive(Debug, Clone, Default)]
pub struct SimInput(Rc<Cell<u16>>);

impl SimInput {
    pub fn set(&self, value: u16) {
        self.0.set(value);
    }
}

impl SampleSource for SimInput {
    fn read_sample(&mut self) -> Result<u16> {
        Ok(self.0.get())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimLed(Rc<Cell<bool>>);

impl SimLed {
    pub fn is_lit(&self) -> bool {
        self.0.get()
    }
}

impl ErrorType for SimLed {
    type Error = Infallible;
}

impl OutputPin for SimLed {
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
pub struct SimDimmer(Rc<Cell<u8>>);

impl SimDimmer {
    pub fn level(&self) -> u8 {
        self.0.get()
    }
}

impl LevelOutput for SimDimmer {
    fn set_level(&mut self, level: u8) -> Result<()> {
        self.0.set(level);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct Inputs {
    motion: SimInput,
    button: SimInput,
    smoke: SimInput,
    sound: SimInput,
    ambient: SimInput,
}

impl Inputs {
    fn apply(&self, readings: &Readings) {
        self.motion.set(u16::from(readings.motion));
        // Active low
        self.button.set(u16::from(!readings.button_pressed));
        self.smoke.set(readings.smoke);
        self.sound.set(readings.sound);
        self.ambient.set(readings.ambient);
    }
}

#[derive(Debug, Clone, Default)]
struct Outputs {
    motion_led: SimLed,
    smoke_led: SimLed,
    sound_led: SimLed,
    dimmer: SimDimmer,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Lifecycles {
    pub motion: Lifecycle,
    pub smoke: Lifecycle,
    pub sound: Lifecycle,
    pub light: Lifecycle,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Indicators {
    pub motion: bool,
    pub smoke: bool,
    pub sound: bool,
    pub light_output: u8,
}

/// Point-in-time view of the deployment, published as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub uptime_ms: u64,
    pub fused: FusedState,
    pub labels: [(Role, String); 4],
    pub lifecycles: Lifecycles,
    pub indicators: Indicators,
    pub delivery: DeliveryStats,
    pub rejected: u32,
    pub air: AirStats,
}

type MotionNode = SensorRuntime<MotionSensor<SimInput, SimInput, SimLed>, AirLink>;
type SmokeNode = SensorRuntime<SmokeSensor<SimInput, SimLed>, AirLink>;
type SoundNode = SensorRuntime<SoundSensor<SimInput, SimLed>, AirLink>;
type LightNode = SensorRuntime<LightSensor<SimInput, SimDimmer>, AirLink>;

/// One aggregator and four sensor nodes sharing a simulated medium.
pub struct Deployment {
    air: SimulatedAir,
    peers: [(PeerAddress, Role); 5],
    aggregator: AggregatorNode<AirLink>,
    motion: MotionNode,
    smoke: SmokeNode,
    sound: SoundNode,
    light: LightNode,
    inboxes: [Inbox; 5],
    inputs: Inputs,
    outputs: Outputs,
}

impl Deployment {
    /// Boots every node. `initial` is what the sensors see during startup,
    /// including the sound baseline calibration.
    pub fn new(
        settings: &Settings,
        air: SimulatedAir,
        initial: &Readings,
    ) -> std::result::Result<Self, SimulationError> {
        let peers = settings.peer_table()?;
        let network = &settings.network;
        let inputs = Inputs::default();
        let outputs = Outputs::default();
        inputs.apply(initial);

        let join = |role: Role| {
            let (mut radio, mut link) = air.attach(peers[role.index()].0, network.boot_channel);
            let registry = if role == Role::Aggregator {
                bootstrap(&mut radio, &mut link, &network.upstream_name, &sensor_peers(&peers))
            } else {
                bootstrap(
                    &mut radio,
                    &mut link,
                    &network.access_point_name,
                    &aggregator_peer(&peers),
                )
            };
            tracing::info!("{} joined as {}", role, link.address());
            (link, registry)
        };

        let (link, registry) = join(Role::Aggregator);
        let aggregator = AggregatorNode::new(link, registry);

        let (link, registry) = join(Role::Motion);
        let motion = SensorRuntime::new(
            MotionSensor::new(
                settings.motion.clone(),
                inputs.motion.clone(),
                inputs.button.clone(),
                outputs.motion_led.clone(),
            ),
            link,
            registry,
        );

        let (link, registry) = join(Role::Smoke);
        let smoke = SensorRuntime::new(
            SmokeSensor::new(
                settings.smoke.clone(),
                inputs.smoke.clone(),
                outputs.smoke_led.clone(),
            ),
            link,
            registry,
        );

        let (link, registry) = join(Role::Sound);
        let sound = SensorRuntime::new(
            SoundSensor::calibrate(
                settings.sound.clone(),
                inputs.sound.clone(),
                outputs.sound_led.clone(),
            )?,
            link,
            registry,
        );
        tracing::info!(
            "Sound baseline {} threshold {}",
            sound.node().baseline(),
            sound.node().threshold()
        );

        let (link, registry) = join(Role::Light);
        let light = SensorRuntime::new(
            LightSensor::new(
                settings.light.clone(),
                inputs.ambient.clone(),
                outputs.dimmer.clone(),
            ),
            link,
            registry,
        );

        Ok(Self {
            air,
            peers,
            aggregator,
            motion,
            smoke,
            sound,
            light,
            inboxes: std::array::from_fn(|_| Inbox::new()),
            inputs,
            outputs,
        })
    }

    fn inbox(&self, address: PeerAddress) -> Option<&Inbox> {
        self.peers
            .iter()
            .find(|(a, _)| *a == address)
            .map(|(_, role)| &self.inboxes[role.index()])
    }

    /// Advances every node to `now_ms` under the given readings.
    pub fn step(&mut self, now_ms: u64, readings: &Readings) {
        self.inputs.apply(readings);

        self.air.deliver(|to, event| {
            if let Some(inbox) = self.inbox(to) {
                post_event(inbox, event);
            }
        });

        self.aggregator.step(&self.inboxes[Role::Aggregator.index()]);
        self.motion.step(&self.inboxes[Role::Motion.index()], now_ms);
        self.smoke.step(&self.inboxes[Role::Smoke.index()], now_ms);
        self.sound.step(&self.inboxes[Role::Sound.index()], now_ms);
        self.light.step(&self.inboxes[Role::Light.index()], now_ms);
    }

    pub fn lifecycles(&self) -> Lifecycles {
        Lifecycles {
            motion: self.motion.lifecycle(),
            smoke: self.smoke.lifecycle(),
            sound: self.sound.lifecycle(),
            light: self.light.lifecycle(),
        }
    }

    pub fn fused_state(&self) -> &FusedState {
        self.aggregator.fused_state()
    }

    pub fn snapshot(&self, uptime_ms: u64) -> Snapshot {
        let fused = self.aggregator.fused_state();
        let labels = Role::SENSORS.map(|role| (role, fused.status_label(role)));

        Snapshot {
            uptime_ms,
            fused: fused.clone(),
            labels,
            lifecycles: self.lifecycles(),
            indicators: Indicators {
                motion: self.outputs.motion_led.is_lit(),
                smoke: self.outputs.smoke_led.is_lit(),
                sound: self.outputs.sound_led.is_lit(),
                light_output: self.outputs.dimmer.level(),
            },
            delivery: self.aggregator.delivery_stats(),
            rejected: self.aggregator.rejected(),
            air: self.air.stats(),
        }
    }
}
