use std::fs;
use std::path::Path;

use meshsense_api::{DEFAULT_PEERS, PeerAddress, Role};
use meshsense_embedded::sensor::{LightConfig, MotionConfig, SmokeConfig, SoundConfig};
use serde::Deserialize;

use crate::error::SimulationError;

#[derive(Debug, Clone, Deserialize)]
pub struct Logger {
    pub level: String,
}

/// Networks visible to a scan and the channel every node boots on.
#[derive(Debug, Clone, Deserialize)]
pub struct Network {
    pub upstream_name: String,
    pub upstream_channel: u8,
    pub access_point_name: String,
    pub access_point_channel: u8,
    pub boot_channel: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Loss {
    None,
    /// Drops every n-th frame put on the air.
    Every { n: usize },
    /// Drops each frame with probability `rate`.
    Random { rate: f64, seed: Option<u64> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub loss: Loss,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Window {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl Window {
    pub fn contains(&self, now_ms: u64) -> bool {
        (self.start_ms..self.end_ms).contains(&now_ms)
    }
}

/// Scripted environment the sensors observe.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub motion: Vec<Window>,
    pub button_press: Option<Window>,
    pub smoke_baseline: u16,
    pub smoke_spike: Option<Window>,
    pub smoke_spike_level: u16,
    pub sound_baseline: u16,
    #[serde(default)]
    pub sound_bursts: Vec<Window>,
    pub sound_burst_level: u16,
    /// Simulated time for one full ambient-light day.
    pub day_length_ms: u64,
    pub noise: u16,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Simulation {
    pub tick_ms: u64,
    /// Simulated milliseconds per wall-clock millisecond.
    pub speed: u64,
    pub duration_ms: Option<u64>,
    pub snapshot_interval_ms: u64,
    pub scenario: Scenario,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeerOverride {
    pub role: Role,
    pub address: PeerAddress,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub network: Network,
    pub link: Link,
    pub simulation: Simulation,
    #[serde(default)]
    pub peers: Vec<PeerOverride>,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub smoke: SmokeConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub light: LightConfig,
}

impl Settings {
    pub fn new() -> Result<Self, SimulationError> {
        Self::parse(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../",
            "configs/default.toml"
        )))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    fn parse(source: &str) -> Result<Self, SimulationError> {
        let settings: Settings = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SimulationError> {
        if self.simulation.tick_ms == 0 {
            return Err(SimulationError::InvalidSetting("simulation.tick_ms must be positive"));
        }
        if self.simulation.speed == 0 {
            return Err(SimulationError::InvalidSetting("simulation.speed must be positive"));
        }
        if let Loss::Every { n: 0 } = self.link.loss {
            return Err(SimulationError::InvalidSetting("link.loss.n must be positive"));
        }
        if let Loss::Random { rate, .. } = self.link.loss {
            if !(0.0..=1.0).contains(&rate) {
                return Err(SimulationError::InvalidSetting("link.loss.rate must be within 0..=1"));
            }
        }
        Ok(())
    }

    /// Compiled-in peer table with the configured address overrides applied.
    /// Address table with overrides applied, indexed by [`Role::index`].
    pub fn peer_table(&self) -> Result<[(PeerAddress, Role); 5], SimulationError> {
        let mut table = DEFAULT_PEERS;

        for PeerOverride { role, address } in &self.peers {
            if table.iter().any(|(a, r)| a == address && r != role) {
                return Err(SimulationError::DuplicateAddress(*address));
            }
            table[role.index()].0 = *address;
        }

        Ok(table)
    }
}
