use meshsense_api::{Command, LightReport, Role, StatusDatagram};
use serde::Deserialize;

use super::{LevelOutput, Lifecycle, ReenableGuard, SampleSource, SensorNode};
use crate::control::{ExponentialSmoother, SmoothingParams, level_percent, target_level};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub cycle_ms: u64,
    pub reenable_cooldown_ms: u64,
    pub smoothing: SmoothingParams,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            cycle_ms: 100,
            reenable_cooldown_ms: 10_000,
            smoothing: SmoothingParams::default(),
        }
    }
}

/// Ambient light node driving a dimmable output.
///
/// Starts suppressed and only ramps the output after a `turn on` from the
/// aggregator. The reported percentage lags the output by one cycle.
pub struct LightSensor<S, O>
where
    S: SampleSource,
    O: LevelOutput,
{
    config: LightConfig,
    input: S,
    output: O,
    smoother: ExponentialSmoother,
    guard: ReenableGuard,
    level: u8,
    last_cycle: Option<u64>,
    lifecycle: Lifecycle,
}

impl<S, O> LightSensor<S, O>
where
    S: SampleSource,
    O: LevelOutput,
{
    pub fn new(config: LightConfig, input: S, output: O) -> Self {
        Self {
            smoother: ExponentialSmoother::new(config.smoothing.clone()),
            guard: ReenableGuard::new(config.reenable_cooldown_ms),
            config,
            input,
            output,
            level: 0,
            last_cycle: None,
            lifecycle: Lifecycle::Disabled,
        }
    }

    /// Level last written to the output.
    pub fn output_level(&self) -> u8 {
        self.level
    }

    /// Unrounded smoother state.
    pub fn brightness(&self) -> f32 {
        self.smoother.output()
    }

    fn write_level(&mut self, level: u8) {
        self.level = level;
        if let Err(err) = self.output.set_level(level) {
            log::warn!("Failed to set output level {}: {}", level, err);
        }
    }

    fn suppress(&mut self) {
        self.smoother.reset();
        self.write_level(0);
    }

    fn cycle_due(&self, now_ms: u64) -> bool {
        match self.last_cycle {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.config.cycle_ms,
        }
    }

    fn run_active_cycle(&mut self) -> Option<StatusDatagram> {
        let sample = match self.input.read_sample() {
            Ok(sample) => sample,
            Err(err) => {
                log::warn!("Light input read failed: {}", err);
                return None;
            }
        };

        let target = target_level(sample);
        let percent = level_percent(self.smoother.output());
        let brightness = self.smoother.update(f32::from(target));
        self.write_level(brightness as u8);

        log::trace!("Light level {} target {} output {}", sample, target, self.level);

        Some(StatusDatagram::Light(LightReport {
            light_level: i32::from(sample),
            brightness_percent: Some(percent),
        }))
    }

    fn disable_report() -> StatusDatagram {
        StatusDatagram::Light(LightReport {
            light_level: 0,
            brightness_percent: None,
        })
    }
}

impl<S, O> SensorNode for LightSensor<S, O>
where
    S: SampleSource,
    O: LevelOutput,
{
    fn role(&self) -> Role {
        Role::Light
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn poll(&mut self, now_ms: u64) -> Option<StatusDatagram> {
        if self.lifecycle.is_halted() || !self.cycle_due(now_ms) {
            return None;
        }
        self.last_cycle = Some(now_ms);

        match self.lifecycle {
            Lifecycle::Active => self.run_active_cycle(),
            _ => {
                self.suppress();
                Some(StatusDatagram::Light(LightReport {
                    light_level: 0,
                    brightness_percent: Some(0),
                }))
            }
        }
    }

    fn apply_command(&mut self, command: Command, now_ms: u64) -> Option<StatusDatagram> {
        if self.lifecycle.is_halted() {
            return None;
        }

        match command {
            Command::TurnOn => {
                if self.guard.try_activate(now_ms) {
                    log::info!("Turn on received, enabling light control");
                    self.lifecycle = Lifecycle::Active;
                } else {
                    log::debug!("Turn on ignored, cooldown running");
                }
                None
            }
            Command::Disable => {
                log::info!("Disable received, turning off output");
                self.suppress();
                self.lifecycle = Lifecycle::Disabled;
                Some(Self::disable_report())
            }
            Command::Disable1 => {
                log::info!("Disable1 received, halting light node");
                self.suppress();
                self.lifecycle = Lifecycle::Halted;
                Some(Self::disable_report())
            }
        }
    }
}
