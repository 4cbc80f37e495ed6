use embedded_hal::digital::OutputPin;
use meshsense_api::{Command, Role, SmokeReport, SmokeStatus, StatusDatagram};
use serde::Deserialize;

use super::{BlinkPattern, Indicator, Lifecycle, SampleSource, SensorNode};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmokeConfig {
    /// Reading that corresponds to 100 %.
    pub max_sensor_value: u16,
    pub read_interval_ms: u64,
    pub alarm_percentage: i32,
    pub blink_repeats: u32,
    pub blink_phase_ms: u64,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            max_sensor_value: 1500,
            read_interval_ms: 500,
            alarm_percentage: 100,
            blink_repeats: 3,
            blink_phase_ms: 500,
        }
    }
}

pub struct SmokeSensor<S, P>
where
    S: SampleSource,
    P: OutputPin,
{
    config: SmokeConfig,
    input: S,
    indicator: Indicator<P>,
    blink: BlinkPattern,
    last_read: Option<u64>,
    lifecycle: Lifecycle,
}

impl<S, P> SmokeSensor<S, P>
where
    S: SampleSource,
    P: OutputPin,
{
    pub fn new(config: SmokeConfig, input: S, indicator_pin: P) -> Self {
        Self {
            blink: BlinkPattern::new(config.blink_repeats, config.blink_phase_ms),
            config,
            input,
            indicator: Indicator::new(indicator_pin),
            last_read: None,
            lifecycle: Lifecycle::Active,
        }
    }

    /// Reading as a percentage of the sensor maximum. Not clamped.
    pub fn percentage(&self, sample: u16) -> i32 {
        i32::from(sample) * 100 / i32::from(self.config.max_sensor_value.max(1))
    }

    pub fn is_blinking(&self) -> bool {
        self.blink.is_running()
    }

    fn drive_blink(&mut self, now_ms: u64) {
        match self.blink.level_at(now_ms) {
            Some(level) => self.indicator.set(level),
            None if self.indicator.is_lit() => self.indicator.off(),
            None => {}
        }
    }

    fn read_due(&self, now_ms: u64) -> bool {
        match self.last_read {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.config.read_interval_ms,
        }
    }
}

impl<S, P> SensorNode for SmokeSensor<S, P>
where
    S: SampleSource,
    P: OutputPin,
{
    fn role(&self) -> Role {
        Role::Smoke
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn poll(&mut self, now_ms: u64) -> Option<StatusDatagram> {
        if self.lifecycle.is_halted() {
            return None;
        }

        self.drive_blink(now_ms);

        if !self.read_due(now_ms) {
            return None;
        }
        self.last_read = Some(now_ms);

        let sample = match self.input.read_sample() {
            Ok(sample) => sample,
            Err(err) => {
                log::warn!("Smoke input read failed: {}", err);
                return None;
            }
        };

        let percentage = self.percentage(sample);
        let alarm = percentage >= self.config.alarm_percentage;

        if alarm {
            if self.blink.start(now_ms) {
                log::warn!("Smoke detected at {}%", percentage);
            }
            self.drive_blink(now_ms);
        }

        Some(StatusDatagram::Smoke(SmokeReport {
            percentage,
            status: if alarm {
                SmokeStatus::SmokeDetected
            } else {
                SmokeStatus::NoSmoke
            },
            blink_led: alarm,
        }))
    }

    fn apply_command(&mut self, command: Command, _now_ms: u64) -> Option<StatusDatagram> {
        if self.lifecycle.is_halted() {
            return None;
        }

        match command {
            Command::Disable1 => {
                log::info!("Disable1 received, halting smoke sensor");
                self.blink.cancel();
                self.indicator.off();
                self.lifecycle = Lifecycle::Halted;
            }
            other => log::debug!("Smoke sensor ignores {}", other),
        }

        None
    }
}
