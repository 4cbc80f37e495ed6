use embedded_hal::digital::OutputPin;
use meshsense_api::{Command, Role, SoundReport, SoundStatus, StatusDatagram};
use serde::Deserialize;

use super::{Indicator, Lifecycle, ReenableGuard, SampleSource, SensorNode};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub baseline_samples: u32,
    /// Margin above the baseline that counts as loud.
    pub threshold_offset: i32,
    pub classify_interval_ms: u64,
    pub send_interval_ms: u64,
    pub indicator_hold_ms: u64,
    pub reenable_cooldown_ms: u64,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            baseline_samples: 100,
            threshold_offset: 50,
            classify_interval_ms: 100,
            send_interval_ms: 500,
            indicator_hold_ms: 2000,
            reenable_cooldown_ms: 10_000,
        }
    }
}

pub struct SoundSensor<S, P>
where
    S: SampleSource,
    P: OutputPin,
{
    config: SoundConfig,
    input: S,
    indicator: Indicator<P>,
    baseline: i32,
    level: i32,
    status: SoundStatus,
    last_classified: u64,
    last_loud: u64,
    last_sent: u64,
    guard: ReenableGuard,
    lifecycle: Lifecycle,
}

impl<S, P> SoundSensor<S, P>
where
    S: SampleSource,
    P: OutputPin,
{
    /// Averages the configured number of samples into the quiet baseline.
    /// Must run before the node joins the link.
    pub fn calibrate(config: SoundConfig, mut input: S, indicator_pin: P) -> Result<Self> {
        if config.baseline_samples == 0 {
            return Err(Error::CalibrationFailed);
        }

        let mut total: i64 = 0;
        for _ in 0..config.baseline_samples {
            let sample = input.read_sample().map_err(|err| {
                log::error!("Baseline sampling failed: {}", err);
                Error::CalibrationFailed
            })?;
            total += i64::from(sample);
        }
        let baseline = (total / i64::from(config.baseline_samples)) as i32;

        log::info!("Sound baseline {}", baseline);

        Ok(Self {
            guard: ReenableGuard::new(config.reenable_cooldown_ms),
            config,
            input,
            indicator: Indicator::new(indicator_pin),
            baseline,
            level: 0,
            status: SoundStatus::Quiet,
            last_classified: 0,
            last_loud: 0,
            last_sent: 0,
            lifecycle: Lifecycle::Active,
        })
    }

    pub fn baseline(&self) -> i32 {
        self.baseline
    }

    pub fn threshold(&self) -> i32 {
        self.baseline + self.config.threshold_offset
    }

    pub fn status(&self) -> SoundStatus {
        self.status
    }

    pub fn indicator_lit(&self) -> bool {
        self.indicator.is_lit()
    }

    fn classify(&mut self, now_ms: u64) {
        if self.level > self.threshold() {
            self.status = SoundStatus::Loud;
            self.indicator.on();
            self.last_loud = now_ms;
        } else if now_ms.saturating_sub(self.last_loud) > self.config.indicator_hold_ms {
            self.status = SoundStatus::Quiet;
            self.indicator.off();
        }
    }

    fn disable(&mut self) -> StatusDatagram {
        self.level = 0;
        self.status = SoundStatus::Disabled;
        self.indicator.off();
        self.lifecycle = Lifecycle::Disabled;
        self.report()
    }

    fn report(&self) -> StatusDatagram {
        StatusDatagram::Sound(SoundReport {
            level: self.level,
            status: self.status,
        })
    }
}

impl<S, P> SensorNode for SoundSensor<S, P>
where
    S: SampleSource,
    P: OutputPin,
{
    fn role(&self) -> Role {
        Role::Sound
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn poll(&mut self, now_ms: u64) -> Option<StatusDatagram> {
        if self.lifecycle != Lifecycle::Active {
            return None;
        }

        match self.input.read_sample() {
            Ok(sample) => self.level = i32::from(sample),
            Err(err) => {
                log::warn!("Sound input read failed: {}", err);
                return None;
            }
        }

        if now_ms.saturating_sub(self.last_classified) > self.config.classify_interval_ms {
            self.classify(now_ms);
            self.last_classified = now_ms;
        }

        if now_ms.saturating_sub(self.last_sent) > self.config.send_interval_ms {
            self.last_sent = now_ms;
            return Some(self.report());
        }

        None
    }

    fn apply_command(&mut self, command: Command, now_ms: u64) -> Option<StatusDatagram> {
        if self.lifecycle.is_halted() {
            return None;
        }

        match command {
            Command::Disable => {
                log::info!("Disable received, muting sound sensor");
                Some(self.disable())
            }
            Command::Disable1 => {
                log::info!("Disable1 received, halting sound sensor");
                let report = self.disable();
                self.lifecycle = Lifecycle::Halted;
                Some(report)
            }
            Command::TurnOn => {
                if !self.guard.try_activate(now_ms) {
                    log::debug!("Turn on ignored, cooldown running");
                    return None;
                }
                if self.lifecycle == Lifecycle::Disabled {
                    log::info!("Sound sensor re-enabled");
                    self.status = SoundStatus::Quiet;
                }
                self.lifecycle = Lifecycle::Active;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::sensor::mock::{MockPin, ScriptedSource};

    type TestSensor = SoundSensor<ScriptedSource, MockPin>;

    fn sensor() -> (TestSensor, ScriptedSource) {
        let input = ScriptedSource::default();
        input.push(&[180, 220, 200, 200]);
        let config = SoundConfig {
            baseline_samples: 4,
            ..SoundConfig::default()
        };
        let sensor = SoundSensor::calibrate(config, input.clone(), MockPin::default()).unwrap();
        (sensor, input)
    }

    fn statuses(sensor: &mut TestSensor, from: u64, to: u64) -> Vec<SoundReport> {
        (from..=to)
            .step_by(10)
            .filter_map(|t| match sensor.poll(t) {
                Some(StatusDatagram::Sound(report)) => Some(report),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_baseline_is_mean_of_startup_samples() {
        let (sensor, _) = sensor();
        assert_eq!(sensor.baseline(), 200);
        assert_eq!(sensor.threshold(), 250);
    }

    #[test]
    fn test_calibration_needs_samples() {
        let config = SoundConfig {
            baseline_samples: 0,
            ..SoundConfig::default()
        };
        assert!(matches!(
            SoundSensor::calibrate(config, ScriptedSource::default(), MockPin::default()),
            Err(Error::CalibrationFailed)
        ));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let (mut sensor, input) = sensor();
        input.set(250);
        let reports = statuses(&mut sensor, 0, 1000);
        assert!(reports.iter().all(|r| r.status == SoundStatus::Quiet));

        input.set(251);
        statuses(&mut sensor, 1010, 1200);
        assert_eq!(sensor.status(), SoundStatus::Loud);
    }

    #[test]
    fn test_indicator_held_after_last_loud_sample() {
        let (mut sensor, input) = sensor();
        input.set(900);
        statuses(&mut sensor, 0, 500);
        assert!(sensor.indicator_lit());
        let last_loud = sensor.last_loud;

        input.set(100);
        statuses(&mut sensor, 510, last_loud + 2000);
        assert_eq!(sensor.status(), SoundStatus::Loud);
        assert!(sensor.indicator_lit());

        statuses(&mut sensor, last_loud + 2010, last_loud + 2300);
        assert_eq!(sensor.status(), SoundStatus::Quiet);
        assert!(!sensor.indicator_lit());
    }

    #[test]
    fn test_reports_every_send_interval() {
        let (mut sensor, input) = sensor();
        input.set(120);
        let reports = statuses(&mut sensor, 0, 2000);
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.level == 120));
    }

    #[test]
    fn test_disable_keeps_running_and_turn_on_respects_cooldown() {
        let (mut sensor, input) = sensor();
        input.set(900);
        statuses(&mut sensor, 0, 600);

        let report = sensor.apply_command(Command::Disable, 600);
        assert_eq!(
            report,
            Some(StatusDatagram::Sound(SoundReport {
                level: 0,
                status: SoundStatus::Disabled
            }))
        );
        assert_eq!(sensor.lifecycle(), Lifecycle::Disabled);
        assert!(!sensor.indicator_lit());
        assert!(statuses(&mut sensor, 610, 2000).is_empty());

        assert_eq!(sensor.apply_command(Command::TurnOn, 2000), None);
        assert_eq!(sensor.lifecycle(), Lifecycle::Active);

        sensor.apply_command(Command::Disable, 2500);
        sensor.apply_command(Command::TurnOn, 8000);
        assert_eq!(sensor.lifecycle(), Lifecycle::Disabled);

        sensor.apply_command(Command::TurnOn, 12_000);
        assert_eq!(sensor.lifecycle(), Lifecycle::Active);
    }

    #[test]
    fn test_disable1_reports_then_halts() {
        let (mut sensor, _) = sensor();

        let report = sensor.apply_command(Command::Disable1, 100);
        assert!(matches!(
            report,
            Some(StatusDatagram::Sound(SoundReport {
                level: 0,
                status: SoundStatus::Disabled
            }))
        ));
        assert_eq!(sensor.lifecycle(), Lifecycle::Halted);
        assert_eq!(sensor.apply_command(Command::TurnOn, 50_000), None);
        assert_eq!(sensor.lifecycle(), Lifecycle::Halted);
        assert!(statuses(&mut sensor, 200, 2000).is_empty());
    }
}
