use embedded_hal::digital::OutputPin;
use meshsense_api::{Command, MotionReport, MotionSignal, MotionStatus, Role, StatusDatagram};
use serde::Deserialize;

use super::{Debouncer, Indicator, Lifecycle, SampleSource, SensorNode};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub debounce_ms: u64,
    pub button_debounce_ms: u64,
    /// Minimum hold for the manual turn-off press.
    pub long_press_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            button_debounce_ms: 50,
            long_press_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    MotionActive,
}

/// PIR motion node with a manual turn-off button.
///
/// The button is active-low with a pull-up: a sample of 0 means pressed.
pub struct MotionSensor<M, B, P>
where
    M: SampleSource,
    B: SampleSource,
    P: OutputPin,
{
    config: MotionConfig,
    motion_input: M,
    button_input: B,
    indicator: Indicator<P>,
    motion: Debouncer,
    button: Debouncer,
    press_started: Option<u64>,
    signal: MotionSignal,
    deferred: Option<StatusDatagram>,
    lifecycle: Lifecycle,
}

impl<M, B, P> MotionSensor<M, B, P>
where
    M: SampleSource,
    B: SampleSource,
    P: OutputPin,
{
    pub fn new(config: MotionConfig, motion_input: M, button_input: B, indicator_pin: P) -> Self {
        Self {
            motion: Debouncer::new(config.debounce_ms, false),
            button: Debouncer::new(config.button_debounce_ms, true),
            config,
            motion_input,
            button_input,
            indicator: Indicator::new(indicator_pin),
            press_started: None,
            signal: MotionSignal::NoMotion,
            deferred: None,
            lifecycle: Lifecycle::Active,
        }
    }

    pub fn state(&self) -> MotionState {
        if self.motion.stable() {
            MotionState::MotionActive
        } else {
            MotionState::Idle
        }
    }

    fn report(&self, status: MotionStatus) -> StatusDatagram {
        StatusDatagram::Motion(MotionReport {
            signal: self.signal,
            status,
        })
    }

    fn poll_motion(&mut self, now_ms: u64) -> Option<StatusDatagram> {
        let sample = match self.motion_input.read_sample() {
            Ok(sample) => sample,
            Err(err) => {
                log::warn!("Motion input read failed: {}", err);
                return None;
            }
        };

        match self.motion.update(sample != 0, now_ms)? {
            true => {
                log::info!("Motion detected");
                self.indicator.on();
                self.signal = MotionSignal::Detected;
                let report = self.report(MotionStatus::MotionDetected);
                self.indicator.off();
                Some(report)
            }
            false => {
                log::info!("No motion detected");
                Some(self.report(MotionStatus::NoMotionDetected))
            }
        }
    }

    fn poll_button(&mut self, now_ms: u64) -> Option<StatusDatagram> {
        let sample = match self.button_input.read_sample() {
            Ok(sample) => sample,
            Err(err) => {
                log::warn!("Button read failed: {}", err);
                return None;
            }
        };

        let released = self.button.update(sample != 0, now_ms)?;
        if !released {
            self.press_started = Some(now_ms);
            return None;
        }

        let started = self.press_started.take()?;
        let held_ms = now_ms.saturating_sub(started);
        if held_ms >= self.config.long_press_ms && self.state() == MotionState::Idle {
            log::info!("Long press ({} ms), sending turn off", held_ms);
            self.signal = MotionSignal::TurnOff;
            return Some(self.report(MotionStatus::NoMotionDetected));
        }

        None
    }
}

impl<M, B, P> SensorNode for MotionSensor<M, B, P>
where
    M: SampleSource,
    B: SampleSource,
    P: OutputPin,
{
    fn role(&self) -> Role {
        Role::Motion
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn poll(&mut self, now_ms: u64) -> Option<StatusDatagram> {
        if self.lifecycle.is_halted() {
            return None;
        }

        if let Some(report) = self.deferred.take() {
            return Some(report);
        }

        let motion = self.poll_motion(now_ms);
        let button = self.poll_button(now_ms);

        match (motion, button) {
            (Some(motion), button) => {
                self.deferred = button;
                Some(motion)
            }
            (None, button) => button,
        }
    }

    fn apply_command(&mut self, command: Command, _now_ms: u64) -> Option<StatusDatagram> {
        if self.lifecycle.is_halted() {
            return None;
        }

        match command {
            Command::Disable1 => {
                log::info!("Disable1 received, halting motion sensor");
                self.indicator.off();
                self.signal = MotionSignal::NoMotion;
                self.deferred = None;
                self.lifecycle = Lifecycle::Halted;
                Some(self.report(MotionStatus::Disabled))
            }
            other => {
                log::debug!("Motion sensor ignores {}", other);
                None
            }
        }
    }
}
