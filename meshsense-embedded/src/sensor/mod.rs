mod adc;
mod debounce;
mod indicator;
mod lifecycle;
mod light;
mod motion;
mod smoke;
mod sound;

pub use adc::{AdcChannel, DigitalInput, PwmLevel};
pub use debounce::Debouncer;
pub use indicator::{BlinkPattern, Indicator};
pub use lifecycle::{Lifecycle, ReenableGuard};
pub use light::{LightConfig, LightSensor};
pub use motion::{MotionConfig, MotionSensor, MotionState};
pub use smoke::{SmokeConfig, SmokeSensor};
pub use sound::{SoundConfig, SoundSensor};

use meshsense_api::{Command, Role, StatusDatagram};

use crate::error::Result;

/// Produces one normalized reading per call: a 12-bit ADC value for analog
/// inputs, 0 or 1 for digital ones.
pub trait SampleSource {
    fn read_sample(&mut self) -> Result<u16>;
}

impl<T: SampleSource + ?Sized> SampleSource for &mut T {
    fn read_sample(&mut self) -> Result<u16> {
        (**self).read_sample()
    }
}

/// Sink for an 8-bit actuation level (0 = off, 255 = full).
pub trait LevelOutput {
    fn set_level(&mut self, level: u8) -> Result<()>;
}

/// Local state machine of a sensor node.
///
/// Both methods return the status datagram to send to the aggregator, if any.
pub trait SensorNode {
    fn role(&self) -> Role;

    fn lifecycle(&self) -> Lifecycle;

    fn poll(&mut self, now_ms: u64) -> Option<StatusDatagram>;

    fn apply_command(&mut self, command: Command, now_ms: u64) -> Option<StatusDatagram>;
}
