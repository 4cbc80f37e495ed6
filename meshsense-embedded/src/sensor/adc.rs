use embedded_hal::digital::InputPin;
use embedded_hal::pwm::SetDutyCycle;
use embedded_io::Read;

use super::{LevelOutput, SampleSource};
use crate::error::{Error, Result};

/// Largest value a 12-bit converter reports.
pub const ADC_MAX: u16 = 4095;

/// Analog input delivered as big-endian 16-bit frames by an ADC front end.
pub struct AdcChannel<IO>
where
    IO: Read,
{
    io_device: IO,
    buffer: [u8; 2],
}

impl<IO> AdcChannel<IO>
where
    IO: Read,
{
    pub fn new(io_device: IO) -> Self {
        Self {
            io_device,
            buffer: [0; 2],
        }
    }
}

impl<IO> SampleSource for AdcChannel<IO>
where
    IO: Read,
{
    fn read_sample(&mut self) -> Result<u16> {
        let read_count = self
            .io_device
            .read(&mut self.buffer)
            .map_err(|_| Error::DeviceNotFound)?;

        if read_count < 2 {
            return Err(Error::DeviceNotFound);
        }

        let raw_value = u16::from_be_bytes(self.buffer);
        if raw_value > ADC_MAX {
            return Err(Error::SensorReadingOutOfRange);
        }

        Ok(raw_value)
    }
}

/// Digital input read as 1 (high) or 0 (low).
pub struct DigitalInput<P: InputPin> {
    pin: P,
}

impl<P: InputPin> DigitalInput<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> SampleSource for DigitalInput<P> {
    fn read_sample(&mut self) -> Result<u16> {
        let high = self.pin.is_high().map_err(|_| Error::DeviceNotFound)?;
        Ok(high as u16)
    }
}

/// PWM channel driven with an 8-bit level.
pub struct PwmLevel<P: SetDutyCycle> {
    pwm: P,
}

impl<P: SetDutyCycle> PwmLevel<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm }
    }
}

impl<P: SetDutyCycle> LevelOutput for PwmLevel<P> {
    fn set_level(&mut self, level: u8) -> Result<()> {
        self.pwm
            .set_duty_cycle_fraction(level as u16, u8::MAX as u16)
            .map_err(|_| Error::DeviceNotFound)
    }
}
