use alloc::format;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::peer::Role;
use crate::wire::{CodecError, FrameReader, FrameWriter, Result};

const STATUS_LABEL_CAPACITY: usize = 20;
const PERCENT_LABEL_CAPACITY: usize = 10;

const MOTION_LEN: usize = 24;
const SOUND_LEN: usize = 24;
const SMOKE_LEN: usize = 28;
const LIGHT_LEN: usize = 16;

/// Tri-state value carried by motion reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionSignal {
    NoMotion,
    Detected,
    /// Manual override from the long-press button.
    TurnOff,
    Unknown(i32),
}

impl MotionSignal {
    pub fn from_raw(value: i32) -> Self {
        match value {
            0 => Self::NoMotion,
            1 => Self::Detected,
            2 => Self::TurnOff,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> i32 {
        match self {
            Self::NoMotion => 0,
            Self::Detected => 1,
            Self::TurnOff => 2,
            Self::Unknown(value) => *value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionStatus {
    MotionDetected,
    NoMotionDetected,
    Disabled,
    Unknown,
}

impl MotionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MotionDetected => "Motion Detected",
            Self::NoMotionDetected => "No Motion Detected",
            Self::Disabled => "DISABLED",
            Self::Unknown => "",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Motion Detected" => Self::MotionDetected,
            "No Motion Detected" => Self::NoMotionDetected,
            "DISABLED" => Self::Disabled,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmokeStatus {
    SmokeDetected,
    NoSmoke,
    Unknown,
}

impl SmokeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SmokeDetected => "SMOKE DETECTED",
            Self::NoSmoke => "NO SMOKE",
            Self::Unknown => "",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "SMOKE DETECTED" => Self::SmokeDetected,
            "NO SMOKE" => Self::NoSmoke,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundStatus {
    Loud,
    Quiet,
    Disabled,
    Unknown,
}

impl SoundStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loud => "LOUD",
            Self::Quiet => "QUIET",
            Self::Disabled => "DISABLED",
            Self::Unknown => "",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "LOUD" => Self::Loud,
            "QUIET" => Self::Quiet,
            "DISABLED" => Self::Disabled,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionReport {
    pub signal: MotionSignal,
    pub status: MotionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmokeReport {
    /// Reading relative to the sensor maximum, may exceed 100.
    pub percentage: i32,
    pub status: SmokeStatus,
    pub blink_led: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundReport {
    pub level: i32,
    pub status: SoundStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightReport {
    /// Raw ambient reading, 0-4095.
    pub light_level: i32,
    /// Output brightness; `None` is sent as an empty label.
    pub brightness_percent: Option<u8>,
}

impl LightReport {
    fn percent_label(&self) -> alloc::string::String {
        match self.brightness_percent {
            Some(percent) => format!("{percent}%"),
            None => alloc::string::String::new(),
        }
    }

    fn parse_percent(label: &str) -> Option<u8> {
        label.strip_suffix('%')?.parse().ok()
    }
}

/// Status report sent by a sensor node to the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusDatagram {
    Motion(MotionReport),
    Smoke(SmokeReport),
    Sound(SoundReport),
    Light(LightReport),
}

impl StatusDatagram {
    /// Fixed byte length of the status layout sent by `role`.
    pub fn wire_len(role: Role) -> Option<usize> {
        match role {
            Role::Motion => Some(MOTION_LEN),
            Role::Smoke => Some(SMOKE_LEN),
            Role::Sound => Some(SOUND_LEN),
            Role::Light => Some(LIGHT_LEN),
            Role::Aggregator => None,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::Motion(_) => Role::Motion,
            Self::Smoke(_) => Role::Smoke,
            Self::Sound(_) => Role::Sound,
            Self::Light(_) => Role::Light,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Self::Motion(report) => {
                let mut writer = FrameWriter::new(MOTION_LEN);
                writer
                    .put_i32(report.signal.raw())
                    .put_label(report.status.label(), STATUS_LABEL_CAPACITY)?;
                Ok(writer.finish())
            }
            Self::Smoke(report) => {
                let mut writer = FrameWriter::new(SMOKE_LEN);
                writer
                    .put_i32(report.percentage)
                    .put_label(report.status.label(), STATUS_LABEL_CAPACITY)?
                    .put_bool(report.blink_led)
                    .pad(3);
                Ok(writer.finish())
            }
            Self::Sound(report) => {
                let mut writer = FrameWriter::new(SOUND_LEN);
                writer
                    .put_i32(report.level)
                    .put_label(report.status.label(), STATUS_LABEL_CAPACITY)?;
                Ok(writer.finish())
            }
            Self::Light(report) => {
                let mut writer = FrameWriter::new(LIGHT_LEN);
                writer
                    .put_i32(report.light_level)
                    .put_label(&report.percent_label(), PERCENT_LABEL_CAPACITY)?
                    .pad(2);
                Ok(writer.finish())
            }
        }
    }

    /// Decodes the layout of `role`. The length is the only validation; unknown
    /// labels decode to their `Unknown` variant.
    pub fn decode(role: Role, data: &[u8]) -> Result<Self> {
        let expected = Self::wire_len(role).ok_or(CodecError::NoLayout)?;
        let mut reader = FrameReader::new(data, expected)?;

        let datagram = match role {
            Role::Motion => Self::Motion(MotionReport {
                signal: MotionSignal::from_raw(reader.i32()),
                status: MotionStatus::from_label(reader.label(STATUS_LABEL_CAPACITY)),
            }),
            Role::Smoke => {
                let percentage = reader.i32();
                let status = SmokeStatus::from_label(reader.label(STATUS_LABEL_CAPACITY));
                let blink_led = reader.bool();
                reader.skip(3);
                Self::Smoke(SmokeReport {
                    percentage,
                    status,
                    blink_led,
                })
            }
            Role::Sound => Self::Sound(SoundReport {
                level: reader.i32(),
                status: SoundStatus::from_label(reader.label(STATUS_LABEL_CAPACITY)),
            }),
            Role::Light => {
                let light_level = reader.i32();
                let brightness_percent =
                    LightReport::parse_percent(reader.label(PERCENT_LABEL_CAPACITY));
                reader.skip(2);
                Self::Light(LightReport {
                    light_level,
                    brightness_percent,
                })
            }
            Role::Aggregator => return Err(CodecError::NoLayout),
        };

        Ok(datagram)
    }
}

impl fmt::Display for StatusDatagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Motion(r) => write!(
                f,
                "Motion Level: {}, Motion Status: {}",
                r.signal.raw(),
                r.status.label()
            ),
            Self::Smoke(r) => write!(
                f,
                "Smoke Level: {}, Smoke Status: {}",
                r.percentage,
                r.status.label()
            ),
            Self::Sound(r) => write!(
                f,
                "Sound Level: {}, Sound Status: {}",
                r.level,
                r.status.label()
            ),
            Self::Light(r) => write!(
                f,
                "Light Level: {}, Brightness Percentage: {}",
                r.light_level,
                r.percent_label()
            ),
        }
    }
}
