mod command;
mod status;

pub use command::Command;
pub use status::{
    LightReport, MotionReport, MotionSignal, MotionStatus, SmokeReport, SmokeStatus, SoundReport,
    SoundStatus, StatusDatagram,
};
