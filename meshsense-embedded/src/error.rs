use core::fmt;

use meshsense_api::{CodecError, PeerAddress, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Named network absent from the scan results
    ChannelNotFound,
    /// Radio driver rejected an operation
    Radio,
    PeerRegistration(Role),
    PeerNotRegistered(Role),
    SendFailure(Role),
    UnknownSender(PeerAddress),
    PayloadLengthMismatch {
        role: Role,
        expected: usize,
        actual: usize,
    },
    InvalidCommand,
    Codec(CodecError),
    SensorReadingOutOfRange,
    DeviceNotFound,
    CalibrationFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ChannelNotFound => write!(f, "Network not found in scan results"),
            Error::Radio => write!(f, "Radio error"),
            Error::PeerRegistration(role) => write!(f, "Failed to add {} peer", role),
            Error::PeerNotRegistered(role) => write!(f, "No registered address for {}", role),
            Error::SendFailure(role) => write!(f, "Error sending data to {}", role),
            Error::UnknownSender(address) => write!(f, "Unknown sender {}", address),
            Error::PayloadLengthMismatch {
                role,
                expected,
                actual,
            } => write!(
                f,
                "Payload from {} has {} bytes, expected {}",
                role, actual, expected
            ),
            Error::InvalidCommand => write!(f, "Invalid command"),
            Error::Codec(err) => write!(f, "Codec error: {}", err),
            Error::SensorReadingOutOfRange => write!(f, "Sensor reading out of valid range"),
            Error::DeviceNotFound => write!(f, "Device not found"),
            Error::CalibrationFailed => write!(f, "Baseline calibration failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<CodecError> for Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::UnknownCommand => Error::InvalidCommand,
            other => Error::Codec(other),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
