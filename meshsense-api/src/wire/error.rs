use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Payload size differs from the fixed layout
    LengthMismatch { expected: usize, actual: usize },
    /// Role has no status layout
    NoLayout,
    /// Text does not fit its fixed field
    LabelTooLong { capacity: usize },
    /// Command token not recognised
    UnknownCommand,
    /// Hardware address text malformed
    InvalidAddress,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { expected, actual } => {
                write!(f, "Length mismatch: expected {} bytes, got {}", expected, actual)
            }
            Self::NoLayout => write!(f, "Role has no status layout"),
            Self::LabelTooLong { capacity } => {
                write!(f, "Label exceeds field capacity of {} bytes", capacity)
            }
            Self::UnknownCommand => write!(f, "Unknown command token"),
            Self::InvalidAddress => write!(f, "Invalid hardware address"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CodecError {}

pub type Result<T> = core::result::Result<T, CodecError>;
