use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::wire::{CodecError, Result};

/// Text command the aggregator sends to sensor nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Re-enable a disabled node.
    TurnOn,
    /// Soft stop, the node keeps running.
    Disable,
    /// Hard stop followed by deep sleep.
    Disable1,
}

impl Command {
    pub fn token(&self) -> &'static str {
        match self {
            Command::TurnOn => "turn on",
            Command::Disable => "disable",
            Command::Disable1 => "disable1",
        }
    }

    /// Token bytes including the C string terminator.
    pub fn encode(&self) -> Vec<u8> {
        let token = self.token().as_bytes();
        let mut data = Vec::with_capacity(token.len() + 1);
        data.extend_from_slice(token);
        data.push(0);
        data
    }

    /// Accepts the token with or without trailing NUL bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        if data[end..].iter().any(|&b| b != 0) {
            return Err(CodecError::UnknownCommand);
        }

        match &data[..end] {
            b"turn on" => Ok(Command::TurnOn),
            b"disable" => Ok(Command::Disable),
            b"disable1" => Ok(Command::Disable1),
            _ => Err(CodecError::UnknownCommand),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_includes_terminator() {
        assert_eq!(Command::TurnOn.encode(), b"turn on\0");
        assert_eq!(Command::Disable.encode().len(), 8);
        assert_eq!(Command::Disable1.encode().len(), 9);
    }

    #[test]
    fn test_decode_with_and_without_terminator() {
        assert_eq!(Command::decode(b"disable1\0").unwrap(), Command::Disable1);
        assert_eq!(Command::decode(b"disable").unwrap(), Command::Disable);
        assert_eq!(Command::decode(b"turn on\0\0\0").unwrap(), Command::TurnOn);
    }

    #[test]
    fn test_decode_rejects_unknown_tokens() {
        assert_eq!(Command::decode(b"turn off\0"), Err(CodecError::UnknownCommand));
        assert_eq!(Command::decode(b"disable\0x"), Err(CodecError::UnknownCommand));
        assert_eq!(Command::decode(b""), Err(CodecError::UnknownCommand));
        assert_eq!(Command::decode(b"DISABLE"), Err(CodecError::UnknownCommand));
    }
}
