use core::fmt;
use core::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::wire::CodecError;

/// Hardware address of a node on the peer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerAddress(pub [u8; 6]);

impl PeerAddress {
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for PeerAddress {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut parts = s.split(':');

        for byte in bytes.iter_mut() {
            let part = parts.next().ok_or(CodecError::InvalidAddress)?;
            if part.len() != 2 {
                return Err(CodecError::InvalidAddress);
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| CodecError::InvalidAddress)?;
        }

        if parts.next().is_some() {
            return Err(CodecError::InvalidAddress);
        }

        Ok(Self(bytes))
    }
}

impl Serialize for PeerAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeerAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AddressVisitor;

        impl Visitor<'_> for AddressVisitor {
            type Value = PeerAddress;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a colon separated hardware address")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<PeerAddress, E> {
                value
                    .parse()
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
            }
        }

        deserializer.deserialize_str(AddressVisitor)
    }
}

/// Fixed functional identity of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Aggregator,
    Motion,
    Smoke,
    Sound,
    Light,
}

impl Role {
    /// Every role, in table order.
    pub const ALL: [Role; 5] = [
        Role::Aggregator,
        Role::Motion,
        Role::Smoke,
        Role::Sound,
        Role::Light,
    ];

    pub const SENSORS: [Role; 4] = [Role::Motion, Role::Smoke, Role::Sound, Role::Light];

    /// Position of the role in [`Role::ALL`] and in per-role tables.
    pub const fn index(&self) -> usize {
        match self {
            Role::Aggregator => 0,
            Role::Motion => 1,
            Role::Smoke => 2,
            Role::Sound => 3,
            Role::Light => 4,
        }
    }

    pub fn is_sensor(&self) -> bool {
        !matches!(self, Role::Aggregator)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Role::Aggregator => "aggregator",
            Role::Motion => "motion sensor",
            Role::Smoke => "smoke sensor",
            Role::Sound => "sound sensor",
            Role::Light => "light sensor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const AGGREGATOR_ADDRESS: PeerAddress = PeerAddress::new([0x10, 0x06, 0x1c, 0xb5, 0x3e, 0x84]);
pub const MOTION_ADDRESS: PeerAddress = PeerAddress::new([0xc0, 0x5d, 0x89, 0xb1, 0x93, 0xa0]);
pub const SMOKE_ADDRESS: PeerAddress = PeerAddress::new([0xfc, 0xe8, 0xc0, 0x74, 0x50, 0x14]);
pub const SOUND_ADDRESS: PeerAddress = PeerAddress::new([0xd8, 0xbc, 0x38, 0xfb, 0xa5, 0x7c]);
pub const LIGHT_ADDRESS: PeerAddress = PeerAddress::new([0xa8, 0x42, 0xe3, 0xc8, 0x36, 0x88]);

/// Address table of the reference deployment, indexed by [`Role::index`].
pub const DEFAULT_PEERS: [(PeerAddress, Role); 5] = [
    (AGGREGATOR_ADDRESS, Role::Aggregator),
    (MOTION_ADDRESS, Role::Motion),
    (SMOKE_ADDRESS, Role::Smoke),
    (SOUND_ADDRESS, Role::Sound),
    (LIGHT_ADDRESS, Role::Light),
];

/// Compiled-in address of a role.
pub const fn default_address(role: Role) -> PeerAddress {
    match role {
        Role::Aggregator => AGGREGATOR_ADDRESS,
        Role::Motion => MOTION_ADDRESS,
        Role::Smoke => SMOKE_ADDRESS,
        Role::Sound => SOUND_ADDRESS,
        Role::Light => LIGHT_ADDRESS,
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_address_display_and_parse() {
        let address = default_address(Role::Aggregator);
        assert_eq!(address.to_string(), "10:06:1c:b5:3e:84");
        assert_eq!("10:06:1C:B5:3E:84".parse::<PeerAddress>().unwrap(), address);
    }

    #[test]
    fn test_address_parse_rejects_malformed() {
        assert!("10:06:1c:b5:3e".parse::<PeerAddress>().is_err());
        assert!("10:06:1c:b5:3e:84:00".parse::<PeerAddress>().is_err());
        assert!("10:06:1c:b5:3e:zz".parse::<PeerAddress>().is_err());
        assert!("100:6:1c:b5:3e:84".parse::<PeerAddress>().is_err());
    }

    #[test]
    fn test_default_peers_follow_role_index() {
        for role in Role::ALL {
            assert_eq!(Role::ALL[role.index()], role);
            assert_eq!(DEFAULT_PEERS[role.index()], (default_address(role), role));
        }
    }

    #[test]
    fn test_default_peers_are_unique() {
        for (i, (a, _)) in DEFAULT_PEERS.iter().enumerate() {
            for (b, _) in DEFAULT_PEERS.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
