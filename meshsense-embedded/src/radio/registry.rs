use meshsense_api::{PeerAddress, Role};

use super::PeerLink;
use crate::error::{Error, Result};

pub const REGISTRY_CAPACITY: usize = 5;

/// Compiled-in mapping between hardware addresses and roles.
#[derive(Debug, Clone, Default)]
pub struct PeerRegistry {
    entries: heapless::Vec<(PeerAddress, Role), REGISTRY_CAPACITY>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the address to the link's peer table, then records its role.
    /// Registering an existing pair again is a no-op.
    pub fn register_peer<L: PeerLink>(
        &mut self,
        link: &mut L,
        address: PeerAddress,
        role: Role,
    ) -> Result<()> {
        if self.entries.contains(&(address, role)) {
            return Ok(());
        }

        if self.role_of(address).is_some() || self.address_of(role).is_some() {
            log::error!("Conflicting registration for {} at {}", role, address);
            return Err(Error::PeerRegistration(role));
        }

        if self.entries.is_full() {
            log::error!("Peer table full, cannot add {}", role);
            return Err(Error::PeerRegistration(role));
        }

        if let Err(err) = link.add_peer(address) {
            log::error!("Failed to add {} peer {}: {}", role, address, err);
            return Err(Error::PeerRegistration(role));
        }

        self.entries
            .push((address, role))
            .map_err(|_| Error::PeerRegistration(role))?;

        log::debug!("Registered {} at {}", role, address);
        Ok(())
    }

    /// Registers every entry of `table`, returning how many are reachable.
    pub fn register_all<L: PeerLink>(&mut self, link: &mut L, table: &[(PeerAddress, Role)]) -> usize {
        table
            .iter()
            .filter(|(address, role)| self.register_peer(link, *address, *role).is_ok())
            .count()
    }

    pub fn role_of(&self, address: PeerAddress) -> Option<Role> {
        self.entries
            .iter()
            .find(|(a, _)| *a == address)
            .map(|(_, role)| *role)
    }

    pub fn address_of(&self, role: Role) -> Option<PeerAddress> {
        self.entries
            .iter()
            .find(|(_, r)| *r == role)
            .map(|(address, _)| *address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(PeerAddress, Role)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use meshsense_api::DEFAULT_PEERS;

    use super::*;
    use crate::radio::mock::MockLink;

    #[test]
    fn test_register_and_lookup() {
        let mut link = MockLink::default();
        let mut registry = PeerRegistry::new();

        assert_eq!(registry.register_all(&mut link, &DEFAULT_PEERS), 5);
        assert_eq!(link.peers.len(), 5);

        for (address, role) in DEFAULT_PEERS {
            assert_eq!(registry.role_of(address), Some(role));
            assert_eq!(registry.address_of(role), Some(address));
        }
        assert_eq!(registry.role_of(PeerAddress::new([9; 6])), None);
    }

    #[test]
    fn test_reregistering_is_noop() {
        let mut link = MockLink::default();
        let mut registry = PeerRegistry::new();
        let (address, role) = DEFAULT_PEERS[1];

        registry.register_peer(&mut link, address, role).unwrap();
        registry.register_peer(&mut link, address, role).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(link.peers.len(), 1);
    }

    #[test]
    fn test_failed_peer_stays_unreachable() {
        let (smoke, _) = DEFAULT_PEERS[2];
        let mut link = MockLink {
            refuse_peers: alloc::vec![smoke],
            ..Default::default()
        };
        let mut registry = PeerRegistry::new();

        assert_eq!(registry.register_all(&mut link, &DEFAULT_PEERS), 4);
        assert_eq!(registry.address_of(Role::Smoke), None);
        assert_eq!(registry.role_of(smoke), None);
        assert_eq!(
            registry.register_peer(&mut link, smoke, Role::Smoke),
            Err(Error::PeerRegistration(Role::Smoke))
        );
    }

    #[test]
    fn test_conflicting_role_rejected() {
        let mut link = MockLink::default();
        let mut registry = PeerRegistry::new();
        let (address, _) = DEFAULT_PEERS[1];

        registry.register_peer(&mut link, address, Role::Motion).unwrap();
        assert_eq!(
            registry.register_peer(&mut link, address, Role::Sound),
            Err(Error::PeerRegistration(Role::Sound))
        );
    }
}
