use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// The set of currently-open connections.
///
/// Shared between the accept loop and every connection task, so all access
/// goes through one mutex. Entries are added at accept time and removed
/// when the connection closes, on every exit path.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    connections: Mutex<HashMap<u64, SocketAddr>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly accepted connection, returning its id.
    pub fn add(&self, peer: SocketAddr) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(id, peer);
        id
    }

    /// Remove a closed connection. Returns false when the id was not
    /// present (already removed).
    pub fn remove(&self, id: u64) -> bool {
        self.lock().remove(&id).is_some()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Peer addresses of the currently open connections.
    pub fn peers(&self) -> Vec<SocketAddr> {
        self.lock().values().copied().collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, SocketAddr>> {
        // A poisoned lock only means another connection task panicked; the
        // map itself is still sound for id-keyed inserts and removes.
        self.connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[test]
    fn add_then_remove() {
        let registry = ConnectionRegistry::new();
        let id = registry.add(peer(1000));

        assert!(registry.contains(id));
        assert_eq!(registry.count(), 1);
        assert!(registry.remove(id));
        assert!(!registry.contains(id));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let id = registry.add(peer(1001));

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
    }

    #[test]
    fn ids_are_unique() {
        let registry = ConnectionRegistry::new();
        let a = registry.add(peer(1002));
        let b = registry.add(peer(1002));

        assert_ne!(a, b);
        assert_eq!(registry.count(), 2);
    }
}
