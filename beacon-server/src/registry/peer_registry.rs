use crate::registry::PeerHandle;
use beacon_core::{Frame, PeerId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// The caller's handle was replaced by a newer registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superseded;

/// Result of [`PeerRegistry::register`].
#[derive(Debug)]
pub struct Registration {
    pub handle: PeerHandle,
    /// Handle that was displaced by this registration, already told to close.
    pub superseded: Option<PeerHandle>,
}

#[derive(Default)]
struct RegistryState {
    peers: HashMap<PeerId, PeerHandle>,
    next_generation: u64,
}

/// Authoritative mapping from peer id to its live connection.
///
/// Every operation runs under one mutex and only touches memory. Sends to
/// peers happen after the lock is released, on handles cloned out of it.
#[derive(Default)]
pub struct PeerRegistry {
    state: Mutex<RegistryState>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install a connection for `peer_id`, closing the one it replaces.
    pub fn register(
        &self,
        peer_id: PeerId,
        outbound: mpsc::UnboundedSender<Frame>,
    ) -> Registration {
        let mut state = self.lock();

        state.next_generation += 1;
        let handle = PeerHandle::new(peer_id.clone(), state.next_generation, outbound);

        let superseded = state.peers.remove(&peer_id);
        if let Some(old) = &superseded {
            info!(
                "Peer {} superseded (generation {} -> {})",
                peer_id,
                old.generation(),
                handle.generation()
            );
            old.close();
        }

        state.peers.insert(peer_id, handle.clone());

        Registration { handle, superseded }
    }

    /// Remove the entry for `handle`'s peer, but only if it still belongs to
    /// `handle`. Returns whether anything was removed.
    pub fn unregister(&self, handle: &PeerHandle) -> bool {
        let mut state = self.lock();

        let owns_entry = state
            .peers
            .get(handle.peer_id())
            .is_some_and(|current| current.generation() == handle.generation());

        if !owns_entry {
            debug!(
                "Ignoring unregister of stale generation {} for {}",
                handle.generation(),
                handle.peer_id()
            );
            return false;
        }

        state.peers.remove(handle.peer_id());
        true
    }

    pub fn lookup(&self, peer_id: &PeerId) -> Option<PeerHandle> {
        self.lock().peers.get(peer_id).cloned()
    }

    /// Look up `destination` on behalf of `sender`, atomically checking that
    /// `sender` is still the current registration for its id.
    pub fn lookup_as(
        &self,
        sender: &PeerHandle,
        destination: &PeerId,
    ) -> Result<Option<PeerHandle>, Superseded> {
        let state = self.lock();

        let sender_current = state
            .peers
            .get(sender.peer_id())
            .is_some_and(|current| current.generation() == sender.generation());
        if !sender_current {
            return Err(Superseded);
        }

        Ok(state.peers.get(destination).cloned())
    }

    pub fn is_current(&self, handle: &PeerHandle) -> bool {
        self.lock()
            .peers
            .get(handle.peer_id())
            .is_some_and(|current| current.generation() == handle.generation())
    }

    /// Registered ids, sorted.
    pub fn snapshot(&self) -> Vec<PeerId> {
        let mut ids: Vec<PeerId> = self.lock().peers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Handles of every registered peer, captured under one lock.
    pub fn handles(&self) -> Vec<PeerHandle> {
        self.lock().peers.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().peers.is_empty()
    }
}
