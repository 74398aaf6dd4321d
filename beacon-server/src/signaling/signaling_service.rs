use crate::registry::{PeerHandle, PeerRegistry, Registration};
use crate::router::{MessageRouter, RouteOutcome};
use beacon_core::{Frame, PeerId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

struct SignalingInner {
    registry: Arc<PeerRegistry>,
    router: MessageRouter,
}

/// Shared handle to the relay: one registry and the router working on it.
///
/// Cheap to clone; every connection task holds one.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalingService {
    pub fn new() -> Self {
        let registry = Arc::new(PeerRegistry::new());
        Self {
            inner: Arc::new(SignalingInner {
                router: MessageRouter::new(registry.clone()),
                registry,
            }),
        }
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.inner.registry
    }

    /// Register a connection for `peer_id` and announce it.
    ///
    /// A connection already registered under the same id is closed first.
    pub fn join(&self, peer_id: PeerId, outbound: mpsc::UnboundedSender<Frame>) -> PeerHandle {
        let Registration { handle, superseded } =
            self.inner.registry.register(peer_id, outbound);

        info!(
            "Peer {} joined (generation {}, replaced: {})",
            handle.peer_id(),
            handle.generation(),
            superseded.is_some()
        );

        self.inner.router.on_join(handle.peer_id());
        self.inner.router.broadcast_presence();

        handle
    }

    /// Unregister `handle` if it is still current and announce the new
    /// membership. Returns whether the peer was removed.
    pub fn leave(&self, handle: &PeerHandle) -> bool {
        if !self.inner.registry.unregister(handle) {
            return false;
        }

        info!("Peer {} left", handle.peer_id());
        self.inner.router.broadcast_presence();
        true
    }

    pub fn route(&self, sender: &PeerHandle, frame: Frame) -> RouteOutcome {
        self.inner.router.route(sender, frame)
    }

    /// Currently registered peer ids, sorted.
    pub fn peers(&self) -> Vec<PeerId> {
        self.inner.registry.snapshot()
    }
}
