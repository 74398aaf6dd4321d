use crate::error::RelayError;
use crate::registry::{PeerHandle, PeerRegistry, Superseded};
use crate::router::{DropReason, RouteOutcome};
use beacon_core::{Frame, PeerId, SignalMessage};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, warn};

/// Dispatches frames between registered peers and fans out presence.
///
/// Fan-out works on handles cloned out of the registry, so the registry lock
/// is never held while frames are queued, and a failed send to one peer does
/// not stop delivery to the rest.
#[derive(Clone)]
pub struct MessageRouter {
    registry: Arc<PeerRegistry>,
    /// Held from presence snapshot to the last enqueue, so broadcasts reach
    /// every queue in snapshot order.
    presence: Arc<Mutex<()>>,
}

impl MessageRouter {
    pub fn new(registry: Arc<PeerRegistry>) -> Self {
        Self {
            registry,
            presence: Arc::new(Mutex::new(())),
        }
    }

    /// Tell every other peer that `joined` is present. Returns the number of
    /// peers the notification was queued for.
    pub fn on_join(&self, joined: &PeerId) -> usize {
        let recipients: Vec<PeerHandle> = self
            .registry
            .handles()
            .into_iter()
            .filter(|handle| handle.peer_id() != joined)
            .collect();

        let mut delivered = 0;
        for recipient in recipients {
            let notice = SignalMessage::peer_joined(joined.clone(), recipient.peer_id().clone());
            match notice.to_frame() {
                Ok(frame) => {
                    if self.deliver(&recipient, frame) {
                        delivered += 1;
                    }
                }
                Err(e) => error!("Failed to serialize join notice: {}", e),
            }
        }
        delivered
    }

    /// Send the current membership to every registered peer.
    ///
    /// A broadcast queued later never carries an older membership than one
    /// queued before it.
    pub fn broadcast_presence(&self) -> usize {
        let _order = self.presence.lock().unwrap_or_else(PoisonError::into_inner);
        let recipients = self.registry.handles();

        let mut peers: Vec<PeerId> = recipients.iter().map(|h| h.peer_id().clone()).collect();
        peers.sort();

        let frame = match SignalMessage::presence(peers).to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to serialize presence broadcast: {}", e);
                return 0;
            }
        };

        let mut delivered = 0;
        for recipient in &recipients {
            if self.deliver(recipient, frame.clone()) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Forward `frame` from `sender` to the peer named in its `dstId`.
    ///
    /// The frame is forwarded as received. Nothing is reported back to the
    /// sender when the frame is dropped.
    pub fn route(&self, sender: &PeerHandle, frame: Frame) -> RouteOutcome {
        let message = match SignalMessage::from_frame(&frame) {
            Ok(message) => message,
            Err(e) => {
                warn!(
                    "Dropping frame from {}: {}",
                    sender.peer_id(),
                    RelayError::from(e)
                );
                return RouteOutcome::Dropped(DropReason::Malformed);
            }
        };

        let Some(destination) = message.destination() else {
            debug!(
                "Dropping {} from {} without destination",
                message.kind(),
                sender.peer_id()
            );
            return RouteOutcome::Dropped(DropReason::NoDestination);
        };

        let target = match self.registry.lookup_as(sender, destination) {
            Ok(Some(target)) => target,
            Ok(None) => {
                debug!(
                    "Dropping {} from {}: {} is not connected",
                    message.kind(),
                    sender.peer_id(),
                    destination
                );
                return RouteOutcome::Dropped(DropReason::UnknownPeer);
            }
            Err(Superseded) => return RouteOutcome::Dropped(DropReason::Superseded),
        };

        debug!(
            "Routing {} {} -> {} ({} bytes)",
            message.kind(),
            sender.peer_id(),
            destination,
            frame.len()
        );

        if self.deliver(&target, frame) {
            RouteOutcome::Delivered(destination.clone())
        } else {
            RouteOutcome::Dropped(DropReason::Transport)
        }
    }

    fn deliver(&self, recipient: &PeerHandle, frame: Frame) -> bool {
        match recipient.send(frame) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to send to {}: {}", recipient.peer_id(), e);
                false
            }
        }
    }
}
