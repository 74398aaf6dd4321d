use crate::error::RelayError;
use beacon_core::{Frame, PeerId};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Routing handle for one registered connection.
///
/// The handle holds the sending side of the peer's outbound queue and the
/// token its session watches for supersession; the socket itself stays with
/// its session. `generation` identifies the registration the handle was
/// issued for.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    peer_id: PeerId,
    generation: u64,
    outbound: mpsc::UnboundedSender<Frame>,
    superseded: CancellationToken,
}

impl PeerHandle {
    pub(crate) fn new(
        peer_id: PeerId,
        generation: u64,
        outbound: mpsc::UnboundedSender<Frame>,
    ) -> Self {
        Self {
            peer_id,
            generation,
            outbound,
            superseded: CancellationToken::new(),
        }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Queue a frame for delivery. Never blocks.
    pub fn send(&self, frame: Frame) -> Result<(), RelayError> {
        self.outbound.send(frame).map_err(|_| {
            RelayError::TransportFailure(format!("connection of {} is closed", self.peer_id))
        })
    }

    /// Tell the owning session to close the connection now, ahead of any
    /// frames still queued for it.
    pub(crate) fn close(&self) {
        self.superseded.cancel();
    }

    /// Token cancelled once a newer registration replaced this one.
    pub fn superseded(&self) -> CancellationToken {
        self.superseded.clone()
    }

    pub fn is_superseded(&self) -> bool {
        self.superseded.is_cancelled()
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}
