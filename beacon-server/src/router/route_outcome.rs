use beacon_core::PeerId;

/// What happened to a frame handed to [`MessageRouter::route`].
///
/// [`MessageRouter::route`]: crate::router::MessageRouter::route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Forwarded verbatim to the connection of this peer.
    Delivered(PeerId),
    Dropped(DropReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The frame is not a signaling message.
    Malformed,
    /// Broadcast, or a directed kind with an absent or empty `dstId`.
    NoDestination,
    /// The destination is not registered.
    UnknownPeer,
    /// The sender's connection has been replaced by a newer registration.
    Superseded,
    /// The destination's connection is already gone.
    Transport,
}

impl RouteOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, RouteOutcome::Delivered(_))
    }
}
