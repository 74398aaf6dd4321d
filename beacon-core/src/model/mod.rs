mod frame;
mod peer;
mod signaling;

pub use frame::Frame;
pub use peer::{InvalidPeerId, PeerId};
pub use signaling::{MessageKind, SignalMessage};
