mod peer_handle;
mod peer_registry;

pub use peer_handle::*;
pub use peer_registry::*;
