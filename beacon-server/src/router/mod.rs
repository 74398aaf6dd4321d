mod message_router;
mod route_outcome;

pub use message_router::*;
pub use route_outcome::*;
