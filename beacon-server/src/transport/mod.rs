mod inbound;
mod session;

pub use inbound::*;
pub use session::*;
