//! Signaling relay: a peer registry and message router that lets peers find
//! each other and exchange offers/answers over WebSockets.

pub mod config;
pub mod error;
pub mod registry;
pub mod router;
pub mod server;
pub mod signaling;
pub mod transport;

pub use config::RelayConfig;
pub use error::RelayError;
pub use registry::*;
pub use router::*;
pub use server::{app, bind, serve};
pub use signaling::*;
pub use transport::*;
