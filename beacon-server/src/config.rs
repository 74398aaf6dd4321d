use std::net::{Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 6969;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime settings of the relay process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Address the HTTP/WebSocket listener binds to.
    pub listen: SocketAddr,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
