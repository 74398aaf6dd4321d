use anyhow::{Context, Result};
use beacon_server::config::{DEFAULT_LOG_FILTER, DEFAULT_PORT};
use beacon_server::{RelayConfig, SignalingService, bind, serve};
use clap::Parser;
use colored::*;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "beacon")]
#[command(about = "WebSocket signaling relay for WebRTC peers", version)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "BEACON_LISTEN", default_value_t = default_listen())]
    listen: SocketAddr,

    /// Log filter, e.g. `info` or `beacon_server=debug`.
    #[arg(long = "log", env = "BEACON_LOG", default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
}

impl From<Cli> for RelayConfig {
    fn from(cli: Cli) -> Self {
        RelayConfig {
            listen: cli.listen,
            log_filter: cli.log_filter,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = RelayConfig::from(Cli::parse());

    let filter = EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("Invalid log filter {:?}", config.log_filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("{}", "📡 Starting Beacon relay...".green().bold());

    let listener = bind(&config)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;

    println!("   🔌 WebSocket: ws://{}/ws?id=<peer>", config.listen);
    println!("   📋 Peers:     http://{}/peers", config.listen);

    serve(listener, SignalingService::new(), shutdown_signal())
        .await
        .context("Relay stopped with an error")?;

    info!("Bye");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
