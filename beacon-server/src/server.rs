use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::signaling::{
    SignalingService, health_handler, peers_handler, peers_preflight, ws_handler,
};
use axum::Router;
use axum::routing::get;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// HTTP surface of the relay.
pub fn app(service: SignalingService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/peers", get(peers_handler).options(peers_preflight))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(service)
}

pub async fn bind(config: &RelayConfig) -> Result<TcpListener, RelayError> {
    Ok(TcpListener::bind(config.listen).await?)
}

/// Serve the relay on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    service: SignalingService,
    shutdown: F,
) -> Result<(), RelayError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("Signaling relay listening on http://{}", addr);

    axum::serve(
        listener,
        app(service).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    info!("Signaling relay stopped");
    Ok(())
}
