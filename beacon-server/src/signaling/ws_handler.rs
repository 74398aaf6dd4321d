use crate::error::RelayError;
use crate::signaling::SignalingService;
use crate::transport::{Inbound, Session};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{ConnectInfo, Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use beacon_core::{Frame, InvalidPeerId, PeerId};
use futures::{SinkExt, StreamExt, future};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use tokio::sync::mpsc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct JoinParams {
    pub id: Option<String>,
}

/// `GET /ws?id=<peer-id>`: join the relay over a WebSocket.
///
/// The id is checked before the upgrade; a missing or empty id is answered
/// with `400 Bad Request`.
pub async fn ws_handler(
    State(service): State<SignalingService>,
    Query(params): Query<JoinParams>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let peer_id = match params.id.ok_or(InvalidPeerId).and_then(|id| PeerId::parse(id)) {
        Ok(peer_id) => peer_id,
        Err(e) => return RelayError::from(e).into_response(),
    };

    let client_ip = client_ip(&headers, remote);

    ws.on_upgrade(move |socket| handle_socket(socket, peer_id, client_ip, service))
        .into_response()
}

async fn handle_socket(
    socket: WebSocket,
    peer_id: PeerId,
    client_ip: IpAddr,
    service: SignalingService,
) {
    info!("New WebSocket connection: {} from {}", peer_id, client_ip);

    let (sender, receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = service.join(peer_id, tx);

    let inbound = receiver.filter_map(|msg| future::ready(inbound_from_ws(msg)));
    let sink = sender.with(|frame: Frame| future::ready(Ok::<_, axum::Error>(frame_to_ws(frame))));

    let mut session = Session::new(service, handle.clone());
    let end = session.run(rx, inbound, sink).await;

    info!(
        "WebSocket disconnected: {} ({:?}, {} frames routed)",
        handle.peer_id(),
        end.reason,
        end.frames_routed
    );
}

fn inbound_from_ws(msg: Result<Message, axum::Error>) -> Option<Result<Inbound, axum::Error>> {
    match msg {
        Ok(Message::Text(text)) => Some(Ok(Inbound::Frame(Frame::Text(text.as_str().to_owned())))),
        Ok(Message::Binary(data)) => Some(Ok(Inbound::Frame(Frame::Binary(data)))),
        Ok(Message::Close(_)) => Some(Ok(Inbound::Close)),
        Ok(Message::Ping(_) | Message::Pong(_)) => None,
        Err(e) => Some(Err(e)),
    }
}

fn frame_to_ws(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text.into()),
        Frame::Binary(data) => Message::Binary(data),
    }
}

/// Address used for logging: the first `X-Forwarded-For` entry when a proxy
/// sets one, otherwise the socket peer.
pub fn client_ip(headers: &HeaderMap, remote: SocketAddr) -> IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse().ok())
        .unwrap_or_else(|| remote.ip())
}
