use anyhow::{Context, Result};
use beacon_core::SignalMessage;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::signal_helpers::RECV_TIMEOUT_MS;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A peer talking to the relay over a real WebSocket.
pub struct TestClient {
    /// The id this client joined with.
    pub peer_id: String,
    ws: WsStream,
}

impl TestClient {
    /// Join the relay at `addr` as `peer_id`.
    pub async fn connect(addr: SocketAddr, peer_id: &str) -> Result<Self> {
        let url = format!("ws://{addr}/ws?id={peer_id}");
        let (ws, _response) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect as {peer_id}"))?;

        tracing::debug!("[TestClient] Connected as {}", peer_id);

        Ok(Self {
            peer_id: peer_id.to_string(),
            ws,
        })
    }

    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.ws
            .send(Message::text(text))
            .await
            .context("Failed to send text frame")
    }

    pub async fn send_binary(&mut self, data: &[u8]) -> Result<()> {
        self.ws
            .send(Message::binary(data.to_vec()))
            .await
            .context("Failed to send binary frame")
    }

    /// Next data frame from the relay, skipping pings.
    pub async fn recv_raw(&mut self) -> Result<Message> {
        loop {
            let next = tokio::time::timeout(Duration::from_millis(RECV_TIMEOUT_MS), self.ws.next())
                .await
                .context("Timeout waiting for message")?;

            let msg = next
                .context("Connection ended")?
                .context("WebSocket error")?;

            match msg {
                Message::Ping(_) | Message::Pong(_) => continue,
                Message::Close(_) => anyhow::bail!("Connection closed by relay"),
                other => return Ok(other),
            }
        }
    }

    pub async fn recv_message(&mut self) -> Result<SignalMessage> {
        let msg = self.recv_raw().await?;
        let parsed = match &msg {
            Message::Text(text) => serde_json::from_str(text.as_str())?,
            Message::Binary(data) => serde_json::from_slice(data)?,
            other => anyhow::bail!("Unexpected frame: {:?}", other),
        };
        Ok(parsed)
    }

    /// Succeeds when the relay closes this connection within the timeout.
    pub async fn expect_closed(&mut self) -> Result<()> {
        let deadline = Duration::from_millis(RECV_TIMEOUT_MS);

        tokio::time::timeout(deadline, async {
            loop {
                match self.ws.next().await {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                    Some(Ok(_)) => continue,
                }
            }
        })
        .await
        .context("Connection was not closed by the relay")
    }

    /// Fails if any data frame arrives within `window_ms`.
    pub async fn expect_silence(&mut self, window_ms: u64) -> Result<()> {
        match tokio::time::timeout(Duration::from_millis(window_ms), self.recv_raw()).await {
            Err(_) => Ok(()),
            Ok(Ok(msg)) => anyhow::bail!("Unexpected frame: {:?}", msg),
            Ok(Err(e)) => Err(e),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.ws
            .close(None)
            .await
            .context("Failed to close WebSocket")
    }
}

impl Drop for TestClient {
    fn drop(&mut self) {
        tracing::debug!("[TestClient] Dropping client {}", self.peer_id);
    }
}
