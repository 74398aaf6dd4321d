use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use beacon_core::{PeerId, SignalMessage};

use super::test_client::TestClient;

/// Timeout for a single frame to arrive (ms).
pub const RECV_TIMEOUT_MS: u64 = 5000;

/// Window in which no frame may arrive for a silence check (ms).
pub const SILENCE_WINDOW_MS: u64 = 300;

/// Timeout for the relay to stop after shutdown is requested (ms).
pub const SHUTDOWN_TIMEOUT_MS: u64 = 2000;

pub fn peer(id: &str) -> PeerId {
    PeerId::parse(id).expect("valid peer id")
}

pub fn peers(ids: &[&str]) -> Vec<PeerId> {
    ids.iter().map(|id| peer(id)).collect()
}

/// Offer frame as a browser client would send it.
pub fn offer_json(src: &str, dst: &str, sdp: &str) -> String {
    serde_json::json!({
        "type": "offer",
        "srcId": src,
        "dstId": dst,
        "offer": { "type": "offer", "sdp": sdp },
    })
    .to_string()
}

pub fn ice_json(src: &str, dst: &str, candidate: &str) -> String {
    serde_json::json!({
        "type": "ice",
        "srcId": src,
        "dstId": dst,
        "ice": { "candidate": candidate, "sdpMid": "0" },
    })
    .to_string()
}

/// Read frames until a presence broadcast listing exactly `expected` arrives.
pub async fn wait_for_presence(client: &mut TestClient, expected: &[&str]) -> Result<()> {
    let expected = SignalMessage::presence(peers(expected));

    loop {
        let message = client
            .recv_message()
            .await
            .with_context(|| format!("{} never saw {:?}", client.peer_id, expected))?;

        tracing::debug!("[SignalHelper] {} received {:?}", client.peer_id, message);

        if message == expected {
            return Ok(());
        }
    }
}

pub struct HttpResponse {
    pub status: u16,
    /// Header section, lowercased.
    pub head: String,
    pub body: String,
}

/// Minimal HTTP/1.1 request over a fresh connection.
pub async fn http_request(addr: SocketAddr, method: &str, path: &str) -> Result<HttpResponse> {
    let mut stream = TcpStream::connect(addr)
        .await
        .context("Failed to connect for HTTP request")?;

    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nOrigin: http://example.com\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await?;

    let mut raw = Vec::new();
    tokio::time::timeout(
        Duration::from_millis(RECV_TIMEOUT_MS),
        stream.read_to_end(&mut raw),
    )
    .await
    .context("Timeout waiting for HTTP response")??;

    let response = String::from_utf8(raw).context("Response is not UTF-8")?;
    let status = response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .context("Malformed status line")?;
    let (head, body) = response
        .split_once("\r\n\r\n")
        .unwrap_or((response.as_str(), ""));

    Ok(HttpResponse {
        status,
        head: head.to_ascii_lowercase(),
        body: body.to_string(),
    })
}
