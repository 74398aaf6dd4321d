use crate::registry::PeerHandle;
use crate::router::{DropReason, RouteOutcome};
use crate::signaling::SignalingService;
use crate::transport::Inbound;
use beacon_core::Frame;
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::fmt;
use std::pin::pin;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Upper bound on the close handshake of a superseded connection.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Superseded,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// The remote side closed the connection or the stream ended.
    RemoteClosed,
    TransportFailure(String),
    /// A newer registration took over the peer id.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnd {
    pub reason: EndReason,
    pub frames_routed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendEnd {
    /// The handle was superseded; the sink was closed, or abandoned if it
    /// had stopped accepting frames.
    Closed,
    /// Every queue sender was dropped.
    Drained,
    Failed(String),
}

/// Lifecycle of one peer connection.
///
/// Frames from the connection are routed strictly in arrival order. The
/// session ends when the remote closes, the transport fails, or the peer id
/// is registered again elsewhere; in every case it unregisters its own
/// handle, which is a no-op once superseded.
pub struct Session {
    service: SignalingService,
    handle: PeerHandle,
    state: SessionState,
    frames_routed: usize,
}

impl Session {
    pub fn new(service: SignalingService, handle: PeerHandle) -> Self {
        Self {
            service,
            handle,
            state: SessionState::Active,
            frames_routed: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive both halves of the connection until one of them stops. The
    /// session is `Closed` afterwards.
    pub async fn run<S, E, W>(
        &mut self,
        outbound: mpsc::UnboundedReceiver<Frame>,
        inbound: S,
        sink: W,
    ) -> SessionEnd
    where
        S: Stream<Item = Result<Inbound, E>>,
        E: fmt::Display,
        W: Sink<Frame>,
        W::Error: fmt::Display,
    {
        let superseded = self.handle.superseded();

        let reason = tokio::select! {
            reason = self.receive_loop(inbound) => reason,
            sent = send_loop(outbound, sink, superseded) => match sent {
                SendEnd::Closed => EndReason::Superseded,
                SendEnd::Drained => EndReason::RemoteClosed,
                SendEnd::Failed(e) => EndReason::TransportFailure(e),
            },
        };

        self.finish(reason)
    }

    /// Route inbound frames until the connection closes or the session is
    /// superseded.
    pub async fn receive_loop<S, E>(&mut self, inbound: S) -> EndReason
    where
        S: Stream<Item = Result<Inbound, E>>,
        E: fmt::Display,
    {
        let mut inbound = pin!(inbound);

        while self.state == SessionState::Active {
            match inbound.next().await {
                Some(Ok(Inbound::Frame(frame))) => self.on_frame(frame),
                Some(Ok(Inbound::Close)) | None => return EndReason::RemoteClosed,
                Some(Err(e)) => {
                    warn!("Receive error for {}: {}", self.handle.peer_id(), e);
                    return EndReason::TransportFailure(e.to_string());
                }
            }
        }

        EndReason::Superseded
    }

    fn on_frame(&mut self, frame: Frame) {
        match self.service.route(&self.handle, frame) {
            RouteOutcome::Delivered(_) => self.frames_routed += 1,
            RouteOutcome::Dropped(DropReason::Superseded) => {
                info!(
                    "Session for {} (generation {}) was superseded",
                    self.handle.peer_id(),
                    self.handle.generation()
                );
                self.state = SessionState::Superseded;
            }
            RouteOutcome::Dropped(_) => {}
        }
    }

    fn finish(&mut self, reason: EndReason) -> SessionEnd {
        if reason == EndReason::Superseded {
            self.state = SessionState::Superseded;
        }

        let removed = self.service.leave(&self.handle);
        debug!(
            "Session for {} closed: {:?} (unregistered: {})",
            self.handle.peer_id(),
            reason,
            removed
        );
        self.state = SessionState::Closed;

        SessionEnd {
            reason,
            frames_routed: self.frames_routed,
        }
    }
}

/// Drain a peer's outbound queue into its transport sink, in queue order.
///
/// Supersession wins over queued frames and over a send the sink is not
/// accepting, so a peer that stopped reading is still let go.
pub async fn send_loop<W>(
    mut outbound: mpsc::UnboundedReceiver<Frame>,
    sink: W,
    superseded: CancellationToken,
) -> SendEnd
where
    W: Sink<Frame>,
    W::Error: fmt::Display,
{
    let mut sink = pin!(sink);

    loop {
        let frame = tokio::select! {
            biased;
            _ = superseded.cancelled() => break,
            frame = outbound.recv() => match frame {
                Some(frame) => frame,
                None => return SendEnd::Drained,
            },
        };

        tokio::select! {
            biased;
            _ = superseded.cancelled() => return SendEnd::Closed,
            sent = sink.send(frame) => {
                if let Err(e) = sent {
                    return SendEnd::Failed(e.to_string());
                }
            }
        }
    }

    if tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await.is_err() {
        debug!("Close handshake timed out");
    }
    SendEnd::Closed
}
