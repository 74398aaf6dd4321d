use crate::model::frame::Frame;
use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Signal,
    Broadcast,
    Offer,
    Answer,
    Ice,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Signal => "signal",
            MessageKind::Broadcast => "broadcast",
            MessageKind::Offer => "offer",
            MessageKind::Answer => "answer",
            MessageKind::Ice => "ice",
        };
        f.write_str(name)
    }
}

/// Signaling envelope exchanged between peers through the relay.
///
/// The relay only reads `type`, `srcId` and `dstId`. Payloads (`offer`,
/// `answer`, `ice`) are opaque to it and kept as raw JSON values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum SignalMessage {
    /// Sent by the relay to existing peers when a new peer joins.
    Signal {
        src_id: PeerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dst_id: Option<PeerId>,
    },
    /// Full membership snapshot.
    Broadcast {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        src_id: Option<PeerId>,
        #[serde(default)]
        peers: Vec<PeerId>,
    },
    Offer {
        src_id: PeerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dst_id: Option<PeerId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offer: Option<Value>,
    },
    Answer {
        src_id: PeerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dst_id: Option<PeerId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        answer: Option<Value>,
    },
    Ice {
        src_id: PeerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dst_id: Option<PeerId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ice: Option<Value>,
    },
}

impl SignalMessage {
    /// Notification telling `recipient` that `joined` is now present.
    pub fn peer_joined(joined: PeerId, recipient: PeerId) -> Self {
        SignalMessage::Signal {
            src_id: joined,
            dst_id: Some(recipient),
        }
    }

    pub fn presence(peers: Vec<PeerId>) -> Self {
        SignalMessage::Broadcast {
            src_id: None,
            peers,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            SignalMessage::Signal { .. } => MessageKind::Signal,
            SignalMessage::Broadcast { .. } => MessageKind::Broadcast,
            SignalMessage::Offer { .. } => MessageKind::Offer,
            SignalMessage::Answer { .. } => MessageKind::Answer,
            SignalMessage::Ice { .. } => MessageKind::Ice,
        }
    }

    pub fn source(&self) -> Option<&PeerId> {
        match self {
            SignalMessage::Broadcast { src_id, .. } => src_id.as_ref(),
            SignalMessage::Signal { src_id, .. }
            | SignalMessage::Offer { src_id, .. }
            | SignalMessage::Answer { src_id, .. }
            | SignalMessage::Ice { src_id, .. } => Some(src_id),
        }
    }

    /// Destination of a directed message. Broadcasts and messages with an
    /// absent or empty `dstId` have none.
    pub fn destination(&self) -> Option<&PeerId> {
        let dst_id = match self {
            SignalMessage::Broadcast { .. } => return None,
            SignalMessage::Signal { dst_id, .. }
            | SignalMessage::Offer { dst_id, .. }
            | SignalMessage::Answer { dst_id, .. }
            | SignalMessage::Ice { dst_id, .. } => dst_id.as_ref(),
        };
        dst_id.filter(|id| !id.is_empty())
    }

    pub fn is_directed(&self) -> bool {
        self.destination().is_some()
    }

    pub fn from_frame(frame: &Frame) -> serde_json::Result<Self> {
        serde_json::from_slice(frame.as_bytes())
    }

    pub fn to_frame(&self) -> serde_json::Result<Frame> {
        serde_json::to_string(self).map(Frame::Text)
    }
}
