use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

/// Returned when a caller-supplied peer id is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("peer id must not be empty")]
pub struct InvalidPeerId;

/// Caller-chosen identifier of a peer.
///
/// The relay treats the value as opaque. Deserialization is transparent and
/// does not validate, so an empty `dstId` on the wire still parses; use
/// [`PeerId::parse`] where an identifier is accepted from a client.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    pub fn parse(s: impl Into<String>) -> Result<Self, InvalidPeerId> {
        let s = s.into();
        if s.is_empty() {
            return Err(InvalidPeerId);
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<&str> for PeerId {
    type Error = InvalidPeerId;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PeerId {
    type Error = InvalidPeerId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl Borrow<str> for PeerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
