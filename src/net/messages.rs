//! RPC payloads, delivery filters and the JSON wire envelope.
use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Identifies one connected peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    pub const HOST: Self = Self(0);
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Connection that owns an entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkOwner(pub ConnectionId);

/// Whether this process simulates the world or only mirrors it.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkRole {
    #[default]
    Host,
    Client,
}

impl NetworkRole {
    pub fn is_host(self) -> bool {
        matches!(self, Self::Host)
    }
}

/// The connection this process speaks for.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalConnection(pub ConnectionId);

impl Default for LocalConnection {
    fn default() -> Self {
        Self(ConnectionId::HOST)
    }
}

/// Messages a birb sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BirbNetMessage {
    Pooping,
    Error { message: String },
}

impl BirbNetMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Which connections receive an RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcFilter {
    Everyone,
    Only(ConnectionId),
}

impl RpcFilter {
    pub fn includes(&self, connection: ConnectionId) -> bool {
        match self {
            Self::Everyone => true,
            Self::Only(only) => *only == connection,
        }
    }
}

/// What actually crosses the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcEnvelope {
    pub filter: RpcFilter,
    pub message: BirbNetMessage,
}

/// Failure to encode or decode an [`RpcEnvelope`].
#[derive(Debug)]
pub struct RpcCodecError(serde_json::Error);

impl fmt::Display for RpcCodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPC codec failure: {}", self.0)
    }
}

impl std::error::Error for RpcCodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl RpcEnvelope {
    pub fn encode(&self) -> Result<String, RpcCodecError> {
        serde_json::to_string(self).map_err(RpcCodecError)
    }

    pub fn decode(wire: &str) -> Result<Self, RpcCodecError> {
        serde_json::from_str(wire).map_err(RpcCodecError)
    }
}

/// Queued by gameplay code; delivered by the transport.
#[derive(Event, Message, Debug, Clone)]
pub struct OutgoingRpc(pub RpcEnvelope);

impl OutgoingRpc {
    pub fn to(connection: ConnectionId, message: BirbNetMessage) -> Self {
        Self(RpcEnvelope {
            filter: RpcFilter::Only(connection),
            message,
        })
    }

    #[cfg(test)]
    pub fn broadcast(message: BirbNetMessage) -> Self {
        Self(RpcEnvelope {
            filter: RpcFilter::Everyone,
            message,
        })
    }
}

/// An RPC that arrived for the local connection.
#[derive(Event, Message, Debug, Clone)]
pub struct IncomingRpc(pub BirbNetMessage);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_only_matches_one_connection() {
        let filter = RpcFilter::Only(ConnectionId(3));
        assert!(filter.includes(ConnectionId(3)));
        assert!(!filter.includes(ConnectionId::HOST));
        assert!(RpcFilter::Everyone.includes(ConnectionId(42)));
    }

    #[test]
    fn envelope_survives_the_wire() {
        let envelope = RpcEnvelope {
            filter: RpcFilter::Only(ConnectionId(9)),
            message: BirbNetMessage::error("no prop"),
        };
        let wire = envelope.encode().unwrap();
        assert!(wire.contains("\"kind\":\"error\""));
        assert_eq!(RpcEnvelope::decode(&wire).unwrap(), envelope);
    }

    #[test]
    fn garbage_is_a_codec_error() {
        let err = RpcEnvelope::decode("{not json").unwrap_err();
        assert!(err.to_string().starts_with("RPC codec failure"));
    }
}
