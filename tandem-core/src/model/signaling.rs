use crate::model::connection::ConnectionId;
use crate::model::sdp::SessionDescription;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Why a participant announced its departure.
///
/// Replaces the pair of status flags the wire protocol used to thread
/// through disconnect messages; the receiving lifecycle reads it once to
/// choose its next phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepartureReason {
    /// The user ended the call.
    Hangup,
    /// The user is switching cameras and will renegotiate shortly.
    CameraSwitch,
}

/// Signaling envelopes exchanged through the relay.
///
/// Peer-directed variants carry a `peer` field: the target connection when
/// sent client-to-server, rewritten to the sender's connection when the
/// relay forwards it. The payload is otherwise relayed verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum SignalMessage {
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    RoomJoin {
        room: String,
        display_name: String,
    },
    RoomJoined {
        connection_id: ConnectionId,
        room: String,
        display_name: String,
    },
    UserJoined {
        connection_id: ConnectionId,
        display_name: String,
    },
    Error {
        message: String,
    },
    CallOffer {
        peer: ConnectionId,
        description: SessionDescription,
        display_name: String,
    },
    CallAnswer {
        peer: ConnectionId,
        description: SessionDescription,
    },
    RenegotiationOffer {
        peer: ConnectionId,
        description: SessionDescription,
    },
    RenegotiationAnswer {
        peer: ConnectionId,
        description: SessionDescription,
    },
    /// The negotiation round is finished; the receiving side may now attach
    /// its own tracks.
    RenegotiationComplete {
        peer: ConnectionId,
    },
    DisconnectNotice {
        peer: ConnectionId,
        display_name: String,
        reason: DepartureReason,
    },
    EvictionNotice {
        peer: ConnectionId,
        display_name: String,
    },
}

impl SignalMessage {
    /// The connection this envelope is addressed to, for peer-directed kinds.
    pub fn target(&self) -> Option<&ConnectionId> {
        match self {
            SignalMessage::CallOffer { peer, .. }
            | SignalMessage::CallAnswer { peer, .. }
            | SignalMessage::RenegotiationOffer { peer, .. }
            | SignalMessage::RenegotiationAnswer { peer, .. }
            | SignalMessage::RenegotiationComplete { peer }
            | SignalMessage::DisconnectNotice { peer, .. }
            | SignalMessage::EvictionNotice { peer, .. } => Some(peer),
            _ => None,
        }
    }

    /// Rewrites the `peer` field to the sending connection before forwarding,
    /// so the receiver learns who the envelope came from.
    pub fn readdressed(mut self, from: ConnectionId) -> Self {
        match &mut self {
            SignalMessage::CallOffer { peer, .. }
            | SignalMessage::CallAnswer { peer, .. }
            | SignalMessage::RenegotiationOffer { peer, .. }
            | SignalMessage::RenegotiationAnswer { peer, .. }
            | SignalMessage::RenegotiationComplete { peer }
            | SignalMessage::DisconnectNotice { peer, .. }
            | SignalMessage::EvictionNotice { peer, .. } => *peer = from,
            _ => {}
        }
        self
    }
}
