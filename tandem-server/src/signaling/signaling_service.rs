use crate::registry::RoomRegistry;
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tandem_core::{ConnectionId, IceServerConfig, SignalMessage};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

struct SignalingInner {
    peers: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
    registry: RoomRegistry,
    ice_servers: Vec<IceServerConfig>,
}

/// Stateless message router: forwards signaling envelopes from a sender's
/// connection to a named target connection without interpreting the payload.
/// Room admission is the one place it consults state, via [`RoomRegistry`].
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                registry: RoomRegistry::new(),
                ice_servers,
            }),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.inner.registry
    }

    pub fn add_peer(&self, connection_id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(connection_id, tx);
    }

    /// Drops the connection from the peer table and every room. Late
    /// envelopes addressed to it will miss the lookup and be discarded.
    pub fn disconnect(&self, connection_id: &ConnectionId) {
        self.inner.registry.leave(connection_id);
        self.inner.peers.remove(connection_id);
    }

    pub fn send_ice_config(&self, connection_id: &ConnectionId) {
        self.send_signal(
            connection_id,
            SignalMessage::IceConfig {
                ice_servers: self.inner.ice_servers.clone(),
            },
        );
    }

    pub fn send_signal(&self, connection_id: &ConnectionId, msg: SignalMessage) {
        if let Some(peer) = self.inner.peers.get(connection_id) {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!("Failed to send WS message to {}: {:?}", connection_id, e);
                    }
                }
                Err(e) => error!("Failed to serialize signal message: {}", e),
            }
        } else {
            debug!("Dropping envelope for disconnected target {}", connection_id);
        }
    }

    /// Entry point for one parsed-or-not text frame from a connection.
    /// Malformed payloads are logged and dropped, never fatal.
    pub fn handle_incoming(&self, sender: &ConnectionId, text: &str) {
        let msg: SignalMessage = match serde_json::from_str(text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Invalid SignalMessage from {}: {:?}", sender, e);
                return;
            }
        };

        match msg {
            SignalMessage::RoomJoin { room, display_name } => {
                self.handle_join(sender, &room, &display_name);
            }
            msg if msg.target().is_some() => self.relay(sender, msg),
            other => {
                warn!("Unexpected client envelope from {}: {:?}", sender, other);
            }
        }
    }

    /// Admits the sender to the room, broadcasting `UserJoined` to the other
    /// members and acknowledging with `RoomJoined`. The registry reflects the
    /// new member before the broadcast goes out, so a concurrent join sees an
    /// up-to-date count.
    pub fn handle_join(&self, sender: &ConnectionId, room: &str, display_name: &str) {
        match self
            .inner
            .registry
            .join(sender.clone(), room, display_name)
        {
            Ok(()) => {
                info!("Peer {} joined room '{}'", sender, room);

                for member in self.inner.registry.members(room) {
                    if member.connection_id != *sender {
                        self.send_signal(
                            &member.connection_id,
                            SignalMessage::UserJoined {
                                connection_id: sender.clone(),
                                display_name: display_name.to_string(),
                            },
                        );
                    }
                }

                self.send_signal(
                    sender,
                    SignalMessage::RoomJoined {
                        connection_id: sender.clone(),
                        room: room.to_string(),
                        display_name: display_name.to_string(),
                    },
                );
            }
            Err(e) => {
                warn!("Join rejected for {}: {}", sender, e);
                self.send_signal(
                    sender,
                    SignalMessage::Error {
                        message: e.to_string(),
                    },
                );
            }
        }
    }

    /// Forwards a peer-directed envelope verbatim, rewriting only its `peer`
    /// field to the sender. No buffering, no retry: a missing target means
    /// the envelope is dropped.
    pub fn relay(&self, sender: &ConnectionId, msg: SignalMessage) {
        let Some(target) = msg.target().cloned() else {
            warn!("Envelope without a target from {}: {:?}", sender, msg);
            return;
        };

        if let SignalMessage::EvictionNotice { .. } = &msg {
            // Hang-up clears both sides of the room whether or not the
            // evictee is still reachable.
            self.inner.registry.evict(&target, sender);
        }

        self.send_signal(&target, msg.readdressed(sender.clone()));
    }
}
