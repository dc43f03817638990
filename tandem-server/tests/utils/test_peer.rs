use anyhow::{Context, Result};
use axum::extract::ws::Message;
use std::time::Duration;
use tandem_core::{ConnectionId, SignalMessage};
use tandem_server::SignalingService;
use tokio::sync::mpsc;

/// A fake connected client: registered in the service's peer table through
/// the same channel a live WebSocket would use, driving the service via
/// `handle_incoming` and reading back whatever the relay sends it.
pub struct TestPeer {
    pub connection_id: ConnectionId,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl TestPeer {
    pub fn connect(service: &SignalingService) -> Self {
        let connection_id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        service.add_peer(connection_id.clone(), tx);
        Self { connection_id, rx }
    }

    pub fn send(&self, service: &SignalingService, msg: &SignalMessage) {
        let json = serde_json::to_string(msg).expect("serializable signal");
        service.handle_incoming(&self.connection_id, &json);
    }

    pub fn join(&self, service: &SignalingService, room: &str, display_name: &str) {
        self.send(
            service,
            &SignalMessage::RoomJoin {
                room: room.to_string(),
                display_name: display_name.to_string(),
            },
        );
    }

    /// Next signal delivered to this peer, or an error after a short wait.
    pub async fn recv(&mut self) -> Result<SignalMessage> {
        let msg = tokio::time::timeout(Duration::from_millis(500), self.rx.recv())
            .await
            .context("timed out waiting for a signal")?
            .context("peer channel closed")?;

        match msg {
            Message::Text(text) => {
                serde_json::from_str(text.as_str()).context("unparseable outbound signal")
            }
            other => anyhow::bail!("unexpected frame: {:?}", other),
        }
    }

    /// Asserts nothing is currently queued for this peer.
    pub fn assert_silent(&mut self) {
        assert!(
            self.rx.try_recv().is_err(),
            "expected no pending signals for {}",
            self.connection_id
        );
    }
}
