use tandem_core::{ConnectionId, SessionDescription};

/// Per-participant negotiation state, mutated only by the local
/// [`NegotiationController`](crate::session::NegotiationController).
#[derive(Debug)]
pub struct PeerSessionState<T> {
    pub local_description: Option<SessionDescription>,
    pub remote_description: Option<SessionDescription>,
    /// Tracks currently attached to the peer link.
    pub local_tracks: Vec<T>,
    pub remote_peer: Option<ConnectionId>,
    pub has_sent_initial_stream: bool,
    pub is_renegotiating: bool,
    /// A local renegotiation trigger arrived while a round was in flight; it
    /// is replayed when the round completes.
    pub renegotiation_deferred: bool,
    /// Bumped on every reset. Suspended operations compare it afterwards to
    /// detect that the session they belonged to is gone.
    pub generation: u64,
}

impl<T> PeerSessionState<T> {
    pub fn new() -> Self {
        Self {
            local_description: None,
            remote_description: None,
            local_tracks: Vec::new(),
            remote_peer: None,
            has_sent_initial_stream: false,
            is_renegotiating: false,
            renegotiation_deferred: false,
            generation: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.remote_peer.is_some()
    }

    /// Drops everything tied to the departed remote party but keeps the
    /// attached tracks: the local participant may still be using the camera.
    pub fn clear_session(&mut self) {
        self.local_description = None;
        self.remote_description = None;
        self.remote_peer = None;
        self.has_sent_initial_stream = false;
        self.is_renegotiating = false;
        self.renegotiation_deferred = false;
        self.generation += 1;
    }

    /// Full wipe, returning the attached tracks so the caller can stop them.
    pub fn reset(&mut self) -> Vec<T> {
        self.clear_session();
        std::mem::take(&mut self.local_tracks)
    }
}

impl<T> Default for PeerSessionState<T> {
    fn default() -> Self {
        Self::new()
    }
}
