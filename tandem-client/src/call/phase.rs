use tandem_core::DepartureReason;

/// The one call phase a participant is in at any time. Transitions are
/// driven exclusively by [`CallLifecycle`](crate::call::CallLifecycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Idle,
    /// In a room, no remote participant known yet.
    WaitingForPeer,
    /// Local media acquired, offer sent, waiting for the answer.
    OutgoingRinging,
    /// A remote offer arrived before this side called.
    IncomingOffered,
    Connected,
    /// The remote side announced its departure; local capture stays alive.
    PeerLeft(DepartureReason),
    TornDown,
}
