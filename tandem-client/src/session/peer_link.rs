use crate::media::{LocalTrack, RemoteFeed};
use crate::session::NegotiationError;
use async_trait::async_trait;
use tandem_core::SessionDescription;

/// The underlying peer connection, one per participant. An
/// `RTCPeerConnection` in the browser, a scripted double in tests.
///
/// Offer/answer creation and track operations may suspend; callers must not
/// assume temporal exclusivity around them.
#[async_trait(?Send)]
pub trait PeerLink {
    type Track: LocalTrack;
    type Remote: RemoteFeed;

    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError>;
    async fn create_answer(&self) -> Result<SessionDescription, NegotiationError>;
    async fn set_local_description(
        &self,
        desc: &SessionDescription,
    ) -> Result<(), NegotiationError>;
    async fn set_remote_description(
        &self,
        desc: &SessionDescription,
    ) -> Result<(), NegotiationError>;

    /// Swaps the track on an existing sender of the same media kind without
    /// renegotiating. Returns false when no such sender exists yet.
    async fn replace_track(&self, track: &Self::Track) -> Result<bool, NegotiationError>;

    /// Adds a fresh sender for the track. The link answers with a
    /// negotiation-needed signal once its local description goes stale.
    async fn add_track(&self, track: &Self::Track) -> Result<(), NegotiationError>;

    fn set_on_negotiation_needed(&self, callback: Box<dyn Fn()>);
    fn set_on_track(&self, callback: Box<dyn Fn(Self::Remote)>);

    fn close(&self);
}
