use crate::media::LocalTrack;
use crate::session::{NegotiationError, PeerLink, PeerSessionState};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tandem_core::{ConnectionId, SdpKind, SessionDescription};
use tracing::debug;

/// Typed triggers raised by the underlying link's callbacks, queued here and
/// drained by the call lifecycle in event-loop order.
pub enum LinkEvent<R> {
    /// The link's local description is stale relative to its track set.
    NegotiationNeeded,
    /// A new inbound media feed became available.
    RemoteFeedAvailable(R),
}

/// Owns the one peer link of a participant and sequences offer/answer/track
/// operations against it.
///
/// Single-threaded and cooperative: state lives in a `RefCell` and every
/// suspension point re-validates that the session it started under still
/// exists before mutating anything.
pub struct NegotiationController<L: PeerLink> {
    link: Rc<L>,
    state: Rc<RefCell<PeerSessionState<L::Track>>>,
    events: Rc<RefCell<VecDeque<LinkEvent<L::Remote>>>>,
}

impl<L: PeerLink> Clone for NegotiationController<L> {
    fn clone(&self) -> Self {
        Self {
            link: Rc::clone(&self.link),
            state: Rc::clone(&self.state),
            events: Rc::clone(&self.events),
        }
    }
}

impl<L> NegotiationController<L>
where
    L: PeerLink + 'static,
    L::Remote: 'static,
{
    pub fn new(link: L) -> Self {
        let link = Rc::new(link);
        let state = Rc::new(RefCell::new(PeerSessionState::new()));
        let events: Rc<RefCell<VecDeque<LinkEvent<L::Remote>>>> =
            Rc::new(RefCell::new(VecDeque::new()));

        let queue = Rc::clone(&events);
        link.set_on_negotiation_needed(Box::new(move || {
            // Coalesced like the browser event: one stale local description
            // needs one round, however many senders went in.
            let mut queue = queue.borrow_mut();
            if !queue
                .iter()
                .any(|e| matches!(e, LinkEvent::NegotiationNeeded))
            {
                queue.push_back(LinkEvent::NegotiationNeeded);
            }
        }));

        let queue = Rc::clone(&events);
        link.set_on_track(Box::new(move |remote| {
            queue
                .borrow_mut()
                .push_back(LinkEvent::RemoteFeedAvailable(remote));
        }));

        Self {
            link,
            state,
            events,
        }
    }

    /// Next queued link event, if any.
    pub fn poll_link_event(&self) -> Option<LinkEvent<L::Remote>> {
        self.events.borrow_mut().pop_front()
    }

    pub fn bind_remote(&self, peer: ConnectionId) {
        self.state.borrow_mut().remote_peer = Some(peer);
    }

    pub fn remote_peer(&self) -> Option<ConnectionId> {
        self.state.borrow().remote_peer.clone()
    }

    pub fn is_remote(&self, peer: &ConnectionId) -> bool {
        self.state.borrow().remote_peer.as_ref() == Some(peer)
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().is_active()
    }

    pub fn is_renegotiating(&self) -> bool {
        self.state.borrow().is_renegotiating
    }

    pub fn has_sent_initial_stream(&self) -> bool {
        self.state.borrow().has_sent_initial_stream
    }

    pub fn mark_initial_stream_sent(&self) {
        self.state.borrow_mut().has_sent_initial_stream = true;
    }

    pub fn local_description(&self) -> Option<SessionDescription> {
        self.state.borrow().local_description.clone()
    }

    pub fn remote_description(&self) -> Option<SessionDescription> {
        self.state.borrow().remote_description.clone()
    }

    pub fn local_tracks(&self) -> Vec<L::Track> {
        self.state.borrow().local_tracks.clone()
    }

    /// Attaches tracks with a replace-or-add policy: a track whose media kind
    /// already has a sender replaces it in place (avoiding a renegotiation
    /// storm); a new kind adds a sender, which makes the link raise
    /// negotiation-needed.
    pub async fn attach_local_media(
        &self,
        tracks: Vec<L::Track>,
    ) -> Result<(), NegotiationError> {
        for track in tracks {
            let replaced = self.link.replace_track(&track).await?;
            if !replaced {
                self.link.add_track(&track).await?;
            }

            let mut state = self.state.borrow_mut();
            let kind = track.kind();
            state.local_tracks.retain(|t| t.kind() != kind);
            state.local_tracks.push(track);
        }
        Ok(())
    }

    /// Produces a local offer and installs it as the local description. Safe
    /// to call repeatedly across the call's life; each call supersedes the
    /// previous local description.
    pub async fn create_offer(&self) -> Result<SessionDescription, NegotiationError> {
        let offer = self.link.create_offer().await?;
        self.link.set_local_description(&offer).await?;
        self.state.borrow_mut().local_description = Some(offer.clone());
        Ok(offer)
    }

    /// Applies a remote offer and produces the matching answer.
    pub async fn accept_offer(
        &self,
        remote: SessionDescription,
    ) -> Result<SessionDescription, NegotiationError> {
        if remote.kind != SdpKind::Offer {
            return Err(NegotiationError::UnexpectedKind { got: remote.kind });
        }

        let generation = self.state.borrow().generation;

        self.link.set_remote_description(&remote).await?;
        let answer = self.link.create_answer().await?;
        self.link.set_local_description(&answer).await?;

        let mut state = self.state.borrow_mut();
        if state.generation != generation {
            debug!("Discarding answer produced for a cleared session");
            return Err(NegotiationError::NoSession);
        }
        state.remote_description = Some(remote);
        state.local_description = Some(answer.clone());
        Ok(answer)
    }

    /// Applies a remote answer, completing the negotiation round. If the
    /// session was cleared while the operation was suspended the resolution
    /// is a no-op: a disconnect or eviction notice always wins.
    pub async fn accept_answer(&self, remote: SessionDescription) -> Result<(), NegotiationError> {
        if remote.kind != SdpKind::Answer {
            return Err(NegotiationError::UnexpectedKind { got: remote.kind });
        }

        let generation = self.state.borrow().generation;

        self.link.set_remote_description(&remote).await?;

        let mut state = self.state.borrow_mut();
        if state.generation != generation {
            debug!("Answer resolved after the session was cleared; ignoring");
            return Ok(());
        }
        state.remote_description = Some(remote);
        Ok(())
    }

    /// Marks a renegotiation round as started. If one is already in flight
    /// the trigger is remembered for later instead: the controller never
    /// issues two concurrent offers.
    pub fn begin_renegotiation(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.is_renegotiating {
            state.renegotiation_deferred = true;
            false
        } else {
            state.is_renegotiating = true;
            true
        }
    }

    /// Ends the in-flight round, reporting whether a deferred trigger is
    /// waiting to be replayed.
    pub fn finish_renegotiation(&self) -> bool {
        let mut state = self.state.borrow_mut();
        state.is_renegotiating = false;
        std::mem::take(&mut state.renegotiation_deferred)
    }

    /// Drops the session's negotiation state but keeps the attached tracks.
    pub fn clear_session(&self) {
        self.state.borrow_mut().clear_session();
    }

    /// Full teardown: wipes the state, closes the link and returns the
    /// previously attached tracks so the caller can stop them.
    pub fn reset(&self) -> Vec<L::Track> {
        let tracks = self.state.borrow_mut().reset();
        self.events.borrow_mut().clear();
        self.link.close();
        tracks
    }
}
