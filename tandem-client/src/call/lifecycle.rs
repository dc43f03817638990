use crate::call::{CallError, CallPhase};
use crate::media::{CaptureConstraints, FacingMode, LocalTrack, MediaKind, MediaSource, RemoteFeed};
use crate::session::{LinkEvent, NegotiationController, NegotiationError, PeerLink};
use crate::signal_sink::SignalSink;
use std::cell::RefCell;
use std::rc::Rc;
use tandem_core::{ConnectionId, DepartureReason, SessionDescription, SignalMessage};
use tracing::{debug, info, warn};

struct Inner<R, T> {
    phase: CallPhase,
    display_name: String,
    connection_id: Option<ConnectionId>,
    room: Option<String>,
    remote_name: Option<String>,
    /// Remembered across PeerLeft so a rejoin can offer a fresh call.
    last_peer: Option<(ConnectionId, String)>,
    facing: FacingMode,
    muted: bool,
    camera_switching: bool,
    /// Acquired capture tracks, attached to the link lazily (send streams).
    local_tracks: Vec<T>,
    remote_feed: Option<R>,
    last_error: Option<CallError>,
}

struct Callbacks<R> {
    on_phase_change: Option<Box<dyn Fn(CallPhase)>>,
    on_remote_feed: Option<Box<dyn Fn(R)>>,
}

/// The explicit state machine for a participant's call.
///
/// Intents (join, rejoin, hang up, switch camera) and relay envelopes both
/// funnel through here; the [`NegotiationController`] carries out the actual
/// offer/answer/track work. Single-threaded and cooperative: link events are
/// queued by the controller and drained by [`CallLifecycle::pump`] after
/// every handler, in event-loop delivery order.
pub struct CallLifecycle<L, M, S>
where
    L: PeerLink,
    M: MediaSource<Track = L::Track>,
    S: SignalSink,
{
    controller: NegotiationController<L>,
    media: Rc<M>,
    sink: Rc<S>,
    inner: Rc<RefCell<Inner<L::Remote, L::Track>>>,
    callbacks: Rc<RefCell<Callbacks<L::Remote>>>,
}

impl<L, M, S> Clone for CallLifecycle<L, M, S>
where
    L: PeerLink,
    M: MediaSource<Track = L::Track>,
    S: SignalSink,
{
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            media: Rc::clone(&self.media),
            sink: Rc::clone(&self.sink),
            inner: Rc::clone(&self.inner),
            callbacks: Rc::clone(&self.callbacks),
        }
    }
}

impl<L, M, S> CallLifecycle<L, M, S>
where
    L: PeerLink + 'static,
    L::Remote: 'static,
    M: MediaSource<Track = L::Track>,
    S: SignalSink,
{
    pub fn new(link: L, media: M, sink: S, display_name: impl Into<String>) -> Self {
        Self {
            controller: NegotiationController::new(link),
            media: Rc::new(media),
            sink: Rc::new(sink),
            inner: Rc::new(RefCell::new(Inner {
                phase: CallPhase::Idle,
                display_name: display_name.into(),
                connection_id: None,
                room: None,
                remote_name: None,
                last_peer: None,
                facing: FacingMode::User,
                muted: false,
                camera_switching: false,
                local_tracks: Vec::new(),
                remote_feed: None,
                last_error: None,
            })),
            callbacks: Rc::new(RefCell::new(Callbacks {
                on_phase_change: None,
                on_remote_feed: None,
            })),
        }
    }

    pub fn phase(&self) -> CallPhase {
        self.inner.borrow().phase
    }

    pub fn controller(&self) -> &NegotiationController<L> {
        &self.controller
    }

    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.inner.borrow().connection_id.clone()
    }

    pub fn remote_display_name(&self) -> Option<String> {
        self.inner.borrow().remote_name.clone()
    }

    pub fn last_error(&self) -> Option<CallError> {
        self.inner.borrow().last_error.clone()
    }

    pub fn local_tracks(&self) -> Vec<L::Track> {
        self.inner.borrow().local_tracks.clone()
    }

    pub fn has_remote_feed(&self) -> bool {
        self.inner.borrow().remote_feed.is_some()
    }

    pub fn facing(&self) -> FacingMode {
        self.inner.borrow().facing
    }

    pub fn is_muted(&self) -> bool {
        self.inner.borrow().muted
    }

    pub fn on_phase_change(&self, callback: impl Fn(CallPhase) + 'static) {
        self.callbacks.borrow_mut().on_phase_change = Some(Box::new(callback));
    }

    /// Registers the handler invoked whenever a new inbound media feed
    /// becomes available; consumers use this to render the remote stream.
    pub fn on_remote_feed(&self, callback: impl Fn(L::Remote) + 'static) {
        self.callbacks.borrow_mut().on_remote_feed = Some(Box::new(callback));
    }

    /// Announces this participant to the room. The relay answers with either
    /// a `RoomJoined` ack or an `Error` when the room is already full.
    pub fn join_room(&self, room: &str) -> Result<(), CallError> {
        let phase = self.phase();
        if phase != CallPhase::Idle {
            return Err(CallError::WrongPhase { phase });
        }

        let display_name = {
            let mut inner = self.inner.borrow_mut();
            inner.room = Some(room.to_string());
            inner.display_name.clone()
        };
        self.sink.send(SignalMessage::RoomJoin {
            room: room.to_string(),
            display_name,
        });
        self.set_phase(CallPhase::WaitingForPeer);
        Ok(())
    }

    /// Ends the call: tells the peer, clears the room server-side via the
    /// eviction flow, and tears down all local and remote media.
    pub fn hang_up(&self) {
        let peer = self.controller.remote_peer().or_else(|| {
            self.inner
                .borrow()
                .last_peer
                .as_ref()
                .map(|(id, _)| id.clone())
        });

        if let Some(peer) = peer {
            let (display_name, reason) = {
                let inner = self.inner.borrow();
                let reason = if inner.camera_switching {
                    DepartureReason::CameraSwitch
                } else {
                    DepartureReason::Hangup
                };
                (inner.display_name.clone(), reason)
            };
            self.sink.send(SignalMessage::DisconnectNotice {
                peer: peer.clone(),
                display_name: display_name.clone(),
                reason,
            });
            self.sink.send(SignalMessage::EvictionNotice { peer, display_name });
        }

        self.teardown();
    }

    /// Offers a fresh call to the remembered peer after it left.
    pub async fn rejoin(&self) -> Result<(), CallError> {
        let phase = self.phase();
        if !matches!(phase, CallPhase::PeerLeft(_)) {
            return Err(CallError::WrongPhase { phase });
        }
        let Some((peer, name)) = self.inner.borrow().last_peer.clone() else {
            return Err(CallError::WrongPhase { phase });
        };

        self.start_call(peer, name).await;
        self.pump().await;
        Ok(())
    }

    /// Gives up on the departed peer and returns to idle.
    pub fn leave(&self) -> Result<(), CallError> {
        let phase = self.phase();
        if !matches!(phase, CallPhase::PeerLeft(_)) {
            return Err(CallError::WrongPhase { phase });
        }

        {
            let mut inner = self.inner.borrow_mut();
            for track in inner.local_tracks.drain(..) {
                track.stop();
            }
            inner.remote_name = None;
            inner.last_peer = None;
            inner.room = None;
        }
        self.controller.clear_session();
        self.set_phase(CallPhase::Idle);
        Ok(())
    }

    /// Returns a torn-down call to Idle; the surrounding application may
    /// then join again without restarting the process.
    pub fn reset(&self) -> Result<(), CallError> {
        let phase = self.phase();
        if phase != CallPhase::TornDown {
            return Err(CallError::WrongPhase { phase });
        }
        {
            let mut inner = self.inner.borrow_mut();
            inner.room = None;
            inner.connection_id = None;
            inner.last_error = None;
        }
        self.set_phase(CallPhase::Idle);
        Ok(())
    }

    /// Stops the current capture, flips the facing mode, re-acquires and
    /// re-attaches. The call phase does not change; if the attach adds a new
    /// sender the resulting renegotiation round runs underneath Connected.
    pub async fn switch_camera(&self) -> Result<(), CallError> {
        {
            let mut inner = self.inner.borrow_mut();
            inner.camera_switching = true;
            for track in inner.local_tracks.drain(..) {
                track.stop();
            }
            inner.facing = inner.facing.flipped();
        }

        let constraints = self.capture_constraints();
        let tracks = match self.media.acquire(constraints).await {
            Ok(tracks) => tracks,
            Err(e) => {
                self.inner.borrow_mut().camera_switching = false;
                let error = CallError::Device(e);
                self.record_error(error.clone());
                return Err(error);
            }
        };
        self.replace_held_tracks(tracks.clone());

        if self.controller.is_active() {
            if let Err(e) = self.controller.attach_local_media(tracks).await {
                self.fail_negotiation(e);
            }
        }
        self.pump().await;

        if !self.controller.is_renegotiating() {
            self.inner.borrow_mut().camera_switching = false;
        }
        Ok(())
    }

    /// Local-only audio mute; no envelope is produced.
    pub fn set_muted(&self, muted: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.muted = muted;
        for track in &inner.local_tracks {
            if track.kind() == MediaKind::Audio {
                track.set_enabled(!muted);
            }
        }
    }

    /// Attaches the held capture tracks to the link. Called automatically
    /// once the initial answer lands, and available as a manual retry.
    pub async fn send_streams(&self) {
        let tracks = self.inner.borrow().local_tracks.clone();
        if tracks.is_empty() {
            return;
        }
        match self.controller.attach_local_media(tracks).await {
            Ok(()) => self.controller.mark_initial_stream_sent(),
            Err(e) => self.fail_negotiation(e),
        }
        self.pump().await;
    }

    /// Entry point for every envelope the relay delivers to this participant.
    pub async fn handle_signal(&self, msg: SignalMessage) {
        match msg {
            // Consumed by the transport layer before the lifecycle sees it.
            SignalMessage::IceConfig { .. } => {}
            SignalMessage::RoomJoined {
                connection_id,
                room,
                ..
            } => self.handle_room_joined(connection_id, room),
            SignalMessage::UserJoined {
                connection_id,
                display_name,
            } => self.handle_user_joined(connection_id, display_name).await,
            SignalMessage::Error { message } => self.handle_error(message),
            SignalMessage::CallOffer {
                peer,
                description,
                display_name,
            } => self.handle_call_offer(peer, description, display_name).await,
            SignalMessage::CallAnswer { peer, description } => {
                self.handle_call_answer(peer, description).await
            }
            SignalMessage::RenegotiationOffer { peer, description } => {
                self.handle_renegotiation_offer(peer, description).await
            }
            SignalMessage::RenegotiationAnswer { peer, description } => {
                self.handle_renegotiation_answer(peer, description).await
            }
            SignalMessage::RenegotiationComplete { peer } => {
                self.handle_renegotiation_complete(peer).await
            }
            SignalMessage::DisconnectNotice {
                peer,
                display_name,
                reason,
            } => self.handle_disconnect_notice(peer, display_name, reason),
            SignalMessage::EvictionNotice { peer, display_name } => {
                self.handle_eviction_notice(peer, display_name)
            }
            SignalMessage::RoomJoin { .. } => {
                warn!("Unexpected client-bound envelope; dropping");
            }
        }

        self.pump().await;
    }

    /// Drains queued link events. Renegotiation triggers raised while a
    /// round is in flight stay deferred inside the controller and are
    /// replayed when that round completes.
    pub async fn pump(&self) {
        while let Some(event) = self.controller.poll_link_event() {
            match event {
                LinkEvent::NegotiationNeeded => {
                    if !self.controller.is_active() {
                        debug!("Dropping negotiation trigger without an active session");
                        continue;
                    }
                    self.start_renegotiation().await;
                }
                LinkEvent::RemoteFeedAvailable(feed) => {
                    self.inner.borrow_mut().remote_feed = Some(feed.clone());
                    if matches!(
                        self.phase(),
                        CallPhase::OutgoingRinging
                            | CallPhase::IncomingOffered
                            | CallPhase::Connected
                    ) {
                        self.set_phase(CallPhase::Connected);
                    }
                    if let Some(cb) = &self.callbacks.borrow().on_remote_feed {
                        cb(feed);
                    }
                }
            }
        }
    }

    fn handle_room_joined(&self, connection_id: ConnectionId, room: String) {
        info!("Joined room '{}' as {}", room, connection_id);
        self.inner.borrow_mut().connection_id = Some(connection_id);
    }

    async fn handle_user_joined(&self, connection_id: ConnectionId, display_name: String) {
        match self.phase() {
            CallPhase::WaitingForPeer => self.start_call(connection_id, display_name).await,
            phase => {
                // The registry should make this impossible; double-check by
                // comparing against the peer we already know.
                if !self.controller.is_remote(&connection_id) {
                    debug!(
                        "Ignoring join notification from {} in phase {:?}",
                        connection_id, phase
                    );
                }
            }
        }
    }

    fn handle_error(&self, message: String) {
        warn!("Relay error: {}", message);
        let fallback = self.phase() == CallPhase::WaitingForPeer && !self.controller.is_active();
        self.record_error(CallError::Rejected(message));
        if fallback {
            self.inner.borrow_mut().room = None;
            self.set_phase(CallPhase::Idle);
        }
    }

    /// Acquires media and opens the call towards `peer`. Tracks are held
    /// locally and only attached once the answer arrives.
    async fn start_call(&self, peer: ConnectionId, peer_name: String) {
        let constraints = self.capture_constraints();
        let tracks = match self.media.acquire(constraints).await {
            Ok(tracks) => tracks,
            Err(e) => {
                // Intent aborted; no session state was committed.
                warn!("Media acquisition failed: {}", e);
                self.record_error(CallError::Device(e));
                return;
            }
        };
        self.replace_held_tracks(tracks);

        self.controller.bind_remote(peer.clone());
        let display_name = {
            let mut inner = self.inner.borrow_mut();
            inner.remote_name = Some(peer_name.clone());
            inner.last_peer = Some((peer.clone(), peer_name));
            inner.display_name.clone()
        };

        match self.controller.create_offer().await {
            Ok(offer) => {
                self.sink.send(SignalMessage::CallOffer {
                    peer,
                    description: offer,
                    display_name,
                });
                self.set_phase(CallPhase::OutgoingRinging);
            }
            Err(e) => self.fail_negotiation(e),
        }
    }

    async fn handle_call_offer(
        &self,
        from: ConnectionId,
        description: SessionDescription,
        display_name: String,
    ) {
        let phase = self.phase();
        if !matches!(phase, CallPhase::WaitingForPeer | CallPhase::PeerLeft(_)) {
            debug!("Ignoring call offer in phase {:?}", phase);
            return;
        }
        self.set_phase(CallPhase::IncomingOffered);

        let constraints = self.capture_constraints();
        let tracks = match self.media.acquire(constraints).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!("Media acquisition failed: {}", e);
                self.record_error(CallError::Device(e));
                self.set_phase(CallPhase::WaitingForPeer);
                return;
            }
        };
        self.replace_held_tracks(tracks);

        self.controller.bind_remote(from.clone());
        {
            let mut inner = self.inner.borrow_mut();
            inner.remote_name = Some(display_name.clone());
            inner.last_peer = Some((from.clone(), display_name));
        }

        match self.controller.accept_offer(description).await {
            Ok(answer) => {
                self.sink.send(SignalMessage::CallAnswer {
                    peer: from,
                    description: answer,
                });
                self.set_phase(CallPhase::Connected);
            }
            Err(NegotiationError::NoSession) => {}
            Err(e) => self.fail_negotiation(e),
        }
    }

    async fn handle_call_answer(&self, from: ConnectionId, description: SessionDescription) {
        if self.phase() != CallPhase::OutgoingRinging || !self.controller.is_remote(&from) {
            debug!("Ignoring answer from {}", from);
            return;
        }

        match self.controller.accept_answer(description).await {
            Ok(()) => {
                if !self.controller.is_active() {
                    // A departure notice won the race while the answer was
                    // being applied; the session is already gone.
                    return;
                }
                self.set_phase(CallPhase::Connected);
                self.send_streams().await;
            }
            Err(e) => self.fail_negotiation(e),
        }
    }

    async fn handle_renegotiation_offer(&self, from: ConnectionId, description: SessionDescription) {
        if !self.controller.is_remote(&from) {
            debug!("Ignoring renegotiation offer from {}", from);
            return;
        }

        match self.controller.accept_offer(description).await {
            Ok(answer) => self.sink.send(SignalMessage::RenegotiationAnswer {
                peer: from,
                description: answer,
            }),
            Err(NegotiationError::NoSession) => {}
            Err(e) => self.fail_negotiation(e),
        }
    }

    async fn handle_renegotiation_answer(
        &self,
        from: ConnectionId,
        description: SessionDescription,
    ) {
        if !self.controller.is_remote(&from) {
            debug!("Ignoring renegotiation answer from {}", from);
            return;
        }

        match self.controller.accept_answer(description).await {
            Ok(()) => {
                if !self.controller.is_active() {
                    return;
                }
                self.sink
                    .send(SignalMessage::RenegotiationComplete { peer: from });
                self.inner.borrow_mut().camera_switching = false;
                if self.controller.finish_renegotiation() {
                    // A trigger arrived mid-round; replay it now.
                    self.start_renegotiation().await;
                }
            }
            Err(e) => self.fail_negotiation(e),
        }
    }

    async fn handle_renegotiation_complete(&self, from: ConnectionId) {
        if !self.controller.is_remote(&from) {
            return;
        }
        // The peer finished its round; this side may now attach its own
        // tracks if it has not done so yet.
        if !self.controller.has_sent_initial_stream() {
            self.send_streams().await;
        }
    }

    fn handle_disconnect_notice(
        &self,
        from: ConnectionId,
        display_name: String,
        reason: DepartureReason,
    ) {
        if !self.controller.is_remote(&from) {
            debug!("Ignoring disconnect notice from {}", from);
            return;
        }
        info!("{} left the call ({:?})", display_name, reason);

        // Departure always wins, even with a negotiation round in flight.
        let feed = self.inner.borrow_mut().remote_feed.take();
        if let Some(feed) = feed {
            feed.stop();
        }
        self.controller.clear_session();
        self.set_phase(CallPhase::PeerLeft(reason));
    }

    fn handle_eviction_notice(&self, from: ConnectionId, display_name: String) {
        let known = self.controller.is_remote(&from)
            || self
                .inner
                .borrow()
                .last_peer
                .as_ref()
                .is_some_and(|(id, _)| *id == from);
        if !known {
            debug!("Ignoring eviction notice from {}", from);
            return;
        }
        info!("{} ended the call", display_name);
        self.teardown();
    }

    async fn start_renegotiation(&self) {
        if !self.controller.begin_renegotiation() {
            debug!("Renegotiation already in flight; trigger deferred");
            return;
        }
        let Some(peer) = self.controller.remote_peer() else {
            self.controller.finish_renegotiation();
            return;
        };

        match self.controller.create_offer().await {
            Ok(offer) => self.sink.send(SignalMessage::RenegotiationOffer {
                peer,
                description: offer,
            }),
            Err(e) => {
                self.controller.finish_renegotiation();
                self.fail_negotiation(e);
            }
        }
    }

    /// Stops all media, wipes the session and closes the link.
    fn teardown(&self) {
        let feed = self.inner.borrow_mut().remote_feed.take();
        if let Some(feed) = feed {
            feed.stop();
        }
        for track in self.controller.reset() {
            track.stop();
        }
        {
            let mut inner = self.inner.borrow_mut();
            for track in inner.local_tracks.drain(..) {
                track.stop();
            }
            inner.remote_name = None;
            inner.last_peer = None;
            inner.camera_switching = false;
        }
        self.set_phase(CallPhase::TornDown);
    }

    /// Malformed or out-of-order description: drop the session and fall back
    /// so the user may retry.
    fn fail_negotiation(&self, error: NegotiationError) {
        warn!("Negotiation failed: {}", error);
        let feed = self.inner.borrow_mut().remote_feed.take();
        if let Some(feed) = feed {
            feed.stop();
        }
        self.controller.clear_session();
        {
            let mut inner = self.inner.borrow_mut();
            inner.remote_name = None;
            inner.last_peer = None;
        }
        self.record_error(CallError::Negotiation(error));
        self.set_phase(CallPhase::WaitingForPeer);
    }

    fn replace_held_tracks(&self, tracks: Vec<L::Track>) {
        let mut inner = self.inner.borrow_mut();
        for track in inner.local_tracks.drain(..) {
            track.stop();
        }
        if inner.muted {
            for track in tracks.iter().filter(|t| t.kind() == MediaKind::Audio) {
                track.set_enabled(false);
            }
        }
        inner.local_tracks = tracks;
    }

    fn capture_constraints(&self) -> CaptureConstraints {
        CaptureConstraints {
            facing: self.inner.borrow().facing,
            audio: true,
        }
    }

    fn record_error(&self, error: CallError) {
        self.inner.borrow_mut().last_error = Some(error);
    }

    fn set_phase(&self, phase: CallPhase) {
        let previous = {
            let mut inner = self.inner.borrow_mut();
            std::mem::replace(&mut inner.phase, phase)
        };
        if previous != phase {
            info!("Call phase {:?} -> {:?}", previous, phase);
            if let Some(cb) = &self.callbacks.borrow().on_phase_change {
                cb(phase);
            }
        }
    }
}
