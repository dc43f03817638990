use crate::integration::init_tracing;
use crate::utils::test_call;
use tandem_client::call::CallPhase;
use tandem_core::{ConnectionId, DepartureReason, SessionDescription, SignalMessage};

/// A disconnect notice that lands while the answer is still being applied
/// always wins: the late resolution must not resurrect the session.
#[tokio::test]
async fn test_disconnect_wins_pending_answer() {
    init_tracing();
    let call = test_call("ann");
    call.lifecycle.join_room("r1").unwrap();

    let peer = ConnectionId::new();
    call.lifecycle
        .handle_signal(SignalMessage::UserJoined {
            connection_id: peer.clone(),
            display_name: "bob".to_string(),
        })
        .await;
    assert_eq!(call.lifecycle.phase(), CallPhase::OutgoingRinging);
    call.sink.drain();

    let release = call.link.hold_next_set_remote();
    let pending_answer = call.lifecycle.handle_signal(SignalMessage::CallAnswer {
        peer: peer.clone(),
        description: SessionDescription::answer("answer-1 []"),
    });
    let interrupt = async {
        call.lifecycle
            .handle_signal(SignalMessage::DisconnectNotice {
                peer: peer.clone(),
                display_name: "bob".to_string(),
                reason: DepartureReason::Hangup,
            })
            .await;
        release.send(()).unwrap();
    };
    tokio::join!(pending_answer, interrupt);

    // The session stays cleared and the call never reaches Connected.
    assert_eq!(
        call.lifecycle.phase(),
        CallPhase::PeerLeft(DepartureReason::Hangup)
    );
    let controller = call.lifecycle.controller();
    assert_eq!(controller.local_description(), None);
    assert_eq!(controller.remote_description(), None);
    assert!(controller.remote_peer().is_none());
    assert!(!controller.has_sent_initial_stream());

    // Local capture survives the departure.
    let tracks = call.lifecycle.local_tracks();
    assert!(!tracks.is_empty());
    assert!(tracks.iter().all(|t| !t.is_stopped()));
}
