use crate::integration::init_tracing;
use crate::utils::test_call;
use tandem_client::call::CallPhase;
use tandem_core::{ConnectionId, SdpKind, SessionDescription, SignalMessage};

#[tokio::test]
async fn test_callee_reaches_connected() {
    init_tracing();
    let call = test_call("bob");
    call.lifecycle.join_room("r1").unwrap();
    call.sink.drain();

    let peer = ConnectionId::new();
    call.lifecycle
        .handle_signal(SignalMessage::CallOffer {
            peer: peer.clone(),
            description: SessionDescription::offer("offer-1 []"),
            display_name: "ann".to_string(),
        })
        .await;

    // Answered and connected; own streams wait for the peer's go-ahead.
    assert_eq!(call.lifecycle.phase(), CallPhase::Connected);
    assert_eq!(call.media.acquisitions().len(), 1);
    match call.sink.drain().as_slice() {
        [SignalMessage::CallAnswer {
            peer: to,
            description,
        }] => {
            assert_eq!(*to, peer);
            assert_eq!(description.kind, SdpKind::Answer);
        }
        other => panic!("expected a single CallAnswer, got {other:?}"),
    }
    assert!(call.link.senders().is_empty());
    assert!(!call.lifecycle.controller().has_sent_initial_stream());

    // The caller attached its streams and renegotiates.
    call.lifecycle
        .handle_signal(SignalMessage::RenegotiationOffer {
            peer: peer.clone(),
            description: SessionDescription::offer("offer-2 [audio video]"),
        })
        .await;

    assert!(call.lifecycle.has_remote_feed());
    assert_eq!(call.lifecycle.phase(), CallPhase::Connected);
    match call.sink.drain().as_slice() {
        [SignalMessage::RenegotiationAnswer { peer: to, .. }] => assert_eq!(*to, peer),
        other => panic!("expected a single RenegotiationAnswer, got {other:?}"),
    }

    // Round complete: now this side attaches and opens its own round.
    call.lifecycle
        .handle_signal(SignalMessage::RenegotiationComplete { peer: peer.clone() })
        .await;

    assert_eq!(call.link.senders().len(), 2);
    assert!(call.lifecycle.controller().has_sent_initial_stream());
    assert_eq!(call.lifecycle.phase(), CallPhase::Connected);
    match call.sink.drain().as_slice() {
        [SignalMessage::RenegotiationOffer { peer: to, .. }] => assert_eq!(*to, peer),
        other => panic!("expected a single RenegotiationOffer, got {other:?}"),
    }
}
