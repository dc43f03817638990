use crate::integration::init_tracing;
use crate::utils::{connect_as_caller, test_call};
use tandem_client::call::CallPhase;
use tandem_core::{DepartureReason, SignalMessage};

#[tokio::test]
async fn test_hang_up_notifies_peer() {
    init_tracing();
    let call = test_call("ann");
    let peer = connect_as_caller(&call).await;
    let tracks = call.lifecycle.local_tracks();

    call.lifecycle.hang_up();

    match call.sink.drain().as_slice() {
        [
            SignalMessage::DisconnectNotice {
                peer: first,
                display_name,
                reason,
            },
            SignalMessage::EvictionNotice { peer: second, .. },
        ] => {
            assert_eq!(*first, peer);
            assert_eq!(*second, peer);
            assert_eq!(display_name, "ann");
            assert_eq!(*reason, DepartureReason::Hangup);
        }
        other => panic!("expected disconnect + eviction, got {other:?}"),
    }

    assert_eq!(call.lifecycle.phase(), CallPhase::TornDown);
    assert!(tracks.iter().all(|t| t.is_stopped()));
    assert!(call.link.is_closed());
}
