use crate::integration::init_tracing;
use crate::utils::MockPeerLink;
use tandem_client::session::NegotiationController;
use tandem_core::{ConnectionId, SessionDescription};

/// The disconnect-wins policy at the controller level: a session cleared
/// while `accept_answer` is suspended makes the eventual resolution a no-op.
#[tokio::test]
async fn test_stale_resolution_is_noop() {
    init_tracing();
    let link = MockPeerLink::new();
    let controller = NegotiationController::new(link.clone());
    controller.bind_remote(ConnectionId::new());

    let release = link.hold_next_set_remote();
    let pending = controller.accept_answer(SessionDescription::answer("late"));
    let interrupt = async {
        controller.clear_session();
        release.send(()).unwrap();
    };

    let (result, ()) = tokio::join!(pending, interrupt);
    result.unwrap();

    assert_eq!(controller.remote_description(), None);
    assert_eq!(controller.local_description(), None);
    assert!(controller.remote_peer().is_none());
    assert!(!controller.is_renegotiating());
}
