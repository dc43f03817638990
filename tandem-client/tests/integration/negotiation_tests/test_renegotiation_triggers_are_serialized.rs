use crate::integration::init_tracing;
use crate::utils::MockPeerLink;
use tandem_client::session::NegotiationController;

#[tokio::test]
async fn test_renegotiation_triggers_are_serialized() {
    init_tracing();
    let controller: NegotiationController<MockPeerLink> =
        NegotiationController::new(MockPeerLink::new());

    assert!(controller.begin_renegotiation());
    assert!(controller.is_renegotiating());

    // A trigger during an in-flight round is deferred, never concurrent.
    assert!(!controller.begin_renegotiation());

    // Finishing the round reports the deferred trigger exactly once.
    assert!(controller.finish_renegotiation());
    assert!(!controller.is_renegotiating());
    assert!(!controller.finish_renegotiation());
}
