use crate::integration::init_tracing;
use crate::utils::MockPeerLink;
use tandem_client::session::NegotiationController;

#[tokio::test]
async fn test_offer_answer_round_trip() {
    init_tracing();
    let a = NegotiationController::new(MockPeerLink::new());
    let b = NegotiationController::new(MockPeerLink::new());

    let offer = a.create_offer().await.unwrap();
    let answer = b.accept_offer(offer.clone()).await.unwrap();
    a.accept_answer(answer.clone()).await.unwrap();

    // Both sides end up with mirror-image descriptions.
    assert_eq!(a.local_description(), Some(offer.clone()));
    assert_eq!(b.remote_description(), Some(offer));
    assert_eq!(b.local_description(), Some(answer.clone()));
    assert_eq!(a.remote_description(), Some(answer));
}

#[tokio::test]
async fn test_repeated_offers_supersede_each_other() {
    init_tracing();
    let link = MockPeerLink::new();
    let controller = NegotiationController::new(link.clone());

    let first = controller.create_offer().await.unwrap();
    let second = controller.create_offer().await.unwrap();

    assert_ne!(first.sdp, second.sdp);
    assert_eq!(controller.local_description(), Some(second.clone()));
    assert_eq!(link.local_description(), Some(second));
}
