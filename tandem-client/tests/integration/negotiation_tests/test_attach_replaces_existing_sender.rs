use crate::integration::init_tracing;
use crate::utils::{MockPeerLink, MockTrack};
use tandem_client::media::MediaKind;
use tandem_client::session::{LinkEvent, NegotiationController};
use tandem_core::ConnectionId;

#[tokio::test]
async fn test_attach_replaces_existing_sender() {
    init_tracing();
    let link = MockPeerLink::new();
    let controller = NegotiationController::new(link.clone());
    controller.bind_remote(ConnectionId::new());

    let first_cam = MockTrack::new(MediaKind::Video, "cam-front");
    controller
        .attach_local_media(vec![first_cam.clone()])
        .await
        .unwrap();

    // New media kind: a sender was added and the link asked to renegotiate.
    assert_eq!(link.senders(), vec![MediaKind::Video]);
    assert!(matches!(
        controller.poll_link_event(),
        Some(LinkEvent::NegotiationNeeded)
    ));

    let second_cam = MockTrack::new(MediaKind::Video, "cam-back");
    controller
        .attach_local_media(vec![second_cam])
        .await
        .unwrap();

    // Same kind again: replaced in place, no renegotiation storm.
    assert_eq!(link.senders().len(), 1);
    assert!(controller.poll_link_event().is_none());

    let tracks = controller.local_tracks();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].label, "cam-back");
}
