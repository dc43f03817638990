use tandem_core::SignalMessage;

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestPeer;

#[tokio::test]
async fn test_eviction_prunes_both_members() {
    init_tracing();
    let service = create_test_service();

    let mut ann = TestPeer::connect(&service);
    ann.join(&service, "r1", "ann");
    let mut bob = TestPeer::connect(&service);
    bob.join(&service, "r1", "bob");
    let _ = ann.recv().await.unwrap();
    let _ = ann.recv().await.unwrap();
    let _ = bob.recv().await.unwrap();

    ann.send(
        &service,
        &SignalMessage::EvictionNotice {
            peer: bob.connection_id.clone(),
            display_name: "ann".to_string(),
        },
    );

    match bob.recv().await.unwrap() {
        SignalMessage::EvictionNotice { peer, display_name } => {
            assert_eq!(peer, ann.connection_id);
            assert_eq!(display_name, "ann");
        }
        other => panic!("expected EvictionNotice, got {other:?}"),
    }

    // Both entries are gone and the room is reusable.
    assert!(service.registry().members("r1").is_empty());
    let mut carl = TestPeer::connect(&service);
    carl.join(&service, "r1", "carl");
    match carl.recv().await.unwrap() {
        SignalMessage::RoomJoined { .. } => {}
        other => panic!("expected RoomJoined, got {other:?}"),
    }
}
