use tandem_core::SignalMessage;

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestPeer;

#[tokio::test]
async fn test_two_peers_fill_room() {
    init_tracing();
    let service = create_test_service();

    let mut ann = TestPeer::connect(&service);
    ann.join(&service, "r1", "ann");

    // First member gets the ack and no broadcast.
    match ann.recv().await.unwrap() {
        SignalMessage::RoomJoined {
            connection_id,
            room,
            display_name,
        } => {
            assert_eq!(connection_id, ann.connection_id);
            assert_eq!(room, "r1");
            assert_eq!(display_name, "ann");
        }
        other => panic!("expected RoomJoined, got {other:?}"),
    }
    ann.assert_silent();

    let mut bob = TestPeer::connect(&service);
    bob.join(&service, "r1", "bob");

    // Existing member is told about the newcomer.
    match ann.recv().await.unwrap() {
        SignalMessage::UserJoined {
            connection_id,
            display_name,
        } => {
            assert_eq!(connection_id, bob.connection_id);
            assert_eq!(display_name, "bob");
        }
        other => panic!("expected UserJoined, got {other:?}"),
    }

    // The joiner only gets its ack, not the broadcast.
    match bob.recv().await.unwrap() {
        SignalMessage::RoomJoined { connection_id, .. } => {
            assert_eq!(connection_id, bob.connection_id);
        }
        other => panic!("expected RoomJoined, got {other:?}"),
    }
    bob.assert_silent();

    assert_eq!(service.registry().members("r1").len(), 2);
}
