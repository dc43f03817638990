use crate::integration::init_tracing;
use crate::utils::test_call;
use tandem_client::call::{CallError, CallPhase};
use tandem_core::{ConnectionId, SignalMessage};

#[tokio::test]
async fn test_join_flow_reaches_waiting() {
    init_tracing();
    let call = test_call("ann");
    assert_eq!(call.lifecycle.phase(), CallPhase::Idle);

    call.lifecycle.join_room("r1").unwrap();
    assert_eq!(call.lifecycle.phase(), CallPhase::WaitingForPeer);

    match call.sink.drain().as_slice() {
        [SignalMessage::RoomJoin { room, display_name }] => {
            assert_eq!(room, "r1");
            assert_eq!(display_name, "ann");
        }
        other => panic!("expected a single RoomJoin, got {other:?}"),
    }

    let my_id = ConnectionId::new();
    call.lifecycle
        .handle_signal(SignalMessage::RoomJoined {
            connection_id: my_id.clone(),
            room: "r1".to_string(),
            display_name: "ann".to_string(),
        })
        .await;
    assert_eq!(call.lifecycle.connection_id(), Some(my_id));

    // Joining is only legal from Idle.
    let err = call.lifecycle.join_room("r2").unwrap_err();
    assert!(matches!(err, CallError::WrongPhase { .. }));
}
