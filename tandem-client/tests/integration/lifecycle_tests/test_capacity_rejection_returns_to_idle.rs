use crate::integration::init_tracing;
use crate::utils::test_call;
use tandem_client::call::{CallError, CallPhase};
use tandem_core::SignalMessage;

#[tokio::test]
async fn test_capacity_rejection_returns_to_idle() {
    init_tracing();
    let call = test_call("carl");

    call.lifecycle.join_room("r1").unwrap();
    call.sink.drain();

    call.lifecycle
        .handle_signal(SignalMessage::Error {
            message: "room \"r1\" is full".to_string(),
        })
        .await;

    assert_eq!(call.lifecycle.phase(), CallPhase::Idle);
    match call.lifecycle.last_error() {
        Some(CallError::Rejected(message)) => assert!(message.contains("full")),
        other => panic!("expected a rejection, got {other:?}"),
    }

    // The user may simply try another room.
    call.lifecycle.join_room("r2").unwrap();
    assert_eq!(call.lifecycle.phase(), CallPhase::WaitingForPeer);
}
