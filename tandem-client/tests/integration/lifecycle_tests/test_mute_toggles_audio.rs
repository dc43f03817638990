use crate::integration::init_tracing;
use crate::utils::{connect_as_caller, test_call};
use tandem_client::media::{LocalTrack, MediaKind};

#[tokio::test]
async fn test_mute_toggles_audio() {
    init_tracing();
    let call = test_call("ann");
    connect_as_caller(&call).await;

    call.lifecycle.set_muted(true);
    for track in call.lifecycle.local_tracks() {
        match track.kind() {
            MediaKind::Audio => assert!(!track.is_enabled()),
            MediaKind::Video => assert!(track.is_enabled()),
        }
    }

    call.lifecycle.set_muted(false);
    assert!(call.lifecycle.local_tracks().iter().all(|t| t.is_enabled()));

    // Mute carries over to tracks acquired by a camera switch.
    call.lifecycle.set_muted(true);
    call.lifecycle.switch_camera().await.unwrap();
    for track in call.lifecycle.local_tracks() {
        match track.kind() {
            MediaKind::Audio => assert!(!track.is_enabled()),
            MediaKind::Video => assert!(track.is_enabled()),
        }
    }
}
