use std::sync::Arc;
use tandem_core::ConnectionId;
use tandem_server::{RegistryError, RoomRegistry};

use crate::integration::init_tracing;

/// Fires six simultaneous joins at one room; the entry-lock around the
/// capacity check must let exactly two through.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_respect_capacity() {
    init_tracing();
    let registry = Arc::new(RoomRegistry::new());

    let mut handles = Vec::new();
    for n in 0..6 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry.join(ConnectionId::new(), "contended", &format!("peer-{n}"))
        }));
    }

    let mut admitted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => admitted += 1,
            Err(RegistryError::RoomFull { room }) => {
                assert_eq!(room, "contended");
                rejected += 1;
            }
        }
    }

    assert_eq!(admitted, 2);
    assert_eq!(rejected, 4);
    assert_eq!(registry.members("contended").len(), 2);
}
