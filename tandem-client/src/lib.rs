pub mod call;
pub mod media;
pub mod session;
pub mod signal_sink;

pub use call::{CallError, CallLifecycle, CallPhase};
pub use media::{
    CaptureConstraints, DeviceError, FacingMode, LocalTrack, MediaKind, MediaSource, RemoteFeed,
};
pub use session::{LinkEvent, NegotiationController, NegotiationError, PeerLink, PeerSessionState};
pub use signal_sink::SignalSink;
