mod connection;
mod sdp;
mod signaling;

pub use connection::ConnectionId;
pub use sdp::{SdpKind, SessionDescription};
pub use signaling::{DepartureReason, IceServerConfig, SignalMessage};
