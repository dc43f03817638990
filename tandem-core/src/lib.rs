pub mod model;
pub mod util;

pub use model::{
    ConnectionId, DepartureReason, IceServerConfig, SdpKind, SessionDescription, SignalMessage,
};
