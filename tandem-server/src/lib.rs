pub mod config;
pub mod registry;
pub mod signaling;

pub use config::ServerConfig;
pub use registry::{RegistryError, RoomMember, RoomRegistry};
pub use signaling::{SignalingService, ws_handler};
