pub mod engine;
pub mod link;
pub mod logger;
pub mod media;

pub use engine::{CallEngine, EngineConfig, WebCall, WebSocketSink};
pub use link::{WebFeed, WebPeerLink, WebTrack};
pub use media::WebMediaSource;
