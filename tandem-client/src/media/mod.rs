use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

/// Which camera the capture should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    Environment,
}

impl FacingMode {
    pub fn flipped(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }

    /// The constraint string the capture layer understands.
    pub fn as_constraint(self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub facing: FacingMode,
    pub audio: bool,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::User,
            audio: true,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("media capture unavailable: {0}")]
    Unavailable(String),
}

/// Handle to a local capture track that can be attached to the peer link.
pub trait LocalTrack: Clone {
    fn kind(&self) -> MediaKind;
    fn stop(&self);
    fn set_enabled(&self, enabled: bool);
}

/// Handle to the inbound media the remote participant is sending.
pub trait RemoteFeed: Clone {
    fn stop(&self);
}

/// Device capture capability. The mechanics of acquiring camera and
/// microphone are the embedder's concern; the lifecycle only asks for tracks
/// matching a facing mode.
#[async_trait(?Send)]
pub trait MediaSource {
    type Track: LocalTrack;

    async fn acquire(
        &self,
        constraints: CaptureConstraints,
    ) -> Result<Vec<Self::Track>, DeviceError>;
}
