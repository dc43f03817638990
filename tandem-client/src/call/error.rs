use crate::call::CallPhase;
use crate::media::DeviceError;
use crate::session::NegotiationError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallError {
    /// The relay refused the join, e.g. the room already has two members.
    #[error("join rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    /// The intent is not legal in the current phase.
    #[error("not allowed while {phase:?}")]
    WrongPhase { phase: CallPhase },
}
