use tandem_core::SdpKind;
use thiserror::Error;

/// A failed offer/answer application. The controller survives it; the caller
/// decides whether to reset the whole session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    #[error("peer link rejected the operation: {0}")]
    Link(String),

    #[error("a {got:?} description cannot be applied here")]
    UnexpectedKind { got: SdpKind },

    /// The session was cleared while the operation was suspended.
    #[error("no active session")]
    NoSession,
}
