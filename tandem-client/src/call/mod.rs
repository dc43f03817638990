mod error;
mod lifecycle;
mod phase;

pub use error::*;
pub use lifecycle::*;
pub use phase::*;
