mod controller;
mod error;
mod peer_link;
mod state;

pub use controller::*;
pub use error::*;
pub use peer_link::*;
pub use state::*;
