pub use tandem_core::model::ConnectionId;

pub mod model {
    pub use tandem_core::model::*;
}

/// Platform-independent call core: lifecycle, negotiation and the seams an
/// embedder implements.
pub mod call {
    pub use tandem_client::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use tandem_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use tandem_wasm::*;
}
