
pub use harness::*;
pub use mock_link::*;
pub use mock_media::*;
pub use sinks::*;
