use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier the relay assigns to a live transport connection.
///
/// Ephemeral: it exists for the connection's lifetime only and is never
/// reused while any reference to it is outstanding.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
