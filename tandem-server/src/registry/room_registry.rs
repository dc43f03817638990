use dashmap::DashMap;
use tandem_core::ConnectionId;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMember {
    pub connection_id: ConnectionId,
    pub display_name: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("room \"{room}\" is full")]
    RoomFull { room: String },
}

/// Tracks which connections belong to which room and enforces the
/// two-participant cap.
///
/// The capacity check and the insert happen under a single map entry lock,
/// so two near-simultaneous joins cannot both observe a free slot.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, Vec<RoomMember>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    pub fn join(
        &self,
        connection_id: ConnectionId,
        room: &str,
        display_name: &str,
    ) -> Result<(), RegistryError> {
        let mut members = self.rooms.entry(room.to_string()).or_default();

        if let Some(existing) = members
            .iter_mut()
            .find(|m| m.connection_id == connection_id)
        {
            // Re-join by a live connection refreshes its entry instead of
            // double-counting it.
            existing.display_name = display_name.to_string();
            return Ok(());
        }

        if members.len() >= 2 {
            return Err(RegistryError::RoomFull {
                room: room.to_string(),
            });
        }

        members.push(RoomMember {
            connection_id,
            display_name: display_name.to_string(),
        });
        info!("Room '{}' now has {} member(s)", room, members.len());
        Ok(())
    }

    /// Removes the connection from every room it appears in. Removing an
    /// absent connection is a no-op.
    pub fn leave(&self, connection_id: &ConnectionId) {
        self.rooms.retain(|_, members| {
            members.retain(|m| m.connection_id != *connection_id);
            !members.is_empty()
        });
    }

    /// Removes both named connections, used by hang-up flows that clear the
    /// local side along with the evicted one.
    pub fn evict(&self, target: &ConnectionId, requester: &ConnectionId) {
        self.rooms.retain(|_, members| {
            members.retain(|m| m.connection_id != *target && m.connection_id != *requester);
            !members.is_empty()
        });
    }

    pub fn members(&self, room: &str) -> Vec<RoomMember> {
        self.rooms
            .get(room)
            .map(|members| members.clone())
            .unwrap_or_default()
    }
}
