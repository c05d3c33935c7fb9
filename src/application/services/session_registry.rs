use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::{ConnectionId, UserId};

/// Ephemeral binding of live connections to verified user identities.
///
/// Owned by the server process; entries exist only in memory for the
/// connection's lifetime and are cleared on disconnect.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<ConnectionId, UserId>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the association, overwriting any prior one for the
    /// connection.
    pub fn bind(&self, connection_id: ConnectionId, user_id: UserId) {
        self.sessions
            .write()
            .expect("session registry lock poisoned")
            .insert(connection_id, user_id);
    }

    pub fn lookup(&self, connection_id: ConnectionId) -> Result<UserId, SessionError> {
        self.sessions
            .read()
            .expect("session registry lock poisoned")
            .get(&connection_id)
            .cloned()
            .ok_or(SessionError::NotAuthenticated)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions
            .read()
            .expect("session registry lock poisoned")
            .len()
    }

    /// Idempotent: unbinding an unknown connection is a no-op.
    pub fn unbind(&self, connection_id: ConnectionId) {
        self.sessions
            .write()
            .expect("session registry lock poisoned")
            .remove(&connection_id);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Not authenticated")]
    NotAuthenticated,
}
