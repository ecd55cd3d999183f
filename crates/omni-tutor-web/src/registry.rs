//! Live sessions, keyed by id.
//!
//! The registry only maps ids to sessions. Each session sits behind its own
//! async mutex, held for a whole turn, so a session runs one turn at a time
//! while different sessions proceed independently.
//!
//! Nothing expires. WebSocket sessions are removed when their connection
//! closes; sessions created over REST stay until `DELETE /api/sessions/{id}`
//! or process exit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use omni_tutor::session::Session;
use tracing::debug;
use uuid::Uuid;

/// A session shared between the handlers that may touch it.
pub type SharedSession = Arc<tokio::sync::Mutex<Session>>;

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, SharedSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<Uuid, SharedSession>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create and register a fresh session.
    pub fn create(&self) -> (Uuid, SharedSession) {
        let session = Session::new();
        let id = session.id;
        let shared = Arc::new(tokio::sync::Mutex::new(session));
        self.map().insert(id, shared.clone());
        debug!(session = %id, "Session created");
        (id, shared)
    }

    pub fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.map().get(id).cloned()
    }

    /// Drop a session. Returns whether it existed.
    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.map().remove(id).is_some();
        if removed {
            debug!(session = %id, "Session removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }
}
