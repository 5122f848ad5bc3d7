//! Edit sessions held on behalf of HTTP clients.
//!
//! A client opening a form acquires a session and gets a token back; undo
//! and redo stay disabled until the token is released. The registry owns
//! the [`EditSession`] guards, so releasing a token is just dropping its
//! guard.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use repertoire_core::undo::{EditSession, UndoHistory};
use uuid::Uuid;

/// Open edit sessions keyed by client token.
#[derive(Default)]
pub struct EditSessionRegistry {
    sessions: Mutex<HashMap<Uuid, EditSession>>,
}

impl EditSessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, EditSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a session against `history` and return its token.
    pub fn acquire(&self, history: &UndoHistory) -> Uuid {
        let token = Uuid::new_v4();
        self.lock().insert(token, history.begin_edit());
        tracing::debug!(%token, "Edit session opened");
        token
    }

    /// Close the session behind `token`. Returns `false` if it was not open.
    pub fn release(&self, token: Uuid) -> bool {
        let released = self.lock().remove(&token).is_some();
        if released {
            tracing::debug!(%token, "Edit session closed");
        }
        released
    }

    /// Close every open session, returning how many there were.
    pub fn release_all(&self) -> usize {
        let drained: Vec<EditSession> = self.lock().drain().map(|(_, s)| s).collect();
        drained.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
