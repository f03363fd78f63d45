//! In-memory session store.
//!
//! Each user gets their own `tokio::sync::Mutex` around their conversation state. The
//! dispatcher holds that lock for the whole handling of one event, so two events from the
//! same user never interleave, while different users proceed independently. Sessions
//! never expire; a user's slot only lives as long as they are inside a flow or have an
//! event in progress.

use super::state::ConversationState;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Exclusive handle on one user's conversation state
pub type SessionGuard = OwnedMutexGuard<ConversationState>;

/// Map from external user id to that user's conversation state.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Arc<Mutex<ConversationState>>>>,
}

impl SessionStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the session of `user_key`, creating an idle one on first use.
    ///
    /// The outer map lock is released before waiting on the user's own lock.
    pub async fn lock(&self, user_key: &str) -> SessionGuard {
        let slot = {
            let mut sessions = self.sessions.lock().await;
            Arc::clone(sessions.entry(user_key.to_string()).or_default())
        };
        slot.lock_owned().await
    }

    /// Unlocks a session, dropping its slot when it is idle and no other event for the
    /// same user is waiting on it.
    ///
    /// The map lock is held while checking, so no new waiter can pick up the slot between
    /// the check and the removal.
    pub async fn release(&self, user_key: &str, guard: SessionGuard) {
        let mut sessions = self.sessions.lock().await;
        // One reference in the map, one inside the guard
        let unshared = sessions
            .get(user_key)
            .is_some_and(|slot| Arc::strong_count(slot) == 2);
        if guard.is_idle() && unshared {
            sessions.remove(user_key);
        }
        drop(guard);
    }

    /// Copy of the user's current state (idle if they have no session).
    pub async fn current(&self, user_key: &str) -> ConversationState {
        let slot = self.sessions.lock().await.get(user_key).map(Arc::clone);
        match slot {
            Some(slot) => slot.lock().await.clone(),
            None => ConversationState::Idle,
        }
    }

    /// Overwrites the user's state.
    pub async fn set(&self, user_key: &str, state: ConversationState) {
        let mut guard = self.lock(user_key).await;
        *guard = state;
        self.release(user_key, guard).await;
    }

    /// Number of users holding a session slot
    pub async fn tracked_users(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Number of users currently inside a flow
    pub async fn active_flows(&self) -> usize {
        let slots: Vec<_> = self.sessions.lock().await.values().map(Arc::clone).collect();
        let mut active = 0;
        for slot in slots {
            if !slot.lock().await.is_idle() {
                active += 1;
            }
        }
        active
    }
}
