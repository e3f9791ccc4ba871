//! Session wiring for Smartmark.
//!
//! An explicitly constructed session context: resolves the authenticated
//! user, establishes the change feed, owns the sync engine, and tears
//! everything down with a single call. No ambient globals. Change-feed
//! events are pumped from the feed's single-consumer queue into the engine
//! on the caller's thread, so the record store keeps exactly one writer.

use std::sync::Arc;

use crate::managers::sync_engine::{SyncEngine, SyncEngineTrait};
use crate::services::auth::AuthProviderTrait;
use crate::services::remote_store::{ChangeFeed, RemoteStoreTrait};
use crate::types::errors::SessionError;
use crate::types::user::User;

/// A live sync session for one signed-in user.
pub struct Session {
    user: User,
    engine: SyncEngine,
    feed: ChangeFeed,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Opens a session: requires a signed-in user, subscribes the change
    /// feed, then performs the initial bulk load. A failed load still yields
    /// a usable session (the failure is queued as a notification and the
    /// store stays empty).
    pub fn open(
        auth: &dyn AuthProviderTrait,
        remote: Arc<dyn RemoteStoreTrait>,
    ) -> Result<Self, SessionError> {
        let user = auth
            .current_user()
            .map_err(|e| SessionError::Remote(e.to_string()))?
            .ok_or(SessionError::NotAuthenticated)?;

        // Subscribe before the bulk fetch so no mutation slips between them;
        // replayed overlap is absorbed by the idempotent merge.
        let feed = remote
            .subscribe(&user.id)
            .map_err(|e| SessionError::Remote(e.to_string()))?;

        let mut engine = SyncEngine::new(&user.id, remote);
        engine.load();

        Ok(Self { user, engine, feed })
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SyncEngine {
        &mut self.engine
    }

    /// Applies every change-feed event queued so far. Returns how many were
    /// applied.
    pub fn pump_events(&mut self) -> usize {
        let events = self.feed.drain();
        let applied = events.len();
        for event in events {
            self.engine.apply_event(event);
        }
        applied
    }

    /// Tears the session down: the change feed is unsubscribed so no further
    /// events can reach the discarded store. In-flight remote calls are not
    /// cancelled; their results simply never get applied.
    pub fn close(self) {
        self.feed.unsubscribe();
    }
}
