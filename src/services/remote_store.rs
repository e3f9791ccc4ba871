//! Remote Store contract for Smartmark.
//!
//! Thin request/response and subscription surface over the hosted backend:
//! row CRUD on the user's bookmarks plus a long-lived change feed delivering
//! every mutation on the user's rows from any session. No retries and no
//! timeouts here; the sync engine decides what a failure means.

use std::sync::mpsc::Receiver;

use crate::types::bookmark::{Bookmark, BookmarkDraft, BookmarkPatch};
use crate::types::errors::RemoteError;
use crate::types::event::ChangeEvent;

/// Trait defining the remote store operations.
pub trait RemoteStoreTrait: Send + Sync {
    /// Fetches every bookmark owned by the user, ordered newest first.
    fn fetch_all(&self, user_id: &str) -> Result<Vec<Bookmark>, RemoteError>;
    /// Persists a new bookmark and returns the stored row, including the
    /// server-assigned `id` and `created_at`.
    fn create(&self, user_id: &str, draft: &BookmarkDraft) -> Result<Bookmark, RemoteError>;
    /// Applies a partial update to the row with the given id.
    fn update(&self, id: &str, patch: &BookmarkPatch) -> Result<(), RemoteError>;
    fn delete(&self, id: &str) -> Result<(), RemoteError>;
    fn delete_all_for_user(&self, user_id: &str) -> Result<(), RemoteError>;
    /// Establishes a change feed scoped to the user's rows. Delivery is
    /// at-least-once and may race with this session's own mutations.
    fn subscribe(&self, user_id: &str) -> Result<ChangeFeed, RemoteError>;
}

/// Handle to an established change feed.
///
/// Events are queued into a single-consumer channel and pulled by the
/// session's event pump on its own thread, so the record store only ever has
/// one writer. Dropping the handle (or calling [`ChangeFeed::unsubscribe`])
/// detaches it from the backend; events delivered afterwards go nowhere.
pub struct ChangeFeed {
    receiver: Receiver<ChangeEvent>,
    canceller: Option<Box<dyn FnOnce() + Send>>,
}

impl ChangeFeed {
    pub fn new(receiver: Receiver<ChangeEvent>, canceller: Box<dyn FnOnce() + Send>) -> Self {
        Self {
            receiver,
            canceller: Some(canceller),
        }
    }

    /// Takes every event queued so far without blocking.
    pub fn drain(&self) -> Vec<ChangeEvent> {
        self.receiver.try_iter().collect()
    }

    /// Takes the next queued event, if any, without blocking.
    pub fn try_next(&self) -> Option<ChangeEvent> {
        self.receiver.try_recv().ok()
    }

    /// Tears the subscription down explicitly.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.canceller.take() {
            cancel();
        }
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        if let Some(cancel) = self.canceller.take() {
            cancel();
        }
    }
}
