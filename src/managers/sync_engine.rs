//! Sync Engine for Smartmark.
//!
//! The reconciliation layer: merges locally-initiated optimistic mutations
//! with remote confirmations and with change-feed events into one consistent
//! record store. Mutations appear to succeed instantly where that is safe to
//! undo; everything else waits for the remote confirmation. Every method
//! catches remote failures, performs its rollback or resync, queues a generic
//! notification, and reports success as a plain boolean.

use std::sync::Arc;

use crate::managers::bookmark_store::{BookmarkStore, BookmarkStoreTrait};
use crate::managers::notification_center::{NotificationCenter, NotificationCenterTrait};
use crate::services::remote_store::RemoteStoreTrait;
use crate::types::bookmark::{BookmarkDraft, BookmarkPatch};
use crate::types::event::{ChangeEvent, ChangeKind};

/// Trait defining the reconciliation operations.
pub trait SyncEngineTrait {
    /// Bulk-fetches the user's bookmarks into the store and clears the
    /// loading flag.
    fn load(&mut self) -> bool;
    /// Creates a bookmark. No optimistic insert: the server assigns the id,
    /// so the record enters the store only once the remote echoes it back.
    fn create(&mut self, draft: &BookmarkDraft) -> bool;
    /// Deletes a bookmark optimistically; a failed remote delete triggers a
    /// full resync to server truth.
    fn remove(&mut self, id: &str) -> bool;
    /// Deletes every bookmark optimistically; same resync-on-failure policy.
    fn remove_all(&mut self) -> bool;
    /// Flips the favorite flag optimistically; a failed update flips it back.
    fn toggle_favorite(&mut self, id: &str) -> bool;
    /// Edits title/url. No optimistic apply: the store changes only after
    /// the remote confirms, so a failure leaves the edit UI open over an
    /// untouched store.
    fn edit(&mut self, id: &str, draft: &BookmarkDraft) -> bool;
    /// Applies one change-feed event. Idempotent under replay.
    fn apply_event(&mut self, event: ChangeEvent);
}

/// Reconciliation layer over the record store and the remote store.
pub struct SyncEngine {
    user_id: String,
    store: BookmarkStore,
    notifications: NotificationCenter,
    remote: Arc<dyn RemoteStoreTrait>,
}

impl SyncEngine {
    pub fn new(user_id: &str, remote: Arc<dyn RemoteStoreTrait>) -> Self {
        Self {
            user_id: user_id.to_string(),
            store: BookmarkStore::new(),
            notifications: NotificationCenter::new(),
            remote,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn store(&self) -> &BookmarkStore {
        &self.store
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Dismisses a queued notification (timer-driven in the UI layer).
    pub fn dismiss_notification(&mut self, id: u64) -> bool {
        self.notifications.dismiss(id)
    }

    /// Overwrites the store with server truth after a failed delete. No local
    /// undo is attempted: concurrent edits may have landed in the interim.
    fn resync(&mut self) {
        match self.remote.fetch_all(&self.user_id) {
            Ok(records) => self.store.replace_all(records),
            Err(err) => {
                // No further fallback; the store keeps its optimistic state.
                log::warn!("resync after failed delete also failed: {}", err);
            }
        }
    }
}

impl SyncEngineTrait for SyncEngine {
    fn load(&mut self) -> bool {
        self.store.set_loading(true);
        match self.remote.fetch_all(&self.user_id) {
            Ok(records) => {
                self.store.replace_all(records);
                self.store.set_loading(false);
                true
            }
            Err(err) => {
                log::warn!("initial bookmark fetch failed: {}", err);
                self.store.set_loading(false);
                self.notifications.push_error("Couldn't load your bookmarks");
                false
            }
        }
    }

    fn create(&mut self, draft: &BookmarkDraft) -> bool {
        match self.remote.create(&self.user_id, draft) {
            Ok(record) => {
                // The change feed may have delivered this id already; first
                // writer wins and the second insert is a no-op.
                if !self.store.insert_if_absent(record) {
                    log::debug!("created record already present via change feed");
                }
                self.notifications
                    .push_success(&format!("Saved \"{}\"", draft.title()));
                true
            }
            Err(err) => {
                log::warn!("bookmark create failed: {}", err);
                self.notifications
                    .push_error("Couldn't save that one, try again");
                false
            }
        }
    }

    fn remove(&mut self, id: &str) -> bool {
        let title = match self.store.get(id) {
            Some(record) => record.title.clone(),
            None => return false,
        };

        // Optimistic: drop it from the store before the remote call.
        self.store.remove(id);
        self.notifications
            .push_success(&format!("Removed \"{}\"", title));

        match self.remote.delete(id) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("bookmark delete failed: {}", err);
                self.notifications.push_error("Delete failed, refreshing...");
                self.resync();
                false
            }
        }
    }

    fn remove_all(&mut self) -> bool {
        let count = self.store.len();
        self.store.remove_all();
        let plural = if count == 1 { "" } else { "s" };
        self.notifications
            .push_success(&format!("Cleared {} bookmark{}", count, plural));

        match self.remote.delete_all_for_user(&self.user_id) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("bulk delete failed: {}", err);
                self.notifications
                    .push_error("Bulk delete failed, refreshing...");
                self.resync();
                false
            }
        }
    }

    fn toggle_favorite(&mut self, id: &str) -> bool {
        let mut record = match self.store.get(id) {
            Some(record) => record.clone(),
            None => return false,
        };
        let next = !record.is_favorite;

        // Optimistic flip, exact undo on failure: a single boolean with no
        // other expected concurrent writer.
        record.is_favorite = next;
        self.store.upsert(record.clone());

        match self.remote.update(id, &BookmarkPatch::favorite(next)) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("favorite toggle failed: {}", err);
                record.is_favorite = !next;
                self.store.upsert(record);
                self.notifications.push_error("Couldn't update favorite");
                false
            }
        }
    }

    fn edit(&mut self, id: &str, draft: &BookmarkDraft) -> bool {
        match self.remote.update(id, &BookmarkPatch::fields(draft)) {
            Ok(()) => {
                if let Some(record) = self.store.get(id) {
                    let mut updated = record.clone();
                    updated.title = draft.title().to_string();
                    updated.url = draft.url().to_string();
                    self.store.upsert(updated);
                }
                self.notifications.push_success("Bookmark updated");
                true
            }
            Err(err) => {
                log::warn!("bookmark edit failed: {}", err);
                self.notifications.push_error("Update failed, try again");
                false
            }
        }
    }

    fn apply_event(&mut self, event: ChangeEvent) {
        match event.kind {
            ChangeKind::Insert => {
                // Guards against double-insert racing the optimistic-create
                // path above.
                if !self.store.insert_if_absent(event.record) {
                    log::debug!("change-feed insert skipped, id already present");
                }
            }
            ChangeKind::Update => self.store.upsert(event.record),
            ChangeKind::Delete => {
                self.store.remove(&event.record.id);
            }
        }
    }
}
