//! In-memory remote store backend.
//!
//! Stands in for the hosted data service in tests and local development.
//! Cloned handles share one state and behave as separate sessions of the
//! same user, and every mutation is broadcast to all live change-feed
//! subscribers of the owning user — which is exactly what lets tests
//! reproduce the optimistic-path vs change-feed races the sync engine must
//! tolerate. Failure injection makes the next matching call fail with a
//! transport error.

use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::services::auth::AuthProviderTrait;
use crate::services::remote_store::{ChangeFeed, RemoteStoreTrait};
use crate::types::bookmark::{Bookmark, BookmarkDraft, BookmarkPatch};
use crate::types::errors::{AuthError, RemoteError};
use crate::types::event::{ChangeEvent, ChangeKind};
use crate::types::user::User;

/// Operations whose next call can be forced to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOp {
    FetchAll,
    Create,
    Update,
    Delete,
    DeleteAll,
    Subscribe,
}

struct Subscriber {
    id: u64,
    user_id: String,
    sender: Sender<ChangeEvent>,
}

struct Inner {
    rows: Vec<Bookmark>,
    subscribers: Vec<Subscriber>,
    fail_next: Vec<FailOp>,
    forced_ids: Vec<String>,
    next_subscriber_id: u64,
    clock: i64,
    user: Option<User>,
}

/// In-memory backend; clones share state.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                rows: Vec::new(),
                subscribers: Vec::new(),
                fail_next: Vec::new(),
                forced_ids: Vec::new(),
                next_subscriber_id: 1,
                // Arbitrary recent epoch-millis base; creates get distinct,
                // increasing timestamps.
                clock: 1_700_000_000_000,
                user: None,
            })),
        }
    }

    /// Makes the next call of the given kind fail with a transport error.
    pub fn fail_next(&self, op: FailOp) {
        self.inner.lock().unwrap().fail_next.push(op);
    }

    /// Forces the next created row to receive this id instead of a random
    /// UUID.
    pub fn assign_next_id(&self, id: &str) {
        self.inner.lock().unwrap().forced_ids.push(id.to_string());
    }

    /// Inserts a row directly, without broadcasting a change event.
    pub fn seed(&self, record: Bookmark) {
        self.inner.lock().unwrap().rows.push(record);
    }

    /// Signs a user in for the `AuthProviderTrait` surface.
    pub fn set_user(&self, user: Option<User>) {
        self.inner.lock().unwrap().user = user;
    }

    /// Server-side rows for the user, newest first.
    pub fn rows_for(&self, user_id: &str) -> Vec<Bookmark> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Bookmark> = inner
            .rows
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap().subscribers.len()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn take_failure(&mut self, op: FailOp) -> bool {
        if let Some(pos) = self.fail_next.iter().position(|f| *f == op) {
            self.fail_next.remove(pos);
            return true;
        }
        false
    }

    fn broadcast(&mut self, user_id: &str, event: ChangeEvent) {
        // Drop subscribers whose receiving end is gone.
        self.subscribers.retain(|sub| {
            if sub.user_id != user_id {
                return true;
            }
            sub.sender.send(event.clone()).is_ok()
        });
    }
}

impl RemoteStoreTrait for MemoryBackend {
    fn fetch_all(&self, user_id: &str) -> Result<Vec<Bookmark>, RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.take_failure(FailOp::FetchAll) {
            return Err(RemoteError::Transport("injected fetch failure".to_string()));
        }
        let mut rows: Vec<Bookmark> = inner
            .rows
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn create(&self, user_id: &str, draft: &BookmarkDraft) -> Result<Bookmark, RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.take_failure(FailOp::Create) {
            return Err(RemoteError::Transport("injected create failure".to_string()));
        }
        let id = if inner.forced_ids.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            inner.forced_ids.remove(0)
        };
        inner.clock += 1;
        let record = Bookmark {
            id,
            user_id: user_id.to_string(),
            title: draft.title().to_string(),
            url: draft.url().to_string(),
            is_favorite: false,
            created_at: inner.clock,
        };
        inner.rows.push(record.clone());
        inner.broadcast(
            user_id,
            ChangeEvent {
                kind: ChangeKind::Insert,
                record: record.clone(),
            },
        );
        Ok(record)
    }

    fn update(&self, id: &str, patch: &BookmarkPatch) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.take_failure(FailOp::Update) {
            return Err(RemoteError::Transport("injected update failure".to_string()));
        }
        let updated = match inner.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                if let Some(title) = &patch.title {
                    row.title = title.clone();
                }
                if let Some(url) = &patch.url {
                    row.url = url.clone();
                }
                if let Some(fav) = patch.is_favorite {
                    row.is_favorite = fav;
                }
                Some(row.clone())
            }
            // Updating a missing row affects zero rows and still succeeds,
            // matching the hosted service.
            None => None,
        };
        if let Some(record) = updated {
            let user_id = record.user_id.clone();
            inner.broadcast(
                &user_id,
                ChangeEvent {
                    kind: ChangeKind::Update,
                    record,
                },
            );
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.take_failure(FailOp::Delete) {
            return Err(RemoteError::Transport("injected delete failure".to_string()));
        }
        if let Some(pos) = inner.rows.iter().position(|r| r.id == id) {
            let record = inner.rows.remove(pos);
            let user_id = record.user_id.clone();
            inner.broadcast(
                &user_id,
                ChangeEvent {
                    kind: ChangeKind::Delete,
                    record,
                },
            );
        }
        Ok(())
    }

    fn delete_all_for_user(&self, user_id: &str) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.take_failure(FailOp::DeleteAll) {
            return Err(RemoteError::Transport(
                "injected bulk delete failure".to_string(),
            ));
        }
        let removed: Vec<Bookmark> = inner
            .rows
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        inner.rows.retain(|r| r.user_id != user_id);
        for record in removed {
            inner.broadcast(
                user_id,
                ChangeEvent {
                    kind: ChangeKind::Delete,
                    record,
                },
            );
        }
        Ok(())
    }

    fn subscribe(&self, user_id: &str) -> Result<ChangeFeed, RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.take_failure(FailOp::Subscribe) {
            return Err(RemoteError::Transport(
                "injected subscribe failure".to_string(),
            ));
        }
        let (sender, receiver) = mpsc::channel();
        let id = inner.next_subscriber_id;
        inner.next_subscriber_id += 1;
        inner.subscribers.push(Subscriber {
            id,
            user_id: user_id.to_string(),
            sender,
        });
        let shared = Arc::clone(&self.inner);
        let canceller = Box::new(move || {
            shared
                .lock()
                .unwrap()
                .subscribers
                .retain(|sub| sub.id != id);
        });
        Ok(ChangeFeed::new(receiver, canceller))
    }
}

impl AuthProviderTrait for MemoryBackend {
    fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(self.inner.lock().unwrap().user.clone())
    }

    fn sign_in_url(&self, provider: &str, redirect_to: &str) -> Result<String, AuthError> {
        Ok(format!(
            "memory://authorize?provider={}&redirect_to={}",
            provider, redirect_to
        ))
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        self.inner.lock().unwrap().user = None;
        Ok(())
    }
}
