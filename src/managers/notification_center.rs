//! Notification Center for Smartmark.
//!
//! Holds the transient user-facing messages (toasts) produced by mutations.
//! Failed remote operations surface exactly one generic message here; raw
//! error detail never reaches the user.

use crate::types::notification::{Notification, NotificationKind};

/// Trait defining the notification queue interface.
pub trait NotificationCenterTrait {
    /// Queues a success message. Returns the notification id.
    fn push_success(&mut self, message: &str) -> u64;
    /// Queues an error message. Returns the notification id.
    fn push_error(&mut self, message: &str) -> u64;
    /// Dismisses a notification by id. Returns true if it was present.
    fn dismiss(&mut self, id: u64) -> bool;
    /// Currently visible notifications, oldest first.
    fn active(&self) -> &[Notification];
    fn clear(&mut self);
}

/// In-memory notification queue with monotonically increasing ids.
pub struct NotificationCenter {
    notifications: Vec<Notification>,
    next_id: u64,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self {
            notifications: Vec::new(),
            next_id: 1,
        }
    }

    fn push(&mut self, message: &str, kind: NotificationKind) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.notifications.push(Notification {
            id,
            message: message.to_string(),
            kind,
        });
        id
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenterTrait for NotificationCenter {
    fn push_success(&mut self, message: &str) -> u64 {
        self.push(message, NotificationKind::Success)
    }

    fn push_error(&mut self, message: &str) -> u64 {
        self.push(message, NotificationKind::Error)
    }

    fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    fn active(&self) -> &[Notification] {
        &self.notifications
    }

    fn clear(&mut self) {
        self.notifications.clear();
    }
}
