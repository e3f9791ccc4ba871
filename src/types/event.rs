use serde::{Deserialize, Serialize};

use crate::types::bookmark::Bookmark;

/// Mutation kinds delivered by the change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row-level mutation event scoped to one user's bookmarks.
///
/// Delivery is at-least-once and may race with this session's own optimistic
/// mutations; application must therefore be idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub record: Bookmark,
}
