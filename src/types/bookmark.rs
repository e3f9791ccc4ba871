use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::errors::ValidationError;

/// A saved bookmark row, as served by the remote store.
///
/// `id` and `created_at` are assigned by the remote store at creation and
/// never change afterwards; `user_id` always equals the session's
/// authenticated user. `created_at` is a unix timestamp in milliseconds and
/// is the secondary ordering key for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub url: String,
    pub is_favorite: bool,
    pub created_at: i64,
}

/// A validated title/URL pair, the only input accepted by the create and
/// edit paths.
///
/// Construction trims both fields and rejects empty titles, empty URLs, and
/// URLs that do not parse as absolute URLs, so a `BookmarkDraft` in hand
/// means the record-store invariants hold.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkDraft {
    title: String,
    url: String,
}

impl BookmarkDraft {
    pub fn new(title: &str, url: &str) -> Result<Self, ValidationError> {
        let title = title.trim();
        let url = url.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        Url::parse(url).map_err(|_| ValidationError::InvalidUrl(url.to_string()))?;
        Ok(Self {
            title: title.to_string(),
            url: url.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Partial update sent to the remote store. Absent fields are left untouched
/// on the server row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookmarkPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl BookmarkPatch {
    /// Patch that only flips the favorite flag.
    pub fn favorite(value: bool) -> Self {
        Self {
            is_favorite: Some(value),
            ..Self::default()
        }
    }

    /// Patch carrying the new title and URL of an edit.
    pub fn fields(draft: &BookmarkDraft) -> Self {
        Self {
            title: Some(draft.title().to_string()),
            url: Some(draft.url().to_string()),
            is_favorite: None,
        }
    }
}
