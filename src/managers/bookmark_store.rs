//! Bookmark Record Store for Smartmark.
//!
//! In-memory collection of the session user's bookmarks, keyed by `id`.
//! Single source of truth for the UI; every mutation is idempotent with
//! respect to `id`, so replayed change-feed events and optimistic/remote
//! races cannot duplicate a record.

use std::collections::HashMap;

use crate::types::bookmark::Bookmark;

/// Trait defining the record store interface.
pub trait BookmarkStoreTrait {
    /// Replaces the whole collection (initial load, resync after a failed
    /// delete).
    fn replace_all(&mut self, records: Vec<Bookmark>);
    /// Inserts the record, or overwrites the fields of the existing record
    /// with the same id.
    fn upsert(&mut self, record: Bookmark);
    /// Inserts only when the id is not already present. Returns true if the
    /// record was inserted.
    fn insert_if_absent(&mut self, record: Bookmark) -> bool;
    /// Removes the record with the given id. Returns true if it was present.
    fn remove(&mut self, id: &str) -> bool;
    fn remove_all(&mut self);
    fn get(&self, id: &str) -> Option<&Bookmark>;
    /// All records, in no particular order. Display ordering is the derived
    /// view's job.
    fn all(&self) -> Vec<&Bookmark>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn is_loading(&self) -> bool;
    fn set_loading(&mut self, loading: bool);
}

/// In-memory bookmark record store.
pub struct BookmarkStore {
    records: HashMap<String, Bookmark>,
    loading: bool,
}

impl BookmarkStore {
    /// Creates an empty store. The loading flag starts set; the initial
    /// fetch clears it.
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            loading: true,
        }
    }
}

impl Default for BookmarkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookmarkStoreTrait for BookmarkStore {
    fn replace_all(&mut self, records: Vec<Bookmark>) {
        self.records = records.into_iter().map(|r| (r.id.clone(), r)).collect();
    }

    fn upsert(&mut self, record: Bookmark) {
        self.records.insert(record.id.clone(), record);
    }

    fn insert_if_absent(&mut self, record: Bookmark) -> bool {
        if self.records.contains_key(&record.id) {
            return false;
        }
        self.records.insert(record.id.clone(), record);
        true
    }

    fn remove(&mut self, id: &str) -> bool {
        self.records.remove(id).is_some()
    }

    fn remove_all(&mut self) {
        self.records.clear();
    }

    fn get(&self, id: &str) -> Option<&Bookmark> {
        self.records.get(id)
    }

    fn all(&self) -> Vec<&Bookmark> {
        self.records.values().collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}
