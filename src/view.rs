//! Derived View Builder for Smartmark.
//!
//! Pure projection of the record store for display: favorites first, newest
//! first within each group, then a case-insensitive substring filter over
//! title or URL. No hidden state; equal inputs always yield an identically
//! ordered result.

use std::cmp::Ordering;

use crate::types::bookmark::Bookmark;

/// Builds the display sequence from a store snapshot and the search text.
///
/// An empty or whitespace-only query yields the full sorted sequence.
pub fn build_view(records: &[&Bookmark], query: &str) -> Vec<Bookmark> {
    let mut view: Vec<Bookmark> = records.iter().map(|r| (*r).clone()).collect();
    view.sort_by(compare);

    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return view;
    }
    view.retain(|bm| {
        bm.title.to_lowercase().contains(&needle) || bm.url.to_lowercase().contains(&needle)
    });
    view
}

/// Count of favorited records, for the header stat card.
pub fn favorite_count(records: &[&Bookmark]) -> usize {
    records.iter().filter(|r| r.is_favorite).count()
}

/// Favorites group first, then `created_at` descending; id breaks timestamp
/// ties so the order is total.
fn compare(a: &Bookmark, b: &Bookmark) -> Ordering {
    b.is_favorite
        .cmp(&a.is_favorite)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}
