//! Unit tests for the SyncEngine reconciliation policies.
//!
//! Exercises every mutation path against the in-memory backend, using its
//! failure injection to drive the rollback and resync branches, and its
//! change-feed broadcast to reproduce the optimistic-path vs feed races.

use std::sync::Arc;

use smartmark::managers::bookmark_store::BookmarkStoreTrait;
use smartmark::managers::notification_center::NotificationCenterTrait;
use smartmark::managers::sync_engine::{SyncEngine, SyncEngineTrait};
use smartmark::services::memory_backend::{FailOp, MemoryBackend};
use smartmark::services::remote_store::RemoteStoreTrait;
use smartmark::types::bookmark::{Bookmark, BookmarkDraft};
use smartmark::types::event::{ChangeEvent, ChangeKind};
use smartmark::types::notification::NotificationKind;

const USER: &str = "user-1";

fn bookmark(id: &str, title: &str, created_at: i64) -> Bookmark {
    Bookmark {
        id: id.to_string(),
        user_id: USER.to_string(),
        title: title.to_string(),
        url: format!("https://{}.example.com", id),
        is_favorite: false,
        created_at,
    }
}

fn engine_over(backend: &MemoryBackend) -> SyncEngine {
    SyncEngine::new(USER, Arc::new(backend.clone()))
}

// === Load ===

#[test]
fn load_replaces_store_and_clears_loading() {
    let backend = MemoryBackend::new();
    backend.seed(bookmark("a", "A", 1));
    backend.seed(bookmark("b", "B", 2));

    let mut engine = engine_over(&backend);
    assert!(engine.load());
    assert_eq!(engine.store().len(), 2);
    assert!(!engine.store().is_loading());
}

#[test]
fn failed_load_clears_loading_and_notifies() {
    let backend = MemoryBackend::new();
    backend.fail_next(FailOp::FetchAll);

    let mut engine = engine_over(&backend);
    assert!(!engine.load());
    assert!(!engine.store().is_loading());
    assert_eq!(engine.notifications().active().len(), 1);
    assert_eq!(
        engine.notifications().active()[0].kind,
        NotificationKind::Error
    );
}

// === Create ===

#[test]
fn create_admits_the_server_echoed_record() {
    let backend = MemoryBackend::new();
    let mut engine = engine_over(&backend);
    engine.load();

    let draft = BookmarkDraft::new("Foo", "http://foo.com").unwrap();
    assert!(engine.create(&draft));

    assert_eq!(engine.store().len(), 1);
    let stored = engine.store().all()[0];
    assert_eq!(stored.title, "Foo");
    assert!(!stored.id.is_empty());
    // No local invention: the record matches the server row exactly.
    assert_eq!(backend.rows_for(USER)[0], *stored);
}

#[test]
fn failed_create_inserts_nothing() {
    let backend = MemoryBackend::new();
    backend.fail_next(FailOp::Create);
    let mut engine = engine_over(&backend);
    engine.load();

    let draft = BookmarkDraft::new("Foo", "http://foo.com").unwrap();
    assert!(!engine.create(&draft));
    assert!(engine.store().is_empty());
    assert_eq!(engine.notifications().active().len(), 1);
    assert_eq!(
        engine.notifications().active()[0].message,
        "Couldn't save that one, try again"
    );
}

#[test]
fn create_race_with_change_feed_keeps_one_record() {
    // Scenario: create succeeds with server id "42" while the change-feed
    // insert for id "42" arrives first.
    let backend = MemoryBackend::new();
    backend.assign_next_id("42");
    let mut engine = engine_over(&backend);
    engine.load();

    let expected = bookmark("42", "Foo", 1_700_000_000_001);
    engine.apply_event(ChangeEvent {
        kind: ChangeKind::Insert,
        record: Bookmark {
            title: "Foo".to_string(),
            url: "http://foo.com".to_string(),
            ..expected.clone()
        },
    });

    let draft = BookmarkDraft::new("Foo", "http://foo.com").unwrap();
    assert!(engine.create(&draft));

    let with_id: Vec<_> = engine
        .store()
        .all()
        .into_iter()
        .filter(|b| b.id == "42")
        .collect();
    assert_eq!(with_id.len(), 1);
}

#[test]
fn create_race_through_the_live_feed_keeps_one_record() {
    let backend = MemoryBackend::new();
    let feed = backend.subscribe(USER).unwrap();
    let mut engine = engine_over(&backend);
    engine.load();

    let draft = BookmarkDraft::new("Foo", "http://foo.com").unwrap();
    assert!(engine.create(&draft));

    // The backend broadcast the same insert back at this session.
    let events = feed.drain();
    assert_eq!(events.len(), 1);
    for event in events {
        engine.apply_event(event);
    }
    assert_eq!(engine.store().len(), 1);
}

// === Delete ===

#[test]
fn remove_is_optimistic_and_confirms() {
    let backend = MemoryBackend::new();
    backend.seed(bookmark("a", "A", 1));
    let mut engine = engine_over(&backend);
    engine.load();

    assert!(engine.remove("a"));
    assert!(engine.store().is_empty());
    assert!(backend.rows_for(USER).is_empty());
}

#[test]
fn remove_unknown_id_is_a_local_no_op() {
    let backend = MemoryBackend::new();
    let mut engine = engine_over(&backend);
    engine.load();

    assert!(!engine.remove("ghost"));
    assert!(engine.notifications().active().is_empty());
}

#[test]
fn failed_remove_resyncs_to_server_truth() {
    let backend = MemoryBackend::new();
    backend.seed(bookmark("a", "A", 1));
    backend.seed(bookmark("b", "B", 2));
    let mut engine = engine_over(&backend);
    engine.load();

    backend.fail_next(FailOp::Delete);
    assert!(!engine.remove("a"));

    // The store equals a fresh fetch_all result: both rows are back.
    assert_eq!(engine.store().len(), 2);
    assert!(engine.store().get("a").is_some());
    let errors: Vec<_> = engine
        .notifications()
        .active()
        .iter()
        .filter(|n| n.kind == NotificationKind::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Delete failed, refreshing...");
}

#[test]
fn failed_remove_with_failed_resync_keeps_optimistic_state() {
    let backend = MemoryBackend::new();
    backend.seed(bookmark("a", "A", 1));
    let mut engine = engine_over(&backend);
    engine.load();

    backend.fail_next(FailOp::Delete);
    backend.fail_next(FailOp::FetchAll);
    assert!(!engine.remove("a"));

    // No further fallback exists; the optimistic removal stands.
    assert!(engine.store().is_empty());
}

// === Bulk delete ===

#[test]
fn remove_all_clears_store_and_server() {
    let backend = MemoryBackend::new();
    backend.seed(bookmark("a", "A", 1));
    backend.seed(bookmark("b", "B", 2));
    let mut engine = engine_over(&backend);
    engine.load();

    assert!(engine.remove_all());
    assert!(engine.store().is_empty());
    assert!(backend.rows_for(USER).is_empty());
    assert_eq!(
        engine.notifications().active()[0].message,
        "Cleared 2 bookmarks"
    );
}

#[test]
fn failed_remove_all_resyncs_to_server_truth() {
    let backend = MemoryBackend::new();
    backend.seed(bookmark("a", "A", 1));
    let mut engine = engine_over(&backend);
    engine.load();

    backend.fail_next(FailOp::DeleteAll);
    assert!(!engine.remove_all());
    assert_eq!(engine.store().len(), 1);
}

// === Favorite toggle ===

#[test]
fn toggle_favorite_applies_immediately() {
    let backend = MemoryBackend::new();
    backend.seed(bookmark("a", "A", 1));
    let mut engine = engine_over(&backend);
    engine.load();

    assert!(engine.toggle_favorite("a"));
    assert!(engine.store().get("a").unwrap().is_favorite);
    assert!(backend.rows_for(USER)[0].is_favorite);
}

#[test]
fn failed_toggle_rolls_back_to_prior_value() {
    // Scenario: store = [{id:1, title:"A", url:"http://a.com",
    // isFavorite:false, createdAt:t1}]; toggle fails.
    let backend = MemoryBackend::new();
    backend.seed(Bookmark {
        id: "1".to_string(),
        user_id: USER.to_string(),
        title: "A".to_string(),
        url: "http://a.com".to_string(),
        is_favorite: false,
        created_at: 1,
    });
    let mut engine = engine_over(&backend);
    engine.load();

    backend.fail_next(FailOp::Update);
    assert!(!engine.toggle_favorite("1"));

    assert!(!engine.store().get("1").unwrap().is_favorite);
    assert_eq!(engine.notifications().active().len(), 1);
    assert_eq!(
        engine.notifications().active()[0].message,
        "Couldn't update favorite"
    );
}

#[test]
fn toggle_unknown_id_makes_no_remote_call() {
    let backend = MemoryBackend::new();
    let mut engine = engine_over(&backend);
    engine.load();
    assert!(!engine.toggle_favorite("ghost"));
    assert!(engine.notifications().active().is_empty());
}

// === Edit ===

#[test]
fn edit_applies_only_after_confirmation() {
    let backend = MemoryBackend::new();
    backend.seed(bookmark("a", "Old title", 1));
    let mut engine = engine_over(&backend);
    engine.load();

    let draft = BookmarkDraft::new("New title", "https://new.example.com").unwrap();
    assert!(engine.edit("a", &draft));

    let stored = engine.store().get("a").unwrap();
    assert_eq!(stored.title, "New title");
    assert_eq!(stored.url, "https://new.example.com");
    assert_eq!(backend.rows_for(USER)[0].title, "New title");
}

#[test]
fn failed_edit_leaves_store_untouched() {
    let backend = MemoryBackend::new();
    backend.seed(bookmark("a", "Old title", 1));
    let mut engine = engine_over(&backend);
    engine.load();

    backend.fail_next(FailOp::Update);
    let draft = BookmarkDraft::new("New title", "https://new.example.com").unwrap();
    assert!(!engine.edit("a", &draft));

    assert_eq!(engine.store().get("a").unwrap().title, "Old title");
    assert_eq!(
        engine.notifications().active()[0].message,
        "Update failed, try again"
    );
}

// === Change-feed application ===

#[test]
fn feed_events_apply_idempotently() {
    let backend = MemoryBackend::new();
    let mut engine = engine_over(&backend);
    engine.load();

    let insert = ChangeEvent {
        kind: ChangeKind::Insert,
        record: bookmark("a", "A", 1),
    };
    engine.apply_event(insert.clone());
    engine.apply_event(insert);
    assert_eq!(engine.store().len(), 1);

    let update = ChangeEvent {
        kind: ChangeKind::Update,
        record: bookmark("a", "A renamed", 1),
    };
    engine.apply_event(update.clone());
    engine.apply_event(update);
    assert_eq!(engine.store().get("a").unwrap().title, "A renamed");

    let delete = ChangeEvent {
        kind: ChangeKind::Delete,
        record: bookmark("a", "A renamed", 1),
    };
    engine.apply_event(delete.clone());
    engine.apply_event(delete);
    assert!(engine.store().is_empty());
}

#[test]
fn feed_update_overwrites_unconditionally() {
    let backend = MemoryBackend::new();
    backend.seed(bookmark("a", "Local", 1));
    let mut engine = engine_over(&backend);
    engine.load();

    let mut remote = bookmark("a", "Remote wins", 1);
    remote.is_favorite = true;
    engine.apply_event(ChangeEvent {
        kind: ChangeKind::Update,
        record: remote,
    });

    let stored = engine.store().get("a").unwrap();
    assert_eq!(stored.title, "Remote wins");
    assert!(stored.is_favorite);
}

// === Notifications ===

#[test]
fn notifications_can_be_dismissed() {
    let backend = MemoryBackend::new();
    backend.fail_next(FailOp::FetchAll);
    let mut engine = engine_over(&backend);
    engine.load();

    let id = engine.notifications().active()[0].id;
    assert!(engine.dismiss_notification(id));
    assert!(engine.notifications().active().is_empty());
    assert!(!engine.dismiss_notification(id));
}
