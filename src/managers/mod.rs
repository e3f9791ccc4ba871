// Smartmark state managers
// Managers own session state: the bookmark record store, the notification
// queue, and the sync engine that reconciles local and remote mutations.

pub mod bookmark_store;
pub mod notification_center;
pub mod sync_engine;
