//! Smartmark — personal bookmark manager sync core.
//!
//! Client-side state for a bookmark web app: an in-memory record store, a
//! remote-store client with a realtime change feed, the reconciliation layer
//! that merges optimistic mutations with feed events, a pure derived view,
//! and an offline static-asset cache.

pub mod managers;
pub mod services;
pub mod session;
pub mod types;
pub mod view;
