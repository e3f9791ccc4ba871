// Smartmark services
// Services front the external collaborators: the remote data service (trait
// plus in-memory and REST backends), the identity provider, and the offline
// asset cache.

pub mod asset_cache;
pub mod auth;
pub mod memory_backend;
pub mod remote_store;
pub mod rest_backend;
