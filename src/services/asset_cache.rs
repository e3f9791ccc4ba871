//! Offline Asset Cache for Smartmark.
//!
//! Intercepts static-asset fetches with a network-first, cache-fallback
//! policy under a single named cache generation. Bumping `CACHE_GENERATION`
//! is the sole mechanism for invalidating previously cached assets. The
//! cache's lifecycle is independent of the sync core: it never touches the
//! record store, only the transport layer.

use std::collections::HashMap;

use url::Url;

use crate::types::errors::{CacheError, RemoteError};

/// The single active cache generation name.
pub const CACHE_GENERATION: &str = "smart-bookmark-v2";

/// File extensions treated as static assets.
const STATIC_EXTENSIONS: &[&str] = &[
    "js", "css", "png", "jpg", "jpeg", "svg", "gif", "webp", "woff", "woff2", "ttf", "ico",
];

/// Build-output path prefix also treated as static.
const STATIC_PATH_PREFIX: &str = "/_next/static";

/// An intercepted request, keyed by method and full URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRequest {
    pub method: String,
    pub url: String,
}

impl AssetRequest {
    pub fn get(url: &str) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.to_string(),
        }
    }
}

/// A response as stored in and served from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Trait defining the named-cache storage the hosting environment provides:
/// put/match/delete/list-keys over request-keyed entries.
pub trait CacheStorageTrait {
    fn put(&mut self, cache: &str, key: &str, response: AssetResponse) -> Result<(), CacheError>;
    fn lookup(&self, cache: &str, key: &str) -> Option<AssetResponse>;
    /// Deletes a whole named cache. Returns true if it existed.
    fn delete_cache(&mut self, name: &str) -> bool;
    fn cache_names(&self) -> Vec<String>;
}

/// In-memory cache storage.
pub struct MemoryCacheStorage {
    caches: HashMap<String, HashMap<String, AssetResponse>>,
    fail_puts: bool,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self {
            caches: HashMap::new(),
            fail_puts: false,
        }
    }

    /// Makes every subsequent `put` fail, for exercising the
    /// fire-and-forget store path.
    pub fn fail_puts(&mut self, fail: bool) {
        self.fail_puts = fail;
    }
}

impl Default for MemoryCacheStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStorageTrait for MemoryCacheStorage {
    fn put(&mut self, cache: &str, key: &str, response: AssetResponse) -> Result<(), CacheError> {
        if self.fail_puts {
            return Err(CacheError::Storage("storage quota exceeded".to_string()));
        }
        self.caches
            .entry(cache.to_string())
            .or_default()
            .insert(key.to_string(), response);
        Ok(())
    }

    fn lookup(&self, cache: &str, key: &str) -> Option<AssetResponse> {
        self.caches.get(cache).and_then(|c| c.get(key)).cloned()
    }

    fn delete_cache(&mut self, name: &str) -> bool {
        self.caches.remove(name).is_some()
    }

    fn cache_names(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }
}

/// Trait defining the network fetch the cache falls back from.
pub trait FetchBackendTrait {
    fn fetch(&mut self, request: &AssetRequest) -> Result<AssetResponse, RemoteError>;
}

/// Outcome of handling an intercepted request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Not intercepted; the environment performs the request untouched.
    PassThrough,
    /// Served from the network (and stored if it was a cacheable asset).
    Network(AssetResponse),
    /// Network failed; served from the current cache generation.
    Cached(AssetResponse),
}

/// The interception worker.
pub struct AssetCache<S: CacheStorageTrait> {
    storage: S,
    backend_origin: Option<String>,
    installed: bool,
    controlling: bool,
}

impl<S: CacheStorageTrait> AssetCache<S> {
    /// Creates the cache. `backend_origin` is the auth/data service origin
    /// whose requests are never intercepted.
    pub fn new(storage: S, backend_origin: Option<&str>) -> Self {
        Self {
            storage,
            backend_origin: backend_origin.map(|o| o.trim_end_matches('/').to_string()),
            installed: false,
            controlling: false,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Install step: no entries are pre-populated, and activation is not
    /// deferred behind older worker generations.
    pub fn install(&mut self) {
        self.installed = true;
    }

    /// Activation step: purges every cache generation except the current one
    /// and takes control of already-open pages. Returns the purged names.
    pub fn activate(&mut self) -> Vec<String> {
        let purged: Vec<String> = self
            .storage
            .cache_names()
            .into_iter()
            .filter(|name| name != CACHE_GENERATION)
            .collect();
        for name in &purged {
            self.storage.delete_cache(name);
        }
        self.controlling = true;
        purged
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn is_controlling(&self) -> bool {
        self.controlling
    }

    /// Handles one intercepted request.
    ///
    /// Non-GET requests, browser-extension URLs, and backend-service URLs
    /// pass through. Everything else goes network-first; a 200 response on a
    /// static-asset path is stored fire-and-forget, and a network failure
    /// falls back to the cached response for that exact request.
    pub fn handle(
        &mut self,
        network: &mut dyn FetchBackendTrait,
        request: &AssetRequest,
    ) -> Result<FetchOutcome, CacheError> {
        if !self.should_intercept(request) {
            return Ok(FetchOutcome::PassThrough);
        }

        match network.fetch(request) {
            Ok(response) => {
                if response.status == 200 && is_static_asset(&request.url) {
                    // A storage failure must never fail the response.
                    if let Err(err) =
                        self.storage
                            .put(CACHE_GENERATION, &request.url, response.clone())
                    {
                        log::warn!("asset cache store failed for {}: {}", request.url, err);
                    }
                }
                Ok(FetchOutcome::Network(response))
            }
            Err(err) => match self.storage.lookup(CACHE_GENERATION, &request.url) {
                Some(cached) => {
                    log::debug!("serving {} from cache after {}", request.url, err);
                    Ok(FetchOutcome::Cached(cached))
                }
                None => Err(CacheError::MissingEntry(format!(
                    "{} ({})",
                    request.url, err
                ))),
            },
        }
    }

    fn should_intercept(&self, request: &AssetRequest) -> bool {
        if !request.method.eq_ignore_ascii_case("GET") {
            return false;
        }
        let parsed = match Url::parse(&request.url) {
            Ok(parsed) => parsed,
            // Unparseable URLs are left to the environment.
            Err(_) => return false,
        };
        // chrome-extension://, moz-extension:// and friends.
        if parsed.scheme().ends_with("extension") {
            return false;
        }
        if let Some(origin) = &self.backend_origin {
            if request.url.starts_with(origin.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Whether a URL's path names a static asset worth caching: a known file
/// extension or the build-output prefix.
pub fn is_static_asset(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let path = parsed.path();
    if path.starts_with(STATIC_PATH_PREFIX) {
        return true;
    }
    let file = path.rsplit('/').next().unwrap_or("");
    match file.rsplit_once('.') {
        Some((_, ext)) => STATIC_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known)),
        None => false,
    }
}
