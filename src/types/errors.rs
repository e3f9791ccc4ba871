use std::fmt;

// === ValidationError ===

/// Errors rejecting user input before any remote call is made.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The bookmark title is empty after trimming.
    EmptyTitle,
    /// The bookmark URL is empty after trimming.
    EmptyUrl,
    /// The bookmark URL does not parse as an absolute URL.
    InvalidUrl(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyTitle => write!(f, "Bookmark title cannot be empty"),
            ValidationError::EmptyUrl => write!(f, "Bookmark URL cannot be empty"),
            ValidationError::InvalidUrl(url) => write!(f, "Invalid bookmark URL: {}", url),
        }
    }
}

impl std::error::Error for ValidationError {}

// === RemoteError ===

/// Errors surfaced by the remote store.
///
/// Network failures and service-reported errors are folded into a single
/// transport kind; callers present one generic retry-prompting message.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteError {
    /// The remote operation failed (network or service error).
    Transport(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Transport(msg) => write!(f, "Remote operation failed: {}", msg),
        }
    }
}

impl std::error::Error for RemoteError {}

// === AuthError ===

/// Errors related to the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// No user is signed in.
    NotAuthenticated,
    /// The auth service could not be reached or rejected the request.
    Transport(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NotAuthenticated => write!(f, "Not signed in"),
            AuthError::Transport(msg) => write!(f, "Auth request failed: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

// === SessionError ===

/// Errors establishing a sync session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// A session requires an authenticated user.
    NotAuthenticated,
    /// The remote store rejected the session setup (fetch or subscribe).
    Remote(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotAuthenticated => write!(f, "Session requires a signed-in user"),
            SessionError::Remote(msg) => write!(f, "Session setup failed: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

// === CacheError ===

/// Errors related to the offline asset cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheError {
    /// The network failed and no cached response exists for the request.
    MissingEntry(String),
    /// The cache storage backend failed.
    Storage(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::MissingEntry(url) => {
                write!(f, "No cached response for: {}", url)
            }
            CacheError::Storage(msg) => write!(f, "Cache storage error: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {}
