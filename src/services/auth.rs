//! Auth provider contract for Smartmark.
//!
//! The identity provider is an external collaborator; the browser-side OAuth
//! redirect dance stays outside this crate. Sessions only need to know who
//! is signed in, how to build the provider redirect URL, and how to sign
//! out.

use std::sync::Mutex;

use crate::types::errors::AuthError;
use crate::types::user::User;

/// Trait defining the identity provider surface a session consumes.
pub trait AuthProviderTrait: Send + Sync {
    /// The currently signed-in user, if any.
    fn current_user(&self) -> Result<Option<User>, AuthError>;
    /// Builds the OAuth authorize URL the page shell redirects to.
    fn sign_in_url(&self, provider: &str, redirect_to: &str) -> Result<String, AuthError>;
    fn sign_out(&self) -> Result<(), AuthError>;
}

/// Fixed-identity provider for tests and local development.
pub struct StaticAuth {
    user: Mutex<Option<User>>,
}

impl StaticAuth {
    pub fn signed_in(user: User) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            user: Mutex::new(None),
        }
    }
}

impl AuthProviderTrait for StaticAuth {
    fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(self.user.lock().unwrap().clone())
    }

    fn sign_in_url(&self, provider: &str, redirect_to: &str) -> Result<String, AuthError> {
        Ok(format!(
            "static://authorize?provider={}&redirect_to={}",
            provider, redirect_to
        ))
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        *self.user.lock().unwrap() = None;
        Ok(())
    }
}
