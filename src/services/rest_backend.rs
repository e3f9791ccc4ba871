//! REST backend for the hosted bookmark service.
//!
//! Speaks the PostgREST-style row API (`/rest/v1/bookmarks` with `eq.`
//! filters and `Prefer: return=representation` on insert), the auth endpoint
//! (`/auth/v1`), and a line-delimited SSE change feed
//! (`/realtime/v1/bookmarks`). Every request carries the project API key and
//! the session's bearer token. All failures collapse into
//! `RemoteError::Transport`; the sync engine owns the recovery policy.

use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde_json::json;
use url::Url;

use crate::services::auth::AuthProviderTrait;
use crate::services::remote_store::{ChangeFeed, RemoteStoreTrait};
use crate::types::bookmark::{Bookmark, BookmarkDraft, BookmarkPatch};
use crate::types::errors::{AuthError, RemoteError};
use crate::types::event::ChangeEvent;
use crate::types::user::User;

/// Connection settings for the hosted service.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Service base URL, without a trailing slash.
    pub base_url: String,
    /// Project API key, sent on every request.
    pub api_key: String,
    /// The signed-in session's access token.
    pub access_token: String,
}

/// Remote store and auth provider over the hosted REST service.
pub struct RestBackend {
    http: Client,
    config: RestConfig,
}

impl RestBackend {
    pub fn new(config: RestConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn rows_url(&self) -> String {
        format!("{}/rest/v1/bookmarks", self.config.base_url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.access_token)
    }

    fn transport(err: impl std::fmt::Display) -> RemoteError {
        RemoteError::Transport(err.to_string())
    }
}

impl RemoteStoreTrait for RestBackend {
    fn fetch_all(&self, user_id: &str) -> Result<Vec<Bookmark>, RemoteError> {
        let response = self
            .authed(self.http.get(self.rows_url()))
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .map_err(Self::transport)?
            .error_for_status()
            .map_err(Self::transport)?;
        response.json::<Vec<Bookmark>>().map_err(Self::transport)
    }

    fn create(&self, user_id: &str, draft: &BookmarkDraft) -> Result<Bookmark, RemoteError> {
        let response = self
            .authed(self.http.post(self.rows_url()))
            .header("Prefer", "return=representation")
            .json(&json!({
                "user_id": user_id,
                "title": draft.title(),
                "url": draft.url(),
            }))
            .send()
            .map_err(Self::transport)?
            .error_for_status()
            .map_err(Self::transport)?;
        // The row API answers inserts with an array of the stored rows.
        let mut rows = response.json::<Vec<Bookmark>>().map_err(Self::transport)?;
        if rows.is_empty() {
            return Err(RemoteError::Transport(
                "insert returned no row".to_string(),
            ));
        }
        Ok(rows.remove(0))
    }

    fn update(&self, id: &str, patch: &BookmarkPatch) -> Result<(), RemoteError> {
        self.authed(self.http.patch(self.rows_url()))
            .query(&[("id", format!("eq.{}", id))])
            .json(patch)
            .send()
            .map_err(Self::transport)?
            .error_for_status()
            .map_err(Self::transport)?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), RemoteError> {
        self.authed(self.http.delete(self.rows_url()))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .map_err(Self::transport)?
            .error_for_status()
            .map_err(Self::transport)?;
        Ok(())
    }

    fn delete_all_for_user(&self, user_id: &str) -> Result<(), RemoteError> {
        self.authed(self.http.delete(self.rows_url()))
            .query(&[("user_id", format!("eq.{}", user_id))])
            .send()
            .map_err(Self::transport)?
            .error_for_status()
            .map_err(Self::transport)?;
        Ok(())
    }

    fn subscribe(&self, user_id: &str) -> Result<ChangeFeed, RemoteError> {
        let response = self
            .authed(
                self.http
                    .get(format!("{}/realtime/v1/bookmarks", self.config.base_url)),
            )
            .query(&[("user_id", format!("eq.{}", user_id))])
            .header("Accept", "text/event-stream")
            .send()
            .map_err(Self::transport)?
            .error_for_status()
            .map_err(Self::transport)?;

        let (sender, receiver) = mpsc::channel();
        let stopped = Arc::new(AtomicBool::new(false));
        let reader_stop = Arc::clone(&stopped);

        // The reader only forwards events into the feed channel; the session's
        // event pump applies them, keeping the store single-writer. After
        // unsubscribe the thread exits on the next delivered line or when the
        // stream closes.
        thread::spawn(move || {
            let reader = BufReader::new(response);
            for line in reader.lines() {
                if reader_stop.load(Ordering::Relaxed) {
                    break;
                }
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        log::warn!("change-feed stream error: {}", err);
                        break;
                    }
                };
                let Some(payload) = line.strip_prefix("data:") else {
                    continue;
                };
                match serde_json::from_str::<ChangeEvent>(payload.trim()) {
                    Ok(event) => {
                        if sender.send(event).is_err() {
                            break;
                        }
                    }
                    Err(err) => log::warn!("unparseable change-feed event: {}", err),
                }
            }
        });

        let canceller = Box::new(move || {
            stopped.store(true, Ordering::Relaxed);
        });
        Ok(ChangeFeed::new(receiver, canceller))
    }
}

impl AuthProviderTrait for RestBackend {
    fn current_user(&self) -> Result<Option<User>, AuthError> {
        let response = self
            .authed(
                self.http
                    .get(format!("{}/auth/v1/user", self.config.base_url)),
            )
            .send()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        let user = response
            .json::<User>()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(Some(user))
    }

    fn sign_in_url(&self, provider: &str, redirect_to: &str) -> Result<String, AuthError> {
        let mut url = Url::parse(&format!("{}/auth/v1/authorize", self.config.base_url))
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", redirect_to);
        Ok(url.into())
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        self.authed(
            self.http
                .post(format!("{}/auth/v1/logout", self.config.base_url)),
        )
        .send()
        .map_err(|e| AuthError::Transport(e.to_string()))?
        .error_for_status()
        .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(())
    }
}
