//! HTTP client for a Supabase project.
//!
//! Tables are reached through PostgREST (`/rest/v1/{table}`) and sessions
//! through GoTrue (`/auth/v1/...`), both using [`reqwest`]. The client keeps
//! the current session on a `watch` channel and sends its access token on
//! every table request so row-level security sees the signed-in user. An
//! expired token is refreshed before use; if the refresh fails the session
//! is dropped and subscribers see the sign-out.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dorama_core::actor::Actor;
use dorama_core::drama::Drama;
use dorama_core::review::{NewReview, Review};
use dorama_core::session::{AuthUser, Session};
use dorama_core::types::{DbId, UserId};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::watch;

use crate::error::StoreError;
use crate::local::{LocalStorage, SESSION_KEY};
use crate::models::{LibraryEntry, LibraryPatch};
use crate::remote::{AuthProvider, Credentials, RemoteStore, SignUpOutcome};

/// Project URL and public (anon) key.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Base URL, e.g. `https://abc.supabase.co` (no trailing slash needed).
    pub url: String,
    pub anon_key: String,
}

/// [`RemoteStore`] + [`AuthProvider`] backed by a Supabase project.
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: watch::Sender<Option<Session>>,
    storage: Option<Arc<dyn LocalStorage>>,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling).
    pub fn with_client(client: reqwest::Client, config: SupabaseConfig) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key,
            session,
            storage: None,
        }
    }

    /// Persist the session in `storage` and pick up one saved by an earlier
    /// run. A corrupt saved session is discarded.
    pub fn with_storage(mut self, storage: Arc<dyn LocalStorage>) -> Self {
        let saved = storage.get_item(SESSION_KEY).and_then(|raw| {
            serde_json::from_str::<Session>(&raw)
                .inspect_err(|e| tracing::warn!(error = %e, "Discarding corrupt saved session"))
                .ok()
        });
        if let Some(session) = saved {
            tracing::info!(user_id = %session.user.id, "Restored saved session");
            self.session.send_replace(Some(session));
        }
        self.storage = Some(storage);
        self
    }

    // ---- URL helpers ----

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    // ---- session bookkeeping ----

    fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    /// Replace the session, persist it, and notify subscribers.
    fn set_session(&self, session: Option<Session>) {
        if let Some(storage) = &self.storage {
            let saved = match &session {
                Some(session) => serde_json::to_string(session)
                    .map_err(StoreError::from)
                    .and_then(|raw| storage.set_item(SESSION_KEY, &raw)),
                None => storage.remove_item(SESSION_KEY),
            };
            if let Err(e) = saved {
                tracing::warn!(error = %e, "Failed to persist session");
            }
        }
        self.session.send_replace(session);
    }

    /// The current session with a usable access token.
    ///
    /// An expired session is refreshed; when that is impossible or fails the
    /// session is dropped.
    async fn active_session(&self) -> Option<Session> {
        let session = self.current_session()?;
        if !session.is_expired(Utc::now().timestamp()) {
            return Some(session);
        }
        match self.refresh(&session).await {
            Ok(refreshed) => Some(refreshed),
            Err(e) => {
                tracing::warn!(user_id = %session.user.id, error = %e, "Session expired");
                self.set_session(None);
                None
            }
        }
    }

    /// Exchange the refresh token for a new session.
    async fn refresh(&self, session: &Session) -> Result<Session, StoreError> {
        let refresh_token = session
            .refresh_token
            .as_deref()
            .ok_or_else(|| StoreError::Auth("Session expired".to_string()))?;
        let response = self
            .client
            .post(self.auth_url("token"))
            .headers(self.headers_for(None))
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let response = Self::ensure_auth_success(response).await?;
        let refreshed: Session = response.json().await?;
        self.set_session(Some(refreshed.clone()));
        tracing::debug!(user_id = %refreshed.user.id, "Session refreshed");
        Ok(refreshed)
    }

    /// `apikey` plus a bearer token: the session's if given, else the anon
    /// key.
    fn headers_for(&self, session: Option<&Session>) -> HeaderMap {
        let token = session.map_or(self.anon_key.as_str(), |s| s.access_token.as_str());

        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.anon_key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    /// Headers for a table request, refreshing the session first if needed.
    async fn headers(&self) -> HeaderMap {
        let session = self.active_session().await;
        self.headers_for(session.as_ref())
    }

    // ---- request helpers ----

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let response = self
            .client
            .get(self.rest_url(table))
            .headers(self.headers().await)
            .query(query)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    /// Ensure the response has a success status code, or turn it into
    /// [`StoreError::Api`] carrying the body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Like [`Self::ensure_success`] but maps client errors from GoTrue to
    /// [`StoreError::Auth`] with the provider's message.
    async fn ensure_auth_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StoreError> {
        match Self::ensure_success(response).await {
            Err(StoreError::Api { status, body }) if (400..500).contains(&status) => {
                Err(StoreError::Auth(auth_error_message(&body)))
            }
            other => other,
        }
    }
}

/// Pull a human-readable message out of a GoTrue error body.
fn auth_error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// Interpret a GoTrue token or sign-up response.
///
/// A body with `access_token` is a session. Otherwise the body is the user
/// (either nested under `user` or at the top level) awaiting confirmation.
fn parse_auth_response(body: Value) -> Result<SignUpOutcome, StoreError> {
    if body.get("access_token").is_some() {
        let session: Session = serde_json::from_value(body)?;
        return Ok(SignUpOutcome::SignedIn(session));
    }
    let user_value = body.get("user").cloned().unwrap_or(body);
    let user: AuthUser = serde_json::from_value(user_value)?;
    Ok(SignUpOutcome::ConfirmationPending { user })
}

#[async_trait]
impl RemoteStore for SupabaseClient {
    async fn list_dramas(&self) -> Result<Vec<Drama>, StoreError> {
        self.select(
            "dramas",
            &[("select", "*".into()), ("order", "title.asc".into())],
        )
        .await
    }

    async fn list_actors(&self) -> Result<Vec<Actor>, StoreError> {
        self.select("atores", &[("select", "*".into()), ("order", "id.asc".into())])
            .await
    }

    async fn delete_actor(&self, id: DbId) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.rest_url("atores"))
            .headers(self.headers().await)
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn list_library(&self, user_id: UserId) -> Result<Vec<LibraryEntry>, StoreError> {
        self.select(
            "user_library",
            &[
                ("select", "drama_id,status,is_favorite".into()),
                ("user_id", format!("eq.{user_id}")),
            ],
        )
        .await
    }

    async fn upsert_library(&self, patch: &LibraryPatch) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.rest_url("user_library"))
            .headers(self.headers().await)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .query(&[("on_conflict", "user_id,drama_id")])
            .json(&[patch])
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn insert_review(&self, review: &NewReview) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.rest_url("reviews"))
            .headers(self.headers().await)
            .header("Prefer", "return=minimal")
            .json(review)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn list_reviews(&self, drama_id: DbId) -> Result<Vec<Review>, StoreError> {
        self.select(
            "reviews",
            &[
                ("select", "*".into()),
                ("drama_id", format!("eq.{drama_id}")),
                ("order", "created_at.desc".into()),
            ],
        )
        .await
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn get_session(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.active_session().await)
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, StoreError> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .headers(self.headers_for(None))
            .query(&[("grant_type", "password")])
            .json(credentials)
            .send()
            .await?;
        let response = Self::ensure_auth_success(response).await?;
        let session: Session = response.json().await?;
        self.set_session(Some(session.clone()));
        tracing::info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, StoreError> {
        let response = self
            .client
            .post(self.auth_url("signup"))
            .headers(self.headers_for(None))
            .json(credentials)
            .send()
            .await?;
        let response = Self::ensure_auth_success(response).await?;
        let outcome = parse_auth_response(response.json::<Value>().await?)?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            self.set_session(Some(session.clone()));
        }
        Ok(outcome)
    }

    async fn sign_out(&self) -> Result<(), StoreError> {
        let Some(session) = self.current_session() else {
            return Ok(());
        };
        let response = self
            .client
            .post(self.auth_url("logout"))
            .headers(self.headers_for(Some(&session)))
            .send()
            .await;
        // The local session is dropped even if the revoke call fails.
        self.set_session(None);
        Self::ensure_success(response?).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use uuid::Uuid;

    use super::*;
    use crate::local::MemoryStorage;

    fn client() -> SupabaseClient {
        SupabaseClient::new(SupabaseConfig {
            url: "https://demo.supabase.co/".into(),
            anon_key: "anon-key".into(),
        })
    }

    #[test]
    fn urls_strip_trailing_slash() {
        let c = client();
        assert_eq!(c.rest_url("dramas"), "https://demo.supabase.co/rest/v1/dramas");
        assert_eq!(c.auth_url("token"), "https://demo.supabase.co/auth/v1/token");
    }

    fn session(expires_at: Option<i64>, refresh_token: Option<&str>) -> Session {
        Session {
            access_token: "user-token".into(),
            refresh_token: refresh_token.map(str::to_string),
            expires_at,
            user: AuthUser {
                id: Uuid::new_v4(),
                email: None,
            },
        }
    }

    #[tokio::test]
    async fn bearer_is_anon_key_until_signed_in() {
        let c = client();
        assert_eq!(c.headers().await[AUTHORIZATION], "Bearer anon-key");

        c.set_session(Some(session(None, None)));
        let headers = c.headers().await;
        assert_eq!(headers[AUTHORIZATION], "Bearer user-token");
        assert_eq!(headers["apikey"], "anon-key");
    }

    #[test]
    fn session_is_saved_and_restored() {
        let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        let saved = session(None, Some("ref"));

        client()
            .with_storage(Arc::clone(&storage))
            .set_session(Some(saved.clone()));

        let restored = client().with_storage(Arc::clone(&storage));
        assert_eq!(restored.current_session(), Some(saved));

        restored.set_session(None);
        assert_eq!(storage.get_item(SESSION_KEY), None);
    }

    #[test]
    fn corrupt_saved_session_is_ignored() {
        let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        storage.set_item(SESSION_KEY, "{not json").unwrap();
        assert_eq!(client().with_storage(storage).current_session(), None);
    }

    #[tokio::test]
    async fn expired_session_without_refresh_token_signs_out() {
        let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        let c = client().with_storage(Arc::clone(&storage));
        c.set_session(Some(session(Some(0), None)));
        let mut sessions = c.subscribe();

        assert_eq!(c.get_session().await.unwrap(), None);
        assert!(sessions.has_changed().unwrap());
        assert!(sessions.borrow_and_update().is_none());
        assert_eq!(storage.get_item(SESSION_KEY), None);
        assert_eq!(c.headers().await[AUTHORIZATION], "Bearer anon-key");
    }

    #[test]
    fn token_response_parses_as_session() {
        let id = Uuid::new_v4();
        let body = json!({
            "access_token": "tok",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_700_000_000,
            "refresh_token": "ref",
            "user": {"id": id, "email": "a@b.c", "aud": "authenticated"}
        });
        assert_matches!(
            parse_auth_response(body).unwrap(),
            SignUpOutcome::SignedIn(session)
                if session.user.id == id && session.expires_at == Some(1_700_000_000)
        );
    }

    #[test]
    fn bare_user_response_is_confirmation_pending() {
        let id = Uuid::new_v4();
        let body = json!({
            "id": id,
            "email": "a@b.c",
            "confirmation_sent_at": "2024-01-01T00:00:00Z"
        });
        assert_matches!(
            parse_auth_response(body).unwrap(),
            SignUpOutcome::ConfirmationPending { user } if user.email.as_deref() == Some("a@b.c")
        );
    }

    #[test]
    fn auth_error_message_prefers_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(auth_error_message(body), "Invalid login credentials");
        assert_eq!(auth_error_message("plain text"), "plain text");
    }
}
