//! Remote data store and auth provider interfaces.
//!
//! The hosted backend is treated as an opaque row store with per-table
//! select/insert/upsert/delete, plus a session-based auth provider. Both are
//! consumed through these traits so the library crate never depends on a
//! concrete backend.

use std::fmt;

use async_trait::async_trait;
use dorama_core::actor::Actor;
use dorama_core::drama::Drama;
use dorama_core::review::{NewReview, Review};
use dorama_core::session::{AuthUser, Session};
use dorama_core::types::{DbId, UserId};
use serde::Serialize;
use tokio::sync::watch;

use crate::error::StoreError;
use crate::models::{LibraryEntry, LibraryPatch};

/// Table access used by the catalog, the user library, and the admin tools.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All rows of `dramas`, ordered by title ascending.
    async fn list_dramas(&self) -> Result<Vec<Drama>, StoreError>;

    /// All rows of `atores`, ordered by id ascending.
    async fn list_actors(&self) -> Result<Vec<Actor>, StoreError>;

    /// Delete one `atores` row.
    async fn delete_actor(&self, id: DbId) -> Result<(), StoreError>;

    /// Every `user_library` row belonging to `user_id`.
    async fn list_library(&self, user_id: UserId) -> Result<Vec<LibraryEntry>, StoreError>;

    /// Insert-or-update on `(user_id, drama_id)`, touching only the columns
    /// present in the patch. Repeating the same patch is harmless.
    async fn upsert_library(&self, patch: &LibraryPatch) -> Result<(), StoreError>;

    /// Append one row to `reviews`.
    async fn insert_review(&self, review: &NewReview) -> Result<(), StoreError>;

    /// Reviews of one drama, newest first.
    async fn list_reviews(&self, drama_id: DbId) -> Result<Vec<Review>, StoreError>;
}

/// Email/password pair for sign-in and sign-up.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account is usable immediately and a session was issued.
    SignedIn(Session),
    /// The provider sent a confirmation email; no session yet.
    ConfirmationPending { user: AuthUser },
}

/// Session-based authentication.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The current session, if any. An expired session is refreshed first;
    /// if that fails the session is dropped and `None` returned.
    async fn get_session(&self) -> Result<Option<Session>, StoreError>;

    /// Every session change the provider makes: sign-in, sign-out, token
    /// refresh, expiry. The receiver starts at the current session, already
    /// marked as seen.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;

    async fn sign_in_with_password(&self, credentials: &Credentials)
        -> Result<Session, StoreError>;

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, StoreError>;

    async fn sign_out(&self) -> Result<(), StoreError>;
}
