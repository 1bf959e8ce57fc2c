//! In-process backend implementing both [`RemoteStore`] and [`AuthProvider`].
//!
//! Mirrors the behaviour the catalog relies on from the hosted backend:
//! title-ordered drama listing, `(user_id, drama_id)` upserts that only
//! touch the columns sent, append-only reviews, and writes restricted to
//! the signed-in user. Tests can inject failures per operation and hold
//! writes in flight to observe optimistic state.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use dorama_core::actor::Actor;
use dorama_core::drama::Drama;
use dorama_core::review::{sort_newest_first, NewReview, Review};
use dorama_core::session::{AuthUser, Session};
use dorama_core::types::{DbId, UserId};
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{LibraryEntry, LibraryPatch};
use crate::remote::{AuthProvider, Credentials, RemoteStore, SignUpOutcome};

/// Operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    ListDramas,
    ListActors,
    DeleteActor,
    ListLibrary,
    UpsertLibrary,
    InsertReview,
    ListReviews,
}

#[derive(Default)]
struct Tables {
    dramas: Vec<Drama>,
    actors: Vec<Actor>,
    library: HashMap<(UserId, DbId), LibraryEntry>,
    reviews: Vec<Review>,
    next_review_id: DbId,
    upserts: usize,
}

struct Account {
    password: String,
    user: AuthUser,
    confirmed: bool,
}

#[derive(Default)]
struct AuthState {
    accounts: HashMap<String, Account>,
    require_confirmation: bool,
}

/// In-memory stand-in for the hosted backend.
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    auth: Mutex<AuthState>,
    failures: Mutex<HashSet<FailPoint>>,
    writes_paused: watch::Sender<bool>,
    session: watch::Sender<Option<Session>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock a mutex, recovering the data if a panicking test poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn forbidden() -> StoreError {
    StoreError::Api {
        status: 403,
        body: "new row violates row-level security policy".to_string(),
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (writes_paused, _) = watch::channel(false);
        let (session, _) = watch::channel(None);
        Self {
            tables: Mutex::new(Tables {
                next_review_id: 1,
                ..Tables::default()
            }),
            auth: Mutex::new(AuthState::default()),
            failures: Mutex::new(HashSet::new()),
            writes_paused,
            session,
        }
    }

    /// Seed the `dramas` table.
    pub fn with_dramas(self, dramas: Vec<Drama>) -> Self {
        lock(&self.tables).dramas = dramas;
        self
    }

    /// Seed the `atores` table.
    pub fn with_actors(self, actors: Vec<Actor>) -> Self {
        lock(&self.tables).actors = actors;
        self
    }

    /// Require email confirmation on sign-up (no session is issued).
    pub fn require_confirmation(&self, required: bool) {
        lock(&self.auth).require_confirmation = required;
    }

    /// Register a confirmed account and return its user.
    pub fn add_account(&self, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        lock(&self.auth).accounts.insert(
            email.to_lowercase(),
            Account {
                password: password.to_string(),
                user: user.clone(),
                confirmed: true,
            },
        );
        user
    }

    /// Make `point` fail with a 503 until [`Self::heal`] is called.
    pub fn fail(&self, point: FailPoint) {
        lock(&self.failures).insert(point);
    }

    pub fn heal(&self, point: FailPoint) {
        lock(&self.failures).remove(&point);
    }

    /// Hold every library/review write until [`Self::resume_writes`].
    pub fn pause_writes(&self) {
        self.writes_paused.send_replace(true);
    }

    pub fn resume_writes(&self) {
        self.writes_paused.send_replace(false);
    }

    /// End the current session the way the provider does when a token
    /// runs out, notifying subscribers.
    pub fn expire_session(&self) {
        self.session.send_replace(None);
    }

    /// Stored library row, for assertions.
    pub fn library_row(&self, user_id: UserId, drama_id: DbId) -> Option<LibraryEntry> {
        lock(&self.tables).library.get(&(user_id, drama_id)).cloned()
    }

    /// Number of upserts that reached the store.
    pub fn upsert_count(&self) -> usize {
        lock(&self.tables).upserts
    }

    /// Insert a library row directly, bypassing session checks.
    pub fn seed_library(&self, user_id: UserId, entry: LibraryEntry) {
        lock(&self.tables)
            .library
            .insert((user_id, entry.drama_id), entry);
    }

    fn check(&self, point: FailPoint) -> Result<(), StoreError> {
        if lock(&self.failures).contains(&point) {
            return Err(StoreError::Api {
                status: 503,
                body: format!("injected failure: {point:?}"),
            });
        }
        Ok(())
    }

    async fn wait_for_writes(&self) {
        let mut rx = self.writes_paused.subscribe();
        // The sender lives as long as `self`, so this only errors on drop.
        let _ = rx.wait_for(|paused| !*paused).await;
    }

    fn session_user(&self) -> Option<UserId> {
        self.session.borrow().as_ref().map(|s| s.user.id)
    }

    fn issue_session(&self, user: &AuthUser) -> Session {
        let session = Session {
            access_token: format!("mem-{}", Uuid::new_v4()),
            refresh_token: None,
            expires_at: None,
            user: user.clone(),
        };
        self.session.send_replace(Some(session.clone()));
        session
    }
}

#[async_trait]
impl RemoteStore for MemoryBackend {
    async fn list_dramas(&self) -> Result<Vec<Drama>, StoreError> {
        self.check(FailPoint::ListDramas)?;
        let mut dramas = lock(&self.tables).dramas.clone();
        dramas.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(dramas)
    }

    async fn list_actors(&self) -> Result<Vec<Actor>, StoreError> {
        self.check(FailPoint::ListActors)?;
        let mut actors = lock(&self.tables).actors.clone();
        actors.sort_by_key(|a| a.id);
        Ok(actors)
    }

    async fn delete_actor(&self, id: DbId) -> Result<(), StoreError> {
        self.check(FailPoint::DeleteActor)?;
        lock(&self.tables).actors.retain(|a| a.id != id);
        Ok(())
    }

    async fn list_library(&self, user_id: UserId) -> Result<Vec<LibraryEntry>, StoreError> {
        self.check(FailPoint::ListLibrary)?;
        if self.session_user() != Some(user_id) {
            return Ok(Vec::new());
        }
        let tables = lock(&self.tables);
        Ok(tables
            .library
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    async fn upsert_library(&self, patch: &LibraryPatch) -> Result<(), StoreError> {
        self.wait_for_writes().await;
        self.check(FailPoint::UpsertLibrary)?;
        if self.session_user() != Some(patch.user_id) {
            return Err(forbidden());
        }

        let mut tables = lock(&self.tables);
        tables.upserts += 1;
        let row = tables
            .library
            .entry((patch.user_id, patch.drama_id))
            .or_insert_with(|| LibraryEntry {
                drama_id: patch.drama_id,
                status: None,
                is_favorite: false,
            });
        if let Some(status) = patch.status {
            row.status = status;
        }
        if let Some(is_favorite) = patch.is_favorite {
            row.is_favorite = is_favorite;
        }
        Ok(())
    }

    async fn insert_review(&self, review: &NewReview) -> Result<(), StoreError> {
        self.wait_for_writes().await;
        self.check(FailPoint::InsertReview)?;
        if self.session_user() != Some(review.user_id) {
            return Err(forbidden());
        }

        let mut tables = lock(&self.tables);
        let id = tables.next_review_id;
        tables.next_review_id += 1;
        tables.reviews.push(Review {
            id,
            drama_id: review.drama_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_reviews(&self, drama_id: DbId) -> Result<Vec<Review>, StoreError> {
        self.check(FailPoint::ListReviews)?;
        let mut reviews: Vec<Review> = lock(&self.tables)
            .reviews
            .iter()
            .filter(|r| r.drama_id == drama_id)
            .cloned()
            .collect();
        sort_newest_first(&mut reviews);
        Ok(reviews)
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn get_session(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.session.borrow().clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, StoreError> {
        let user = {
            let auth = lock(&self.auth);
            let account = auth
                .accounts
                .get(&credentials.email.to_lowercase())
                .filter(|a| a.password == credentials.password)
                .ok_or_else(|| StoreError::Auth("Invalid login credentials".to_string()))?;
            if !account.confirmed {
                return Err(StoreError::Auth("Email not confirmed".to_string()));
            }
            account.user.clone()
        };
        Ok(self.issue_session(&user))
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, StoreError> {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(credentials.email.clone()),
        };
        let confirmed = {
            let mut auth = lock(&self.auth);
            let key = credentials.email.to_lowercase();
            if auth.accounts.contains_key(&key) {
                return Err(StoreError::Auth("User already registered".to_string()));
            }
            let confirmed = !auth.require_confirmation;
            auth.accounts.insert(
                key,
                Account {
                    password: credentials.password.clone(),
                    user: user.clone(),
                    confirmed,
                },
            );
            confirmed
        };

        if confirmed {
            Ok(SignUpOutcome::SignedIn(self.issue_session(&user)))
        } else {
            Ok(SignUpOutcome::ConfirmationPending { user })
        }
    }

    async fn sign_out(&self) -> Result<(), StoreError> {
        self.session.send_replace(None);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use dorama_core::status::WatchStatus;

    use super::*;

    async fn signed_in() -> (MemoryBackend, AuthUser) {
        let backend = MemoryBackend::new();
        let user = backend.add_account("ana@example.com", "secret");
        backend
            .sign_in_with_password(&Credentials::new("ana@example.com", "secret"))
            .await
            .expect("sign in");
        (backend, user)
    }

    #[tokio::test]
    async fn dramas_are_listed_by_title() {
        let backend = MemoryBackend::new().with_dramas(vec![
            Drama::new(1, "Vincenzo", &[]),
            Drama::new(2, "Goblin", &[]),
        ]);
        let titles: Vec<String> = backend
            .list_dramas()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.title)
            .collect();
        assert_eq!(titles, vec!["Goblin", "Vincenzo"]);
    }

    #[tokio::test]
    async fn upsert_touches_only_sent_columns() {
        let (backend, user) = signed_in().await;
        backend
            .upsert_library(&LibraryPatch::favorite(user.id, 9, true))
            .await
            .unwrap();
        backend
            .upsert_library(&LibraryPatch::status(user.id, 9, Some(WatchStatus::Watching)))
            .await
            .unwrap();

        let row = backend.library_row(user.id, 9).unwrap();
        assert!(row.is_favorite);
        assert_eq!(row.status, Some(WatchStatus::Watching));
    }

    #[tokio::test]
    async fn repeated_upsert_is_idempotent() {
        let (backend, user) = signed_in().await;
        let patch = LibraryPatch::status(user.id, 1, Some(WatchStatus::Watched));
        backend.upsert_library(&patch).await.unwrap();
        backend.upsert_library(&patch).await.unwrap();

        assert_eq!(backend.list_library(user.id).await.unwrap().len(), 1);
        assert_eq!(backend.upsert_count(), 2);
    }

    #[tokio::test]
    async fn writes_for_another_user_are_forbidden() {
        let (backend, _) = signed_in().await;
        let result = backend
            .upsert_library(&LibraryPatch::favorite(Uuid::new_v4(), 1, true))
            .await;
        assert_matches!(result, Err(StoreError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn injected_failure_surfaces_and_heals() {
        let backend = MemoryBackend::new();
        backend.fail(FailPoint::ListDramas);
        assert_matches!(backend.list_dramas().await, Err(StoreError::Api { status: 503, .. }));
        backend.heal(FailPoint::ListDramas);
        assert!(backend.list_dramas().await.is_ok());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let backend = MemoryBackend::new();
        backend.add_account("ana@example.com", "secret");
        let result = backend
            .sign_in_with_password(&Credentials::new("ana@example.com", "nope"))
            .await;
        assert_matches!(result, Err(StoreError::Auth(_)));
        assert!(backend.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sign_up_with_confirmation_issues_no_session() {
        let backend = MemoryBackend::new();
        backend.require_confirmation(true);
        let outcome = backend
            .sign_up(&Credentials::new("new@example.com", "pw"))
            .await
            .unwrap();
        assert_matches!(outcome, SignUpOutcome::ConfirmationPending { .. });
        assert!(backend.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn subscribers_see_sign_in_and_expiry() {
        let backend = MemoryBackend::new();
        let user = backend.add_account("ana@example.com", "secret");
        let mut sessions = backend.subscribe();
        assert!(!sessions.has_changed().unwrap());

        backend
            .sign_in_with_password(&Credentials::new("ana@example.com", "secret"))
            .await
            .unwrap();
        assert!(sessions.has_changed().unwrap());
        let signed_in = sessions.borrow_and_update().clone();
        assert_eq!(signed_in.map(|s| s.user), Some(user));

        backend.expire_session();
        assert!(sessions.has_changed().unwrap());
        assert!(sessions.borrow_and_update().is_none());
        assert!(backend.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reviews_come_back_newest_first() {
        let (backend, user) = signed_in().await;
        for rating in [3, 5] {
            backend
                .insert_review(&NewReview {
                    drama_id: 4,
                    user_id: user.id,
                    rating,
                    comment: None,
                })
                .await
                .unwrap();
        }
        let reviews = backend.list_reviews(4).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].rating, 5);
    }
}
