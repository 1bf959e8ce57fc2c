//! Auth bridge: wraps the auth provider and broadcasts every transition.
//!
//! The bridge is the only publisher of [`AppEvent::AuthStateChanged`]. It
//! keeps the user currently in effect so views can ask "who is signed in"
//! without a round trip. Transitions arrive both from calls made through
//! the bridge and from the provider's own session channel (see
//! [`SessionWatcher`]); a change to the same user is published once.

use std::sync::{Arc, RwLock};

use dorama_core::session::{self, AuthUser, Session};
use dorama_db::{AuthProvider, Credentials, SignUpOutcome};
use dorama_events::{AppEvent, EventBus};
use tokio::sync::watch;

use crate::error::LibraryError;

pub struct AuthBridge {
    provider: Arc<dyn AuthProvider>,
    bus: Arc<EventBus>,
    admin_emails: Vec<String>,
    user: RwLock<Option<AuthUser>>,
}

impl AuthBridge {
    pub fn new(provider: Arc<dyn AuthProvider>, bus: Arc<EventBus>) -> Self {
        Self {
            provider,
            bus,
            admin_emails: Vec::new(),
            user: RwLock::new(None),
        }
    }

    /// Emails allowed to see admin controls.
    pub fn with_admin_emails(mut self, emails: Vec<String>) -> Self {
        self.admin_emails = emails;
        self
    }

    /// Pick up an existing session, if any, and broadcast the initial state.
    ///
    /// A provider error is logged and treated as signed out.
    pub async fn init(&self) -> Option<AuthUser> {
        let user = match self.provider.get_session().await {
            Ok(session) => session.map(|s| s.user),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read the current session");
                None
            }
        };
        self.set_user(user.clone());
        self.publish(user.clone());
        user
    }

    /// The provider's session channel.
    pub fn sessions(&self) -> watch::Receiver<Option<Session>> {
        self.provider.subscribe()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.user.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Whether the current user may see admin controls.
    pub fn is_admin(&self) -> bool {
        self.current_user()
            .is_some_and(|user| session::is_admin(&user, &self.admin_emails))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, LibraryError> {
        let credentials = Credentials::new(email, password);
        let session = self
            .provider
            .sign_in_with_password(&credentials)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Sign-in failed"))?;
        self.update_state(Some(session.user.clone()));
        Ok(session.user)
    }

    /// Register a new account.
    ///
    /// When the provider requires email confirmation no session exists yet,
    /// so no transition is broadcast.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignUpOutcome, LibraryError> {
        let credentials = Credentials::new(email, password);
        let outcome = self
            .provider
            .sign_up(&credentials)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Sign-up failed"))?;
        match &outcome {
            SignUpOutcome::SignedIn(session) => self.update_state(Some(session.user.clone())),
            SignUpOutcome::ConfirmationPending { user } => {
                tracing::info!(user_id = %user.id, "Sign-up awaiting email confirmation");
            }
        }
        Ok(outcome)
    }

    /// End the session. On failure the error is logged and returned and the
    /// current state is kept.
    pub async fn sign_out(&self) -> Result<(), LibraryError> {
        self.provider
            .sign_out()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Sign-out failed"))?;
        self.update_state(None);
        Ok(())
    }

    /// Apply a session change pushed by the provider (expiry, refresh,
    /// another tab signing out).
    pub fn handle_session_change(&self, session: Option<Session>) {
        self.update_state(session.map(|s| s.user));
    }

    /// Record `user` and publish the transition, unless it is already the
    /// user in effect.
    fn update_state(&self, user: Option<AuthUser>) {
        if self.set_user(user.clone()) {
            self.publish(user);
        }
    }

    /// Returns whether the user changed.
    fn set_user(&self, user: Option<AuthUser>) -> bool {
        let mut current = self.user.write().unwrap_or_else(|p| p.into_inner());
        if *current == user {
            return false;
        }
        *current = user;
        true
    }

    fn publish(&self, user: Option<AuthUser>) {
        tracing::info!(
            user_id = user.as_ref().map(|u| u.id.to_string()),
            "Auth state changed"
        );
        self.bus.publish(AppEvent::AuthStateChanged { user });
    }
}

/// Forwards the provider's own session changes (expiry, refresh, a restored
/// session) into the bridge.
pub struct SessionWatcher {
    auth: Arc<AuthBridge>,
}

impl SessionWatcher {
    pub fn new(auth: Arc<AuthBridge>) -> Self {
        Self { auth }
    }

    /// Run until the provider drops its session channel.
    pub async fn run(self, mut sessions: watch::Receiver<Option<Session>>) {
        while sessions.changed().await.is_ok() {
            let session = sessions.borrow_and_update().clone();
            self.auth.handle_session_change(session);
        }
        tracing::info!("Session channel closed, session watcher shutting down");
    }
}
