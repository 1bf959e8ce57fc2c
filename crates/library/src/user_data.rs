//! Single source of truth for per-item user state.
//!
//! The manager holds exactly one active [`OverlayStore`]: local storage for
//! anonymous sessions, the remote library for signed-in users. Every read
//! and write goes through whichever is active; [`UserDataManager::load_data`]
//! replaces it wholesale on auth changes, so no state leaks between
//! identities.

use std::sync::{Arc, RwLock};

use dorama_core::drama::Drama;
use dorama_core::session::AuthUser;
use dorama_core::status::WatchStatus;
use dorama_db::{LocalStorage, RemoteStore};

use crate::overlay::{CloudOverlayStore, LocalOverlayStore, OverlayMode, OverlayStore};

pub struct UserDataManager {
    remote: Arc<dyn RemoteStore>,
    storage: Arc<dyn LocalStorage>,
    active: RwLock<Arc<dyn OverlayStore>>,
}

impl UserDataManager {
    /// Create a manager in anonymous mode, backed by `storage`.
    pub fn new(remote: Arc<dyn RemoteStore>, storage: Arc<dyn LocalStorage>) -> Self {
        let local: Arc<dyn OverlayStore> = Arc::new(LocalOverlayStore::load(storage.clone()));
        Self {
            remote,
            storage,
            active: RwLock::new(local),
        }
    }

    /// Rebuild the active store for `user`.
    ///
    /// With no user, the local keys are re-read. With a user, the remote
    /// library is fetched; if that fails the error is logged and the user
    /// starts with an empty overlay.
    pub async fn load_data(&self, user: Option<&AuthUser>) {
        let store: Arc<dyn OverlayStore> = match user {
            None => Arc::new(LocalOverlayStore::load(self.storage.clone())),
            Some(user) => match CloudOverlayStore::load(self.remote.clone(), user.clone()).await {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    tracing::error!(user_id = %user.id, error = %e, "Failed to load user library");
                    Arc::new(CloudOverlayStore::empty(self.remote.clone(), user.clone()))
                }
            },
        };
        tracing::info!(mode = ?store.mode(), "User data loaded");
        *self.active.write().unwrap_or_else(|p| p.into_inner()) = store;
    }

    /// The currently active store.
    pub fn store(&self) -> Arc<dyn OverlayStore> {
        self.active.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn mode(&self) -> OverlayMode {
        self.store().mode()
    }

    pub fn status(&self, drama: &Drama) -> Option<WatchStatus> {
        self.store().status(drama)
    }

    pub fn is_favorite(&self, drama: &Drama) -> bool {
        self.store().is_favorite(drama)
    }

    /// Set or clear the status of `drama`.
    ///
    /// The new value is readable immediately. A persistence failure is
    /// logged and not rolled back.
    pub async fn set_status(&self, drama: &Drama, status: Option<WatchStatus>) {
        let store = self.store();
        if let Err(e) = store.set_status(drama, status).await {
            tracing::error!(drama_id = drama.id, error = %e, "Failed to save status");
        }
    }

    /// Flip the favorite flag of `drama` and return the new value.
    pub async fn toggle_favorite(&self, drama: &Drama) -> bool {
        let store = self.store();
        let favorite = !store.is_favorite(drama);
        if let Err(e) = store.set_favorite(drama, favorite).await {
            tracing::error!(drama_id = drama.id, error = %e, "Failed to save favorite");
        }
        favorite
    }
}
