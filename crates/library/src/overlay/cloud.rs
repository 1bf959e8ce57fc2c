//! Authenticated-mode overlay mirrored to the remote `user_library` table.
//!
//! Reads are served from a cache filled once per sign-in. Writes apply to
//! the cache first and then upsert the single changed column. A failed
//! upsert leaves the cache as written; the next reload realigns it with the
//! server.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use dorama_core::drama::Drama;
use dorama_core::session::AuthUser;
use dorama_core::status::WatchStatus;
use dorama_core::types::DbId;
use dorama_db::models::{LibraryEntry, LibraryPatch};
use dorama_db::{RemoteStore, StoreError};

use super::{OverlayMode, OverlayStore};

pub struct CloudOverlayStore {
    remote: Arc<dyn RemoteStore>,
    user: AuthUser,
    cache: RwLock<HashMap<DbId, LibraryEntry>>,
}

impl CloudOverlayStore {
    /// A store with an empty cache.
    pub fn empty(remote: Arc<dyn RemoteStore>, user: AuthUser) -> Self {
        Self {
            remote,
            user,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch every library row of `user` into a fresh cache.
    pub async fn load(remote: Arc<dyn RemoteStore>, user: AuthUser) -> Result<Self, StoreError> {
        let rows = remote.list_library(user.id).await?;
        tracing::debug!(user_id = %user.id, rows = rows.len(), "Loaded cloud overlay");
        let cache = rows.into_iter().map(|row| (row.drama_id, row)).collect();
        Ok(Self {
            remote,
            user,
            cache: RwLock::new(cache),
        })
    }

    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<DbId, LibraryEntry>> {
        self.cache.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<DbId, LibraryEntry>> {
        self.cache.write().unwrap_or_else(|p| p.into_inner())
    }

    /// Apply `update` to the cached row for `drama_id`, creating it if absent.
    fn update_cache(&self, drama_id: DbId, update: impl FnOnce(&mut LibraryEntry)) {
        let mut cache = self.write();
        let entry = cache.entry(drama_id).or_insert_with(|| LibraryEntry {
            drama_id,
            status: None,
            is_favorite: false,
        });
        update(entry);
    }
}

#[async_trait]
impl OverlayStore for CloudOverlayStore {
    fn mode(&self) -> OverlayMode {
        OverlayMode::Cloud
    }

    fn status(&self, drama: &Drama) -> Option<WatchStatus> {
        self.read().get(&drama.id).and_then(|entry| entry.status)
    }

    fn is_favorite(&self, drama: &Drama) -> bool {
        self.read().get(&drama.id).is_some_and(|entry| entry.is_favorite)
    }

    async fn set_status(
        &self,
        drama: &Drama,
        status: Option<WatchStatus>,
    ) -> Result<(), StoreError> {
        self.update_cache(drama.id, |entry| entry.status = status);
        let patch = LibraryPatch::status(self.user.id, drama.id, status);
        self.remote.upsert_library(&patch).await
    }

    async fn set_favorite(&self, drama: &Drama, favorite: bool) -> Result<(), StoreError> {
        self.update_cache(drama.id, |entry| entry.is_favorite = favorite);
        let patch = LibraryPatch::favorite(self.user.id, drama.id, favorite);
        self.remote.upsert_library(&patch).await
    }
}
