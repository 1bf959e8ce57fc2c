//! Anonymous-mode overlay persisted in local storage.
//!
//! Two keys are used: [`STATUS_KEY`] holds a `{drama_id: status}` object and
//! [`FAVORITES_KEY`] holds an array of favorited drama ids. Entries are keyed
//! by drama id, so two titles sharing a name never share state.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use dorama_core::drama::Drama;
use dorama_core::status::WatchStatus;
use dorama_core::types::DbId;
use dorama_db::local::{FAVORITES_KEY, STATUS_KEY};
use dorama_db::{LocalStorage, StoreError};
use serde_json::Value;

use super::{OverlayMode, OverlayStore};

#[derive(Debug, Default)]
struct LocalState {
    statuses: BTreeMap<DbId, WatchStatus>,
    favorites: BTreeSet<DbId>,
}

pub struct LocalOverlayStore {
    storage: Arc<dyn LocalStorage>,
    state: RwLock<LocalState>,
}

impl LocalOverlayStore {
    /// Read both keys from `storage`.
    ///
    /// A missing key is empty. A value that is not valid JSON is treated as
    /// empty (and overwritten on the next write). Individual entries with an
    /// unparseable id or status are skipped.
    pub fn load(storage: Arc<dyn LocalStorage>) -> Self {
        let state = LocalState {
            statuses: read_statuses(storage.as_ref()),
            favorites: read_favorites(storage.as_ref()),
        };
        tracing::debug!(
            statuses = state.statuses.len(),
            favorites = state.favorites.len(),
            "Loaded local overlay"
        );
        Self {
            storage,
            state: RwLock::new(state),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, LocalState> {
        self.state.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, LocalState> {
        self.state.write().unwrap_or_else(|p| p.into_inner())
    }
}

fn parse_key<T: serde::de::DeserializeOwned>(storage: &dyn LocalStorage, key: &str) -> Option<T> {
    let raw = storage.get_item(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring corrupt local storage value");
            None
        }
    }
}

fn read_statuses(storage: &dyn LocalStorage) -> BTreeMap<DbId, WatchStatus> {
    let Some(raw) = parse_key::<BTreeMap<String, Value>>(storage, STATUS_KEY) else {
        return BTreeMap::new();
    };
    raw.into_iter()
        .filter_map(|(id, status)| {
            let id = id.parse::<DbId>().ok()?;
            let status = status.as_str()?.parse::<WatchStatus>().ok()?;
            Some((id, status))
        })
        .collect()
}

fn read_favorites(storage: &dyn LocalStorage) -> BTreeSet<DbId> {
    parse_key::<Vec<Value>>(storage, FAVORITES_KEY)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_i64)
        .collect()
}

#[async_trait]
impl OverlayStore for LocalOverlayStore {
    fn mode(&self) -> OverlayMode {
        OverlayMode::Local
    }

    fn status(&self, drama: &Drama) -> Option<WatchStatus> {
        self.read().statuses.get(&drama.id).copied()
    }

    fn is_favorite(&self, drama: &Drama) -> bool {
        self.read().favorites.contains(&drama.id)
    }

    async fn set_status(
        &self,
        drama: &Drama,
        status: Option<WatchStatus>,
    ) -> Result<(), StoreError> {
        let serialized = {
            let mut state = self.write();
            match status {
                Some(status) => state.statuses.insert(drama.id, status),
                None => state.statuses.remove(&drama.id),
            };
            serde_json::to_string(&state.statuses)?
        };
        self.storage.set_item(STATUS_KEY, &serialized)
    }

    async fn set_favorite(&self, drama: &Drama, favorite: bool) -> Result<(), StoreError> {
        let serialized = {
            let mut state = self.write();
            if favorite {
                state.favorites.insert(drama.id);
            } else {
                state.favorites.remove(&drama.id);
            }
            serde_json::to_string(&state.favorites)?
        };
        self.storage.set_item(FAVORITES_KEY, &serialized)
    }
}
