//! Rows of the `user_library` table: one per (user, drama) pair.

use dorama_core::status::WatchStatus;
use dorama_core::types::{DbId, UserId};
use serde::{Deserialize, Deserializer, Serialize};

/// A user's overlay for a single drama, as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub drama_id: DbId,
    #[serde(default)]
    pub status: Option<WatchStatus>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_favorite: bool,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Partial upsert keyed on `(user_id, drama_id)`.
///
/// Only the fields that are `Some` are sent, so a status write leaves the
/// favorite flag untouched and vice versa. `status: Some(None)` clears the
/// status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryPatch {
    pub user_id: UserId,
    pub drama_id: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<WatchStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl LibraryPatch {
    pub fn status(user_id: UserId, drama_id: DbId, status: Option<WatchStatus>) -> Self {
        Self {
            user_id,
            drama_id,
            status: Some(status),
            is_favorite: None,
        }
    }

    pub fn favorite(user_id: UserId, drama_id: DbId, is_favorite: bool) -> Self {
        Self {
            user_id,
            drama_id,
            status: None,
            is_favorite: Some(is_favorite),
        }
    }
}
