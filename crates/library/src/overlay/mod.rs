//! Per-user overlay stores: status and favorite flag per drama.
//!
//! Two implementations share one interface. [`LocalOverlayStore`] serves
//! anonymous sessions from synchronous local storage; [`CloudOverlayStore`]
//! serves authenticated sessions from an in-memory cache mirrored to the
//! remote `user_library` table. Exactly one is active at a time; the
//! [`crate::user_data::UserDataManager`] swaps them on auth changes.

pub mod cloud;
pub mod local;

use async_trait::async_trait;
use dorama_core::drama::Drama;
use dorama_core::status::WatchStatus;
use dorama_db::StoreError;

pub use cloud::CloudOverlayStore;
pub use local::LocalOverlayStore;

/// Which backing store is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayMode {
    Local,
    Cloud,
}

/// Read/write access to one user's overlay.
///
/// Reads never touch the network. Writes update the in-memory state before
/// the first await point, so a read issued right after a write (even one
/// still in flight) sees the new value.
#[async_trait]
pub trait OverlayStore: Send + Sync {
    fn mode(&self) -> OverlayMode;

    /// Current status of `drama`, if any.
    fn status(&self, drama: &Drama) -> Option<WatchStatus>;

    fn is_favorite(&self, drama: &Drama) -> bool;

    /// Set or clear the status of `drama`.
    async fn set_status(
        &self,
        drama: &Drama,
        status: Option<WatchStatus>,
    ) -> Result<(), StoreError>;

    async fn set_favorite(&self, drama: &Drama, favorite: bool) -> Result<(), StoreError>;
}
