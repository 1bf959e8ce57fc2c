//! Cast carousel data and the admin duplicate-actor cleanup.

use std::sync::Arc;

use dorama_core::actor::{self, Actor};
use dorama_core::types::DbId;
use dorama_db::RemoteStore;

use crate::error::LibraryError;

/// Result of [`ActorsService::remove_duplicates`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    /// Ids found to duplicate an earlier actor.
    pub found: Vec<DbId>,
    /// Ids actually deleted.
    pub removed: Vec<DbId>,
}

pub struct ActorsService {
    remote: Arc<dyn RemoteStore>,
}

impl ActorsService {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self { remote }
    }

    /// All actors by ascending id, with legacy image paths rewritten.
    pub async fn load(&self) -> Result<Vec<Actor>, LibraryError> {
        let actors = self
            .remote
            .list_actors()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to load actors"))?;
        Ok(actors
            .into_iter()
            .map(|a| Actor {
                image: actor::normalize_actor_image(&a.image),
                ..a
            })
            .collect())
    }

    /// Load actors and group them into carousel slides.
    pub async fn slides(&self, per_slide: usize) -> Result<Vec<Vec<Actor>>, LibraryError> {
        let actors = self.load().await?;
        Ok(actor::carousel_slides(&actors, per_slide)
            .into_iter()
            .map(<[Actor]>::to_vec)
            .collect())
    }

    /// Delete every actor whose name repeats an earlier (lower id) actor.
    ///
    /// Deletions continue past individual failures, which are logged and
    /// left out of `removed`.
    pub async fn remove_duplicates(&self) -> Result<DuplicateReport, LibraryError> {
        let actors = self.remote.list_actors().await?;
        let found: Vec<DbId> = actor::find_duplicates(&actors).iter().map(|a| a.id).collect();

        let mut removed = Vec::with_capacity(found.len());
        for &id in &found {
            match self.remote.delete_actor(id).await {
                Ok(()) => removed.push(id),
                Err(e) => {
                    tracing::error!(actor_id = id, error = %e, "Failed to delete duplicate actor");
                }
            }
        }
        tracing::info!(
            found = found.len(),
            removed = removed.len(),
            "Duplicate actor cleanup finished"
        );
        Ok(DuplicateReport { found, removed })
    }
}
