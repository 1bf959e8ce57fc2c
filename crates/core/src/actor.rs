//! Actor model and helpers for the cast carousel and admin de-duplication.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Directory actor portraits live in.
pub const ACTOR_IMAGE_DIR: &str = "assets/img/actors/";

/// Actors per carousel slide.
pub const ACTORS_PER_SLIDE: usize = 5;

/// A row of the `atores` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub image: String,
}

/// Rewrite legacy `./atores/` or `atores/` image paths to [`ACTOR_IMAGE_DIR`].
///
/// Any other path is returned unchanged.
pub fn normalize_actor_image(path: &str) -> String {
    let legacy = path
        .strip_prefix("./atores/")
        .or_else(|| path.strip_prefix("atores/"));
    match legacy {
        Some(rest) => format!("{ACTOR_IMAGE_DIR}{rest}"),
        None => path.to_string(),
    }
}

/// Key used to decide whether two actors are the same person.
fn duplicate_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Find duplicate actors by name.
///
/// Actors are visited in ascending id order; the first occurrence of each
/// name is kept and every later one is returned.
pub fn find_duplicates(actors: &[Actor]) -> Vec<&Actor> {
    let mut ordered: Vec<&Actor> = actors.iter().collect();
    ordered.sort_by_key(|a| a.id);

    let mut seen = HashSet::new();
    ordered
        .into_iter()
        .filter(|a| !seen.insert(duplicate_key(&a.name)))
        .collect()
}

/// Split actors into carousel slides of `per_slide` entries.
pub fn carousel_slides(actors: &[Actor], per_slide: usize) -> Vec<&[Actor]> {
    if per_slide == 0 {
        return Vec::new();
    }
    actors.chunks(per_slide).collect()
}
