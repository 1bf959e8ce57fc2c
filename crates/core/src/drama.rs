//! Catalog item model.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::DbId;

/// A cataloged title, as stored in the `dramas` table.
///
/// `title` is not guaranteed unique; anything that needs a stable key
/// must use `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drama {
    pub id: DbId,
    pub title: String,
    #[serde(default)]
    pub genres: Vec<String>,
    /// Image key, resolved to a path by [`crate::naming::ImageNaming`].
    #[serde(default)]
    pub image: String,
    #[serde(rename = "sinopse", default)]
    pub synopsis: Option<String>,
    #[serde(rename = "ano", default, deserialize_with = "lenient_number")]
    pub year: Option<u32>,
    #[serde(rename = "episodios", default, deserialize_with = "lenient_number")]
    pub episodes: Option<u32>,
    #[serde(rename = "elenco", default, deserialize_with = "null_as_empty")]
    pub cast: Vec<String>,
}

impl Drama {
    /// Minimal constructor used by tooling and tests.
    pub fn new(id: DbId, title: impl Into<String>, genres: &[&str]) -> Self {
        Self {
            id,
            title: title.into(),
            genres: genres.iter().map(|g| (*g).to_string()).collect(),
            image: String::new(),
            synopsis: None,
            year: None,
            episodes: None,
            cast: Vec::new(),
        }
    }

    /// Synopsis for the details view, with the catalog's fallback text.
    pub fn synopsis_or_default(&self) -> &str {
        self.synopsis
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Sinopse não disponível para este título.")
    }

    /// Episode count label (`"16 eps"`), or `"-"` when unknown.
    pub fn episodes_label(&self) -> String {
        match self.episodes {
            Some(n) if n > 0 => format!("{n} eps"),
            _ => "-".to_string(),
        }
    }
}

/// Accepts `16`, `"16"`, `null`, or `""` for numeric columns that were
/// hand-edited as text in older data files.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
