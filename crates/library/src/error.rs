use dorama_core::error::CoreError;
use dorama_db::StoreError;

/// Errors surfaced by the client library.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// The base item set could not be fetched. The catalog cannot render.
    #[error("Failed to load the catalog: {0}")]
    Initialization(#[source] StoreError),

    /// A review was submitted without choosing a rating.
    #[error("Select a rating before submitting your review")]
    MissingRating,

    /// A domain rule was violated.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store or auth call failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Environment configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),
}
