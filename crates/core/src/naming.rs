//! Image naming conventions and admin filename rules.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Default directory prefix for poster images.
pub const DEFAULT_IMAGE_BASE_PATH: &str = "assets/img/";

/// Default poster extension (posters are converted to WebP).
pub const DEFAULT_IMAGE_EXTENSION: &str = ".webp";

/// Shown when a poster fails to resolve.
pub const DEFAULT_FALLBACK_IMAGE: &str = "assets/img/placeholder.jpg";

/// Extensions the admin image listing recognises.
pub const IMAGE_EXTENSIONS: &[&str] = &["webp", "png", "jpg", "jpeg"];

/// Characters allowed in an admin-managed filename. Anything else (path
/// separators in particular) is rejected before touching the filesystem.
static FILENAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_\-.]+$").expect("valid filename regex"));

/// Maps an item's image key to a display path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageNaming {
    pub base_path: String,
    pub extension: String,
    pub fallback: String,
}

impl Default for ImageNaming {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_IMAGE_BASE_PATH.to_string(),
            extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            fallback: DEFAULT_FALLBACK_IMAGE.to_string(),
        }
    }
}

impl ImageNaming {
    /// `base_path + key + extension`.
    pub fn resolve(&self, key: &str) -> String {
        format!("{}{}{}", self.base_path, key, self.extension)
    }

    /// Path to use when the resolved image cannot be loaded.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

/// Validate a filename received by the admin server.
pub fn validate_filename(filename: &str) -> Result<(), CoreError> {
    // "." and ".." match the character class but name directories.
    if !FILENAME_PATTERN.is_match(filename) || filename == "." || filename == ".." {
        return Err(CoreError::Validation("Invalid filename".to_string()));
    }
    Ok(())
}

/// Whether a filename has one of the [`IMAGE_EXTENSIONS`] (case-insensitive).
pub fn is_image_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
