use std::path::PathBuf;

use dorama_core::catalog::DEFAULT_PAGE_SIZE;
use dorama_core::naming::{
    ImageNaming, DEFAULT_FALLBACK_IMAGE, DEFAULT_IMAGE_BASE_PATH, DEFAULT_IMAGE_EXTENSION,
};
use dorama_db::SupabaseConfig;

use crate::error::LibraryError;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Remote project; `None` when `SUPABASE_URL` is unset.
    pub supabase: Option<SupabaseConfig>,
    /// Emails allowed to see admin controls, from comma-separated
    /// `ADMIN_EMAILS`.
    pub admin_emails: Vec<String>,
    /// Catalog page size (default: `20`).
    pub page_size: usize,
    /// Image key to path mapping.
    pub images: ImageNaming,
    /// File backing anonymous-mode local storage.
    pub storage_path: PathBuf,
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var              | Default                       |
    /// |----------------------|-------------------------------|
    /// | `SUPABASE_URL`       | unset                         |
    /// | `SUPABASE_ANON_KEY`  | required if URL is set        |
    /// | `ADMIN_EMAILS`       | empty                         |
    /// | `PAGE_SIZE`          | `20`                          |
    /// | `IMAGE_BASE_PATH`    | `assets/img/`                 |
    /// | `IMAGE_EXTENSION`    | `.webp`                       |
    /// | `FALLBACK_IMAGE`     | `assets/img/placeholder.jpg`  |
    /// | `LOCAL_STORAGE_PATH` | `data/local_storage.json`     |
    pub fn from_env() -> Result<Self, LibraryError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LibraryError> {
        let supabase = match lookup("SUPABASE_URL").filter(|u| !u.trim().is_empty()) {
            Some(url) => {
                let anon_key = lookup("SUPABASE_ANON_KEY").ok_or_else(|| {
                    LibraryError::Config("SUPABASE_ANON_KEY must be set with SUPABASE_URL".into())
                })?;
                Some(SupabaseConfig { url, anon_key })
            }
            None => None,
        };

        let admin_emails = lookup("ADMIN_EMAILS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let page_size = match lookup("PAGE_SIZE") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    LibraryError::Config(format!(
                        "PAGE_SIZE must be a positive integer, got '{raw}'"
                    ))
                })?,
            None => DEFAULT_PAGE_SIZE,
        };

        let images = ImageNaming {
            base_path: lookup("IMAGE_BASE_PATH")
                .unwrap_or_else(|| DEFAULT_IMAGE_BASE_PATH.into()),
            extension: lookup("IMAGE_EXTENSION")
                .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.into()),
            fallback: lookup("FALLBACK_IMAGE").unwrap_or_else(|| DEFAULT_FALLBACK_IMAGE.into()),
        };

        let storage_path = lookup("LOCAL_STORAGE_PATH")
            .unwrap_or_else(|| "data/local_storage.json".into())
            .into();

        Ok(Self {
            supabase,
            admin_emails,
            page_size,
            images,
            storage_path,
        })
    }
}
