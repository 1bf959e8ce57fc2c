//! Light/dark theme preference, persisted under the `theme` key.

use std::fmt;
use std::sync::{Arc, RwLock};

use dorama_db::local::THEME_KEY;
use dorama_db::LocalStorage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Parse a stored value; anything unrecognized is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ThemeManager {
    storage: Arc<dyn LocalStorage>,
    current: RwLock<Theme>,
}

impl ThemeManager {
    /// Restore the saved theme, defaulting to light.
    pub fn load(storage: Arc<dyn LocalStorage>) -> Self {
        let current = storage
            .get_item(THEME_KEY)
            .and_then(|value| Theme::parse(&value))
            .unwrap_or_default();
        Self {
            storage,
            current: RwLock::new(current),
        }
    }

    pub fn current(&self) -> Theme {
        *self.current.read().unwrap_or_else(|p| p.into_inner())
    }

    /// Switch theme and persist it. A storage failure is logged; the switch
    /// still applies for this session.
    pub fn toggle(&self) -> Theme {
        let next = {
            let mut current = self.current.write().unwrap_or_else(|p| p.into_inner());
            *current = current.toggled();
            *current
        };
        if let Err(e) = self.storage.set_item(THEME_KEY, next.as_str()) {
            tracing::warn!(error = %e, "Failed to persist theme");
        }
        next
    }
}
