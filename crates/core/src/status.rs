//! Watch-status vocabulary.
//!
//! The stored and displayed values are the Portuguese labels used by the
//! catalog front end, so serialization goes through [`WatchStatus::as_str`]
//! rather than the variant names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// A user's progress on a single title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchStatus {
    /// "Assistidos"
    Watched,
    /// "Assistindo"
    Watching,
    /// "Assistir em breve"
    PlanToWatch,
    /// "Terminar de assistir"
    OnHold,
}

/// Every status, in menu order.
pub const ALL_STATUSES: [WatchStatus; 4] = [
    WatchStatus::Watched,
    WatchStatus::Watching,
    WatchStatus::PlanToWatch,
    WatchStatus::OnHold,
];

impl WatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Watched => "Assistidos",
            Self::Watching => "Assistindo",
            Self::PlanToWatch => "Assistir em breve",
            Self::OnHold => "Terminar de assistir",
        }
    }

    /// Parse a status selection where an empty string means "remove status".
    ///
    /// This is the shape of the value coming out of a status menu: the
    /// "Remover Status" entry carries an empty value.
    pub fn parse_selection(value: &str) -> Result<Option<Self>, CoreError> {
        if value.trim().is_empty() {
            return Ok(None);
        }
        value.parse().map(Some)
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_STATUSES
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid status '{s}'. Must be one of: {}",
                    ALL_STATUSES
                        .iter()
                        .map(|st| st.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

impl Serialize for WatchStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WatchStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
