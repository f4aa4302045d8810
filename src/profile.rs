//! Serializable description of a composition's non-image fields.
//!
//! A [`ThumbnailProfile`] captures the title, accent and badge selection
//! in a format that can be stored as JSON or passed on the command line.
//! The background image is never part of a profile.
//!
//! # Example
//!
//! ```
//! use thumbnail_composer::{AccentColor, ThumbnailProfile};
//!
//! let profile = ThumbnailProfile::new()
//!     .with_title("Hello")
//!     .with_accent(AccentColor::Black)
//!     .with_badges(["React", "Go"]);
//!
//! let json = profile.to_json().unwrap();
//! let restored = ThumbnailProfile::from_json(&json).unwrap();
//! assert_eq!(restored, profile);
//! ```

use serde::{Deserialize, Serialize};

use crate::badge::BadgeCatalog;
use crate::color::AccentColor;
use crate::error::ProfileError;
use crate::selection::SelectionSet;

// ============================================================================
// ThumbnailProfile
// ============================================================================

/// A serializable composition without its background.
///
/// # JSON Format
///
/// ```json
/// {
///   "title": "Hello",
///   "accent": "black",
///   "badges": ["React", "Go"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct ThumbnailProfile {
    pub title: String,
    pub accent: AccentColor,
    /// Badge identifiers in selection order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub badges: Vec<String>,
}

impl ThumbnailProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_accent(mut self, accent: AccentColor) -> Self {
        self.accent = accent;
        self
    }

    /// Parses the accent from its palette name.
    pub fn with_accent_name(mut self, name: &str) -> Result<Self, ProfileError> {
        self.accent = name
            .parse()
            .map_err(|_| ProfileError::UnknownAccent(name.to_string()))?;
        Ok(self)
    }

    pub fn with_badges<I, S>(mut self, badges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.badges = badges.into_iter().map(Into::into).collect();
        self
    }

    /// Resolves the badge identifiers against `catalog`.
    ///
    /// Identifiers are matched case-insensitively; a repeated identifier
    /// toggles the badge off again.
    pub fn selection(&self, catalog: &BadgeCatalog) -> Result<SelectionSet, ProfileError> {
        self.badges.iter().try_fold(SelectionSet::new(), |set, id| {
            let badge = catalog
                .get(id)
                .ok_or_else(|| ProfileError::UnknownBadge(id.clone()))?;
            Ok(set.toggle(badge))
        })
    }

    pub fn to_json(&self) -> Result<String, ProfileError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ProfileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
