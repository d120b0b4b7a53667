//! Settings form handling.
//!
//! The admin form posts the raw max-tags text and the checked content
//! types. A hidden sentinel entry is always posted as well so that a form
//! with every box unchecked still submits a list.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::TagLimitSettings;

/// System content types that are never offered for tag limiting.
pub const IGNORED_CONTENT_TYPES: &[&str] = &[
    "attachment",
    "revision",
    "nav_menu_item",
    "custom_css",
    "customize_changeset",
    "oembed_cache",
    "user_request",
];

/// Hidden form value posted alongside the checkboxes.
const CONTENT_TYPES_SENTINEL: &str = "default";

/// Content types excluded from the settings form.
///
/// Always contains [`IGNORED_CONTENT_TYPES`]; sites may add their own.
#[derive(Debug, Clone)]
pub struct IgnoreList {
    types: BTreeSet<String>,
}

impl IgnoreList {
    /// The built-in list plus the given extras.
    pub fn with_extra<I, T>(extra: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut types: BTreeSet<String> =
            IGNORED_CONTENT_TYPES.iter().map(|t| t.to_string()).collect();
        types.extend(extra.into_iter().map(Into::into));
        Self { types }
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.types.contains(content_type)
    }

    /// Known content types that may be offered, in the order given.
    pub fn offerable<'a>(&'a self, known: &'a [String]) -> impl Iterator<Item = &'a String> {
        known.iter().filter(move |t| !self.contains(t))
    }
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self::with_extra(std::iter::empty::<String>())
    }
}

/// A checkbox on the settings form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentTypeOption {
    pub machine_name: String,
    pub checked: bool,
}

impl ContentTypeOption {
    /// Build the checkbox list for the settings form.
    pub fn list(known: &[String], settings: &TagLimitSettings, ignore: &IgnoreList) -> Vec<Self> {
        ignore
            .offerable(known)
            .map(|t| Self {
                machine_name: t.clone(),
                checked: settings.is_enabled_for(t),
            })
            .collect()
    }
}

/// Raw values posted by the settings form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsSubmission {
    /// Max tags exactly as typed.
    #[serde(default)]
    pub max_tags: String,

    /// Checked content types, including the sentinel.
    #[serde(default)]
    pub content_types: Vec<String>,
}

impl SettingsSubmission {
    pub fn new(max_tags: impl Into<String>, content_types: Vec<String>) -> Self {
        Self {
            max_tags: max_tags.into(),
            content_types,
        }
    }

    /// The submitted content types without the sentinel, blanks, duplicates
    /// or ignored types.
    pub fn content_types(&self, ignore: &IgnoreList) -> BTreeSet<String> {
        self.content_types
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty() && *t != CONTENT_TYPES_SENTINEL && !ignore.contains(t))
            .map(str::to_string)
            .collect()
    }
}
