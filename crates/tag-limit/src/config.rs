//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use crate::settings::IgnoreList;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the YAML settings file (default: ./tag_limit.yml).
    pub settings_path: PathBuf,

    /// Content types known to the host (comma-separated, default: "post,page").
    pub content_types: Vec<String>,

    /// Extra content types never offered for limiting (comma-separated, default: none).
    pub ignored_content_types: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let settings_path = env::var("TAG_LIMIT_SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./tag_limit.yml"));

        let content_types = env::var("TAG_LIMIT_CONTENT_TYPES")
            .map(|v| split_list(&v))
            .unwrap_or_else(|_| vec!["post".to_string(), "page".to_string()]);

        let ignored_content_types = env::var("TAG_LIMIT_IGNORED_TYPES")
            .map(|v| split_list(&v))
            .unwrap_or_default();

        Self {
            settings_path,
            content_types,
            ignored_content_types,
        }
    }

    /// The built-in ignore list extended with the configured extras.
    pub fn ignore_list(&self) -> IgnoreList {
        IgnoreList::with_extra(self.ignored_content_types.iter().cloned())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
