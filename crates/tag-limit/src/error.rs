//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by settings storage backends.
///
/// Missing or malformed *values* are never errors: the settings service
/// falls back to defaults for those. Only failures to reach or decode the
/// backing store end up here.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path} is not valid YAML")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("settings value could not be encoded")]
    Json(#[from] serde_json::Error),

    #[error("settings file {path} is {size} bytes, over the {max} byte limit")]
    TooLarge { path: PathBuf, size: u64, max: u64 },
}

impl SettingsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn yaml(path: impl Into<PathBuf>, source: serde_yml::Error) -> Self {
        Self::Yaml {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using SettingsError.
pub type SettingsResult<T> = Result<T, SettingsError>;
