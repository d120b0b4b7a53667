//! Tag limit settings.
//!
//! Two values live here: the maximum number of tags per item and the set of
//! content types the limit applies to. Both are stored as plain JSON values
//! under fixed keys in a [`SettingsStorage`] backend, and read back through
//! [`SettingsService`], which owns all defaulting and coercion.
//!
//! # Usage
//!
//! ```ignore
//! let service = SettingsService::new(Arc::new(MemorySettingsStorage::new()));
//! service.install().await?;
//! service.set_max_tags("3").await?;
//! let settings = service.load().await?;
//! assert_eq!(settings.max_tags.get(), 3);
//! ```

mod form;
mod memory;
pub mod yaml;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::SettingsResult;

pub use form::{ContentTypeOption, IGNORED_CONTENT_TYPES, IgnoreList, SettingsSubmission};
pub use memory::MemorySettingsStorage;
pub use yaml::YamlSettingsStorage;

/// Storage keys for the settings values.
pub mod keys {
    /// Maximum tags per item (integer).
    pub const MAX_TAGS: &str = "tag_limit_max_tags";

    /// Content types with tag limiting enabled (array of strings).
    pub const CONTENT_TYPES: &str = "tag_limit_content_types";
}

/// Maximum number of tags allowed per item. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct MaxTags(u32);

impl MaxTags {
    /// Value used when nothing usable is stored.
    pub const DEFAULT: MaxTags = MaxTags(5);

    /// Create a limit, rejecting anything below 1.
    pub fn new(value: i64) -> Option<Self> {
        if value < 1 {
            return None;
        }
        u32::try_from(value).ok().map(Self)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Interpret a stored value.
    ///
    /// Integers and integer strings are accepted when positive. Everything
    /// else yields `None`, and the caller falls back to [`MaxTags::DEFAULT`].
    pub fn from_stored(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().and_then(Self::new),
            Value::String(s) => s.trim().parse::<i64>().ok().and_then(Self::new),
            _ => None,
        }
    }
}

impl Default for MaxTags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for MaxTags {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("max tags must be a positive integer, got {value}"))
    }
}

impl From<MaxTags> for i64 {
    fn from(value: MaxTags) -> Self {
        i64::from(value.0)
    }
}

impl fmt::Display for MaxTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coerce free-form input to an integer the way a settings form does.
///
/// Leading whitespace and an optional sign are accepted, then as many
/// digits as follow; anything after them is ignored. Input without a
/// leading number becomes 0. Out-of-range values saturate.
pub fn coerce_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(b - b'0');
        value = value.saturating_mul(10);
        value = if negative {
            value.saturating_sub(digit)
        } else {
            value.saturating_add(digit)
        };
    }
    value
}

/// A resolved snapshot of all settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagLimitSettings {
    pub max_tags: MaxTags,
    pub enabled_content_types: BTreeSet<String>,
}

impl TagLimitSettings {
    pub fn new(max_tags: MaxTags, enabled: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            max_tags,
            enabled_content_types: enabled.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether tag limiting applies to the given content type.
    pub fn is_enabled_for(&self, content_type: &str) -> bool {
        self.enabled_content_types.contains(content_type)
    }
}

/// Key/value backend for settings values.
///
/// All settings reads and writes go through this trait so the service can
/// run against a YAML file in production and memory in tests.
#[async_trait]
pub trait SettingsStorage: Send + Sync {
    /// Load a value by key. Returns `None` if the key was never stored.
    async fn load(&self, key: &str) -> SettingsResult<Option<Value>>;

    /// Store a value, replacing any previous one.
    async fn save(&self, key: &str, value: Value) -> SettingsResult<()>;

    /// Remove a value. Returns `true` if something was removed.
    async fn delete(&self, key: &str) -> SettingsResult<bool>;

    /// Check whether a key holds a value.
    async fn exists(&self, key: &str) -> SettingsResult<bool> {
        Ok(self.load(key).await?.is_some())
    }
}

/// Typed access to the tag limit settings.
#[derive(Clone)]
pub struct SettingsService {
    storage: Arc<dyn SettingsStorage>,
}

impl SettingsService {
    pub fn new(storage: Arc<dyn SettingsStorage>) -> Self {
        Self { storage }
    }

    /// Read the configured maximum, falling back to [`MaxTags::DEFAULT`].
    pub async fn get_max_tags(&self) -> SettingsResult<MaxTags> {
        let stored = self.storage.load(keys::MAX_TAGS).await?;
        Ok(resolve_max_tags(stored.as_ref()))
    }

    /// Coerce and store a new maximum. Returns the value actually stored.
    ///
    /// Only integer coercion happens here. A stored 0 or negative number is
    /// kept as-is and reads back as the default.
    pub async fn set_max_tags(&self, raw: &str) -> SettingsResult<i64> {
        let value = coerce_int(raw);
        self.storage.save(keys::MAX_TAGS, Value::from(value)).await?;
        info!(max_tags = value, "max tags updated");
        Ok(value)
    }

    /// Read the enabled content types, empty when unset.
    pub async fn get_enabled_content_types(&self) -> SettingsResult<BTreeSet<String>> {
        let stored = self.storage.load(keys::CONTENT_TYPES).await?;
        Ok(resolve_content_types(stored.as_ref()))
    }

    /// Replace the enabled content types.
    pub async fn set_enabled_content_types<I, T>(&self, types: I) -> SettingsResult<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let set: BTreeSet<String> = types.into_iter().map(Into::into).collect();
        let value = serde_json::to_value(&set)?;
        self.storage.save(keys::CONTENT_TYPES, value).await?;
        info!(count = set.len(), "enabled content types updated");
        Ok(())
    }

    /// Read both settings at once.
    pub async fn load(&self) -> SettingsResult<TagLimitSettings> {
        Ok(TagLimitSettings {
            max_tags: self.get_max_tags().await?,
            enabled_content_types: self.get_enabled_content_types().await?,
        })
    }

    /// First-activation setup: store an empty content type set.
    ///
    /// Returns `false` when a set is already stored, which is left alone.
    pub async fn install(&self) -> SettingsResult<bool> {
        if self.storage.exists(keys::CONTENT_TYPES).await? {
            debug!("content types already configured, install skipped");
            return Ok(false);
        }
        self.set_enabled_content_types(Vec::<String>::new()).await?;
        info!("tag limit settings installed");
        Ok(true)
    }

    /// Add content types to the enabled set, skipping ignored ones.
    ///
    /// Returns the types that were newly enabled.
    pub async fn enable(
        &self,
        types: &[String],
        ignore: &IgnoreList,
    ) -> SettingsResult<Vec<String>> {
        let mut enabled = self.get_enabled_content_types().await?;
        let mut added = Vec::new();
        for t in types {
            if ignore.contains(t) {
                warn!(content_type = %t, "refusing to enable ignored content type");
                continue;
            }
            if enabled.insert(t.clone()) {
                added.push(t.clone());
            }
        }
        if !added.is_empty() {
            self.set_enabled_content_types(enabled).await?;
        }
        Ok(added)
    }

    /// Remove content types from the enabled set.
    ///
    /// Returns the types that were actually removed.
    pub async fn disable(&self, types: &[String]) -> SettingsResult<Vec<String>> {
        let mut enabled = self.get_enabled_content_types().await?;
        let removed: Vec<String> = types.iter().filter(|t| enabled.remove(*t)).cloned().collect();
        if !removed.is_empty() {
            self.set_enabled_content_types(enabled).await?;
        }
        Ok(removed)
    }

    /// Apply a settings form submission.
    pub async fn apply(
        &self,
        submission: &SettingsSubmission,
        ignore: &IgnoreList,
    ) -> SettingsResult<TagLimitSettings> {
        self.set_max_tags(&submission.max_tags).await?;
        self.set_enabled_content_types(submission.content_types(ignore))
            .await?;
        info!("settings form applied");
        self.load().await
    }
}

fn resolve_max_tags(stored: Option<&Value>) -> MaxTags {
    match stored {
        None | Some(Value::Null) => MaxTags::DEFAULT,
        Some(Value::String(s)) if s.trim().is_empty() => MaxTags::DEFAULT,
        Some(value) => MaxTags::from_stored(value).unwrap_or_else(|| {
            // 0 is what an unparseable form value coerces to; not worth a warning.
            if value.as_i64() != Some(0) {
                warn!(value = %value, "invalid stored max tags, using default");
            }
            MaxTags::DEFAULT
        }),
    }
}

fn resolve_content_types(stored: Option<&Value>) -> BTreeSet<String> {
    match stored {
        None | Some(Value::Null) => BTreeSet::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item.as_str() {
                Some(s) => Some(s.to_string()),
                None => {
                    warn!(value = %item, "ignoring non-string content type");
                    None
                }
            })
            .collect(),
        Some(other) => {
            warn!(value = %other, "stored content types are not a list, treating as empty");
            BTreeSet::new()
        }
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_int_parses_leading_number() {
        assert_eq!(coerce_int("7"), 7);
        assert_eq!(coerce_int("  12abc"), 12);
        assert_eq!(coerce_int("3.9"), 3);
        assert_eq!(coerce_int("-4"), -4);
        assert_eq!(coerce_int("+6"), 6);
        assert_eq!(coerce_int("abc"), 0);
        assert_eq!(coerce_int(""), 0);
        assert_eq!(coerce_int("-"), 0);
    }

    #[test]
    fn coerce_int_saturates() {
        assert_eq!(coerce_int("99999999999999999999999"), i64::MAX);
        assert_eq!(coerce_int("-99999999999999999999999"), i64::MIN);
    }

    #[test]
    fn max_tags_rejects_non_positive() {
        assert!(MaxTags::new(0).is_none());
        assert!(MaxTags::new(-3).is_none());
        assert_eq!(MaxTags::new(1).unwrap().get(), 1);
        assert!(MaxTags::new(i64::from(u32::MAX) + 1).is_none());
    }

    #[test]
    fn resolve_max_tags_defaults() {
        assert_eq!(resolve_max_tags(None), MaxTags::DEFAULT);
        assert_eq!(resolve_max_tags(Some(&Value::Null)), MaxTags::DEFAULT);
        assert_eq!(resolve_max_tags(Some(&json!(""))), MaxTags::DEFAULT);
        assert_eq!(resolve_max_tags(Some(&json!(0))), MaxTags::DEFAULT);
        assert_eq!(resolve_max_tags(Some(&json!(-2))), MaxTags::DEFAULT);
        assert_eq!(resolve_max_tags(Some(&json!(2.5))), MaxTags::DEFAULT);
        assert_eq!(resolve_max_tags(Some(&json!("many"))), MaxTags::DEFAULT);
        assert_eq!(resolve_max_tags(Some(&json!([3]))), MaxTags::DEFAULT);
    }

    #[test]
    fn resolve_max_tags_accepts_stored_values() {
        assert_eq!(resolve_max_tags(Some(&json!(8))).get(), 8);
        assert_eq!(resolve_max_tags(Some(&json!(" 9 "))).get(), 9);
    }

    #[test]
    fn resolve_content_types_skips_junk() {
        let set = resolve_content_types(Some(&json!(["post", 4, "page", "post"])));
        assert_eq!(set.len(), 2);
        assert!(set.contains("post"));
        assert!(set.contains("page"));

        assert!(resolve_content_types(Some(&json!("post"))).is_empty());
        assert!(resolve_content_types(None).is_empty());
    }

    #[test]
    fn max_tags_serde_validates() {
        let ok: MaxTags = serde_json::from_value(json!(4)).unwrap();
        assert_eq!(ok.get(), 4);
        assert!(serde_json::from_value::<MaxTags>(json!(0)).is_err());
        assert_eq!(serde_json::to_value(MaxTags::DEFAULT).unwrap(), json!(5));
    }

    #[test]
    fn settings_enabled_lookup() {
        let settings = TagLimitSettings::new(MaxTags::DEFAULT, ["post"]);
        assert!(settings.is_enabled_for("post"));
        assert!(!settings.is_enabled_for("page"));
        assert!(TagLimitSettings::default().enabled_content_types.is_empty());
    }

    #[test]
    fn settings_serialize_with_sorted_types() {
        let settings = TagLimitSettings::new(MaxTags::new(3).unwrap(), ["post", "page"]);
        assert_eq!(
            serde_json::to_value(&settings).unwrap(),
            json!({"max_tags": 3, "enabled_content_types": ["page", "post"]})
        );
    }
}
