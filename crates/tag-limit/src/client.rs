//! Data handed from the settings side to the tag editor guard.
//!
//! The editor page receives a single value, the tag limit, and only when
//! the item's content type has limiting enabled. Pages for other content
//! types get no context and no guard.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::settings::{MaxTags, TagLimitSettings};

/// Name of the client-side object the context is exposed as.
pub const CLIENT_OBJECT_NAME: &str = "tagLimit";

/// Guard configuration injected into the editor page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContext {
    /// Kept signed: a non-positive value coming back from the page caps
    /// the editor instead of failing.
    pub max_tags: i64,
}

impl ClientContext {
    pub fn new(max_tags: MaxTags) -> Self {
        Self {
            max_tags: i64::from(max_tags),
        }
    }

    /// Context for an editor page, or `None` if the content type is not
    /// limited.
    pub fn for_page(settings: &TagLimitSettings, content_type: &str) -> Option<Self> {
        if !settings.is_enabled_for(content_type) {
            debug!(content_type, "tag limiting not enabled for content type");
            return None;
        }
        Some(Self::new(settings.max_tags))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Script statement that publishes the context to the page.
    pub fn to_script(&self) -> serde_json::Result<String> {
        Ok(format!("var {CLIENT_OBJECT_NAME} = {};", self.to_json()?))
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn context_only_for_enabled_types() {
        let settings = TagLimitSettings::new(MaxTags::new(3).unwrap(), ["post"]);
        assert_eq!(
            ClientContext::for_page(&settings, "post"),
            Some(ClientContext { max_tags: 3 })
        );
        assert!(ClientContext::for_page(&settings, "page").is_none());
    }

    #[test]
    fn default_settings_attach_nowhere() {
        let settings = TagLimitSettings::default();
        assert!(ClientContext::for_page(&settings, "post").is_none());
    }

    #[test]
    fn json_shape() {
        let ctx = ClientContext::new(MaxTags::DEFAULT);
        assert_eq!(ctx.to_json().unwrap(), r#"{"max_tags":5}"#);
        assert_eq!(ctx.to_script().unwrap(), r#"var tagLimit = {"max_tags":5};"#);
    }

    #[test]
    fn parses_non_positive_limit() {
        let ctx = ClientContext::from_json(r#"{"max_tags":0}"#).unwrap();
        assert_eq!(ctx.max_tags, 0);
        assert!(ClientContext::from_json(r#"{"max_tags":"5"}"#).is_err());
    }
}
