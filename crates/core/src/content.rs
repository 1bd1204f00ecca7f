//! Content records and daily bundles.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cache::hash::{FingerprintAlgorithm, fingerprint};

/// The three narrative sections of a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Sections {
    #[serde(default)]
    pub past: String,
    #[serde(default)]
    pub change: String,
    #[serde(default)]
    pub detail: String,
}

/// A source citation shown under a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourceLink {
    pub label: String,
    pub url: String,
}

/// Flat fields carried by rows in the legacy single-body format.
///
/// Kept verbatim next to the normalized sections because legacy content ids
/// hash them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegacyFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_change: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl LegacyFields {
    pub fn is_empty(&self) -> bool {
        self.key_change.is_none()
            && self.previous_content.is_none()
            && self.current_content.is_none()
            && self.body.is_none()
    }
}

/// Canonical, server-resolved content for one (date, cohort).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ContentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub sections: Sections,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceLink>,
    #[serde(default, skip_serializing_if = "LegacyFields::is_empty")]
    pub legacy: LegacyFields,
}

impl ContentRecord {
    /// Whether there is any non-blank text to show.
    ///
    /// Records with only whitespace render as the empty state.
    pub fn has_meaningful_content(&self) -> bool {
        let s = &self.sections;
        let has_sections = [&s.past, &s.change, &s.detail].iter().any(|t| !t.trim().is_empty());
        let has_title = self.title.as_deref().is_some_and(|t| !t.trim().is_empty());
        has_sections || has_title
    }
}

/// Frozen local snapshot of one day's content for one cohort.
///
/// `content_id` is `None` exactly when `content` is `None`; construct through
/// [`DailyBundle::empty`] or [`DailyBundle::resolved`] to keep that pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyBundle {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub cohort: String,
    pub content_id: Option<String>,
    pub content: Option<ContentRecord>,
}

impl DailyBundle {
    /// Placeholder bundle for a key with no content.
    pub fn empty(date: &str, cohort: &str) -> Self {
        Self { date: date.to_string(), cohort: cohort.to_string(), content_id: None, content: None }
    }

    /// Bundle for resolved content, fingerprinted with `algorithm`.
    pub fn resolved(date: &str, cohort: &str, content: ContentRecord, algorithm: FingerprintAlgorithm) -> Self {
        let id = fingerprint(date, cohort, &content, algorithm);
        Self { date: date.to_string(), cohort: cohort.to_string(), content_id: Some(id), content: Some(content) }
    }

    /// Storage key for this bundle.
    pub fn key(&self) -> String {
        bundle_key(&self.date, &self.cohort)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    /// Read-state key derived from the fingerprint, if any.
    pub fn read_key(&self) -> Option<String> {
        self.content_id.as_deref().map(read_key)
    }

    /// Whether the id/content pairing holds.
    pub fn is_consistent(&self) -> bool {
        self.content_id.is_some() == self.content.is_some()
    }
}

pub const BUNDLE_PREFIX: &str = "bundle:";
pub const READ_PREFIX: &str = "read:";

/// `bundle:{date}:{cohort}`
pub fn bundle_key(date: &str, cohort: &str) -> String {
    format!("{BUNDLE_PREFIX}{date}:{cohort}")
}

/// `read:{contentId}`
pub fn read_key(content_id: &str) -> String {
    format!("{READ_PREFIX}{content_id}")
}

/// Split a bundle key into (date, cohort). The cohort may itself contain `:`.
pub fn parse_bundle_key(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix(BUNDLE_PREFIX)?;
    let (date, cohort) = rest.split_once(':')?;
    Some((date, cohort))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ContentRecord {
        ContentRecord {
            title: Some("T".into()),
            sections: Sections { past: "P".into(), change: "C".into(), detail: "D".into() },
            ..Default::default()
        }
    }

    #[test]
    fn test_bundle_key_format() {
        assert_eq!(bundle_key("2026-01-19", "1990s"), "bundle:2026-01-19:1990s");
        assert_eq!(read_key("2026-01-19:1990s:abc"), "read:2026-01-19:1990s:abc");
    }

    #[test]
    fn test_parse_bundle_key() {
        assert_eq!(parse_bundle_key("bundle:2026-01-19:1990s"), Some(("2026-01-19", "1990s")));
        assert_eq!(parse_bundle_key("bundle:2026-01-19:a:b"), Some(("2026-01-19", "a:b")));
        assert_eq!(parse_bundle_key("bundle:2026-01-19"), None);
        assert_eq!(parse_bundle_key("read:2026-01-19:1990s"), None);
    }

    #[test]
    fn test_empty_and_resolved_pairing() {
        let empty = DailyBundle::empty("2026-01-19", "1990s");
        assert!(empty.is_consistent());
        assert!(empty.read_key().is_none());

        let full = DailyBundle::resolved("2026-01-19", "1990s", record(), FingerprintAlgorithm::Djb2);
        assert!(full.is_consistent());
        assert!(full.content_id.as_deref().unwrap().starts_with("2026-01-19:1990s:"));
        assert_eq!(full.key(), "bundle:2026-01-19:1990s");
    }

    #[test]
    fn test_bundle_json_shape() {
        let bundle = DailyBundle::empty("2026-01-19", "1990s");
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["date"], "2026-01-19");
        assert!(json["contentId"].is_null());
        assert!(json["content"].is_null());
    }

    #[test]
    fn test_meaningful_content() {
        assert!(record().has_meaningful_content());

        let blank = ContentRecord { title: Some("  ".into()), ..Default::default() };
        assert!(!blank.has_meaningful_content());

        let detail_only = ContentRecord {
            sections: Sections { detail: "only detail".into(), ..Default::default() },
            ..Default::default()
        };
        assert!(detail_only.has_meaningful_content());
    }
}
