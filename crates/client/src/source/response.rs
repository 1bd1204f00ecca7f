//! Daily-content API response types and normalization.
//!
//! Payloads arrive in several shapes: structured `sections` or the legacy
//! flat `previousContent`/`keyChange`/`currentContent`/`body` fields, with
//! badges (`category`, `priority`) either inside `content` or beside it.
//! [`normalize_record`] folds them all into one [`ContentRecord`].

use refill_core::{ContentRecord, LegacyFields, Sections, SourceLink};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw envelope from `GET /content/daily`.
#[derive(Debug, Deserialize)]
pub struct DailyApiResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Which tier of the server-side lookup produced the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedFrom {
    /// Dated content written by an admin.
    #[serde(alias = "firestore")]
    Admin,
    /// Found only after falling back to the common cohort.
    Common,
    /// Date-independent fallback content.
    Evergreen,
    None,
}

impl ResolvedFrom {
    /// Parse the wire value; unknown or missing values map to `None`.
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw {
            Some("admin" | "firestore") => Self::Admin,
            Some("common") => Self::Common,
            Some("evergreen") => Self::Evergreen,
            _ => Self::None,
        }
    }
}

/// Keys whose presence at the data level marks a flat (legacy) payload.
const FLAT_KEYS: &[&str] = &["title", "sections", "body", "keyChange", "previousContent", "currentContent"];

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn first_str<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| str_field(obj, k).filter(|s| !s.is_empty()))
}

fn sections_of(obj: &Map<String, Value>) -> Option<Sections> {
    let s = obj.get("sections")?.as_object()?;
    Some(Sections {
        past: str_field(s, "past").unwrap_or_default().to_string(),
        change: str_field(s, "change").unwrap_or_default().to_string(),
        detail: str_field(s, "detail").unwrap_or_default().to_string(),
    })
}

fn flat_sections(obj: &Map<String, Value>) -> Sections {
    Sections {
        past: first_str(obj, &["previousContent", "past"]).unwrap_or_default().to_string(),
        change: first_str(obj, &["keyChange", "change"]).unwrap_or_default().to_string(),
        detail: first_str(obj, &["detail", "currentContent", "body"])
            .unwrap_or_default()
            .to_string(),
    }
}

fn legacy_fields(obj: &Map<String, Value>) -> LegacyFields {
    let raw = |key: &str| str_field(obj, key).map(str::to_string);
    LegacyFields {
        key_change: raw("keyChange"),
        previous_content: raw("previousContent"),
        current_content: raw("currentContent"),
        body: raw("body"),
    }
}

fn sources_of(obj: &Map<String, Value>) -> Option<Vec<SourceLink>> {
    let arr = obj.get("sources")?.as_array()?;
    Some(
        arr.iter()
            .filter_map(Value::as_object)
            .filter_map(|s| {
                Some(SourceLink { label: str_field(s, "label")?.to_string(), url: str_field(s, "url")?.to_string() })
            })
            .collect(),
    )
}

/// Normalize an API `data` object (or a legacy row) into a content record.
///
/// Returns `None` when there is no content: `content` is null/absent and the
/// object carries none of the flat payload keys.
pub fn normalize_record(data: &Value) -> Option<ContentRecord> {
    let outer = data.as_object()?;
    let content = match outer.get("content") {
        Some(Value::Object(inner)) => inner,
        _ if FLAT_KEYS.iter().any(|k| outer.get(*k).is_some_and(|v| !v.is_null())) => outer,
        _ => return None,
    };

    let pick = |key: &str| {
        str_field(content, key)
            .or_else(|| str_field(outer, key))
            .map(str::to_string)
    };

    let sections = sections_of(content)
        .or_else(|| sections_of(outer))
        .unwrap_or_else(|| flat_sections(content));

    Some(ContentRecord {
        title: pick("title"),
        sections,
        category: pick("category"),
        priority: pick("priority"),
        sources: sources_of(content).or_else(|| sources_of(outer)).unwrap_or_default(),
        legacy: legacy_fields(content),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIXTURE_JSON: &str = r#"{
        "ok": true,
        "data": {
            "date": "2026-01-19",
            "cohort": "1990s",
            "resolvedFrom": "admin",
            "status": "published",
            "category": "programming",
            "priority": "medium",
            "content": {
                "contentVersion": 2,
                "title": "App Router",
                "sections": { "past": "P", "change": "C", "detail": "D" },
                "sources": [{ "label": "docs", "url": "https://example.com" }]
            },
            "updatedAt": "2026-01-19T09:10:00+09:00"
        }
    }"#;

    #[test]
    fn test_structured_payload_with_sibling_badges() {
        let response: DailyApiResponse = serde_json::from_str(FIXTURE_JSON).unwrap();
        assert!(response.ok);
        let data = response.data.unwrap();
        let record = normalize_record(&data).unwrap();

        assert_eq!(record.title.as_deref(), Some("App Router"));
        assert_eq!(record.sections, Sections { past: "P".into(), change: "C".into(), detail: "D".into() });
        assert_eq!(record.category.as_deref(), Some("programming"));
        assert_eq!(record.priority.as_deref(), Some("medium"));
        assert_eq!(record.sources.len(), 1);
        assert_eq!(record.sources[0].url, "https://example.com");
        assert!(record.legacy.is_empty());
    }

    #[test]
    fn test_nested_badges_win_over_siblings() {
        let data = json!({
            "category": "outer",
            "content": { "title": "T", "category": "inner", "sections": { "past": "", "change": "", "detail": "D" } }
        });
        let record = normalize_record(&data).unwrap();
        assert_eq!(record.category.as_deref(), Some("inner"));
        assert!(record.priority.is_none());
    }

    #[test]
    fn test_legacy_flat_fields() {
        let row = json!({
            "date": "2026-01-19",
            "cohort": "1990s",
            "title": "Legacy",
            "body": "body text",
            "keyChange": "what changed",
            "previousContent": "before",
            "currentContent": "after",
            "priority": "high"
        });
        let record = normalize_record(&row).unwrap();
        assert_eq!(record.sections.past, "before");
        assert_eq!(record.sections.change, "what changed");
        assert_eq!(record.sections.detail, "after");
        assert_eq!(record.priority.as_deref(), Some("high"));
        assert_eq!(record.legacy.body.as_deref(), Some("body text"));
        assert_eq!(record.legacy.key_change.as_deref(), Some("what changed"));
    }

    #[test]
    fn test_legacy_body_only_becomes_detail() {
        let row = json!({ "title": "Evergreen", "body": "fallback text" });
        let record = normalize_record(&row).unwrap();
        assert_eq!(record.sections.detail, "fallback text");
        assert!(record.sections.past.is_empty());
    }

    #[test]
    fn test_null_content_is_no_content() {
        let data = json!({ "date": "2026-01-19", "cohort": "1990s", "resolvedFrom": "none", "content": null });
        assert!(normalize_record(&data).is_none());
        assert!(normalize_record(&Value::Null).is_none());
    }

    #[test]
    fn test_malformed_sources_are_dropped() {
        let data = json!({
            "content": { "title": "T", "sources": [{ "label": "ok", "url": "u" }, { "label": 3 }, "junk"] }
        });
        let record = normalize_record(&data).unwrap();
        assert_eq!(record.sources, vec![SourceLink { label: "ok".into(), url: "u".into() }]);
    }

    #[test]
    fn test_resolved_from_wire_values() {
        assert_eq!(ResolvedFrom::from_wire(Some("admin")), ResolvedFrom::Admin);
        assert_eq!(ResolvedFrom::from_wire(Some("firestore")), ResolvedFrom::Admin);
        assert_eq!(ResolvedFrom::from_wire(Some("evergreen")), ResolvedFrom::Evergreen);
        assert_eq!(ResolvedFrom::from_wire(Some("bogus")), ResolvedFrom::None);
        assert_eq!(ResolvedFrom::from_wire(None), ResolvedFrom::None);
    }
}
