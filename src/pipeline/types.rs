//! Shared types for the entry processing pipeline.

use serde::{Deserialize, Serialize};

// ── Saved entry ─────────────────────────────────────────────────────

/// A saved item fetched from Feedly.
///
/// Feedly sends camelCase field names (`canonicalUrl`, `streamId`); they map
/// 1:1 onto the snake_case fields here. Anything else on the wire is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Stable Feedly identifier.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// The URL the entry points at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    /// Publication time in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    /// The feed this entry came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
}

impl Entry {
    /// Create an entry with only an id set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            author: None,
            canonical_url: None,
            published: None,
            summary: None,
            origin: None,
        }
    }

    /// Title for log lines (`-` when absent).
    pub fn title_label(&self) -> &str {
        self.title.as_deref().unwrap_or("-")
    }

    /// Canonical URL for log lines (`-` when absent).
    pub fn url_label(&self) -> &str {
        self.canonical_url.as_deref().unwrap_or("-")
    }

    /// Stream id of the source feed, if known.
    pub fn stream_id(&self) -> Option<&str> {
        self.origin.as_ref().map(|o| o.stream_id.as_str())
    }
}

/// Structured summary content of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub content: String,
}

/// Source feed of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    pub html_url: String,
    pub stream_id: String,
    pub title: String,
}

// ── Stream page ─────────────────────────────────────────────────────

/// One page of `/v3/streams/contents`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StreamContents {
    #[serde(default)]
    pub items: Vec<Entry>,
    /// Opaque cursor for the next page. Absent on the last page.
    #[serde(default)]
    pub continuation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_deserializes_camel_case_wire_format() {
        let json = serde_json::json!({
            "id": "entry1",
            "title": "Title 1",
            "author": "Author 1",
            "published": 1678886400000_i64,
            "summary": {"content": "Summary 1"},
            "canonicalUrl": "http://example.com/canonical/1",
            "origin": {
                "htmlUrl": "http://example.com/1",
                "streamId": "stream1",
                "title": "Origin 1"
            },
            "unread": false
        });

        let entry: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.id, "entry1");
        assert_eq!(
            entry.canonical_url.as_deref(),
            Some("http://example.com/canonical/1")
        );
        assert_eq!(entry.published, Some(1_678_886_400_000));
        assert_eq!(entry.summary.unwrap().content, "Summary 1");
        let origin = entry.origin.unwrap();
        assert_eq!(origin.html_url, "http://example.com/1");
        assert_eq!(origin.stream_id, "stream1");
    }

    #[test]
    fn entry_with_only_id_is_valid() {
        let entry: Entry = serde_json::from_str(r#"{"id": "e1"}"#).unwrap();
        assert_eq!(entry, Entry::new("e1"));
        assert_eq!(entry.title_label(), "-");
        assert_eq!(entry.url_label(), "-");
        assert!(entry.stream_id().is_none());
    }

    #[test]
    fn entry_without_id_is_rejected() {
        let result = serde_json::from_str::<Entry>(r#"{"title": "no id"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn stream_contents_with_null_continuation() {
        let page: StreamContents =
            serde_json::from_str(r#"{"items": [{"id": "a"}], "continuation": null}"#).unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(page.continuation.is_none());
    }

    #[test]
    fn stream_contents_missing_items_is_empty_page() {
        let page: StreamContents = serde_json::from_str(r#"{"id": "user/1/tag/global.saved"}"#).unwrap();
        assert!(page.items.is_empty());
    }
}
