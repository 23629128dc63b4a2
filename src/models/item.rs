use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Discriminator for the item listing and ingest endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceTag {
    Note,
    Url,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Note => "NOTE",
            SourceTag::Url => "URL",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub id: i64,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub created_at: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<KnowledgeItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    #[serde(rename = "type")]
    pub source: SourceTag,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl IngestResponse {
    /// Turn an application-level `success: false` into an error. The message
    /// may be empty when the backend gave none.
    pub fn into_result(self) -> AppResult<String> {
        let message = self.message.unwrap_or_default();
        if self.success {
            Ok(message)
        } else {
            Err(AppError::Rejected(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_request_wire_format() {
        let req = IngestRequest {
            source: SourceTag::Url,
            content: "https://example.com".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"type": "URL", "content": "https://example.com"}));
    }

    #[test]
    fn test_items_response_with_missing_fields() {
        let json = r#"{"success": true, "data": [{"id": 3, "content": "abc", "created_at": "2024-01-01"}]}"#;
        let resp: ItemsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data.len(), 1);
        assert_eq!(resp.data[0].title, "");
        assert_eq!(resp.data[0].url, "");
    }

    #[test]
    fn test_items_response_with_null_fields() {
        let json = r#"{"success": true, "data": [
            {"id": 3, "content": "abc", "title": "T", "url": null, "created_at": null, "updated_at": null},
            {"id": 4, "content": "def", "title": null, "url": "https://example.com", "created_at": "2024-01-01", "updated_at": "2024-01-01"}
        ]}"#;
        let resp: ItemsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data.len(), 2);
        assert_eq!(resp.data[0].url, "");
        assert_eq!(resp.data[0].created_at, "");
        assert_eq!(resp.data[1].title, "");
        assert_eq!(resp.data[1].url, "https://example.com");
    }

    #[test]
    fn test_soft_failure_becomes_rejected() {
        let resp = IngestResponse {
            success: false,
            message: Some("Could not scrape page".into()),
        };
        match resp.into_result() {
            Err(AppError::Rejected(msg)) => assert_eq!(msg, "Could not scrape page"),
            other => panic!("unexpected: {:?}", other),
        }

        let resp = IngestResponse { success: false, message: None };
        assert!(matches!(resp.into_result(), Err(AppError::Rejected(_))));

        let resp = IngestResponse { success: true, message: Some("Saved".into()) };
        assert_eq!(resp.into_result().unwrap(), "Saved");
    }
}
