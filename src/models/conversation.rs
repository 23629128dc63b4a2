use serde::{Deserialize, Serialize};

use super::message::ChatMessage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub created_at: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub updated_at: String,
}

/// `{data: ...}` envelope used by the conversation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    pub data: T,
}
