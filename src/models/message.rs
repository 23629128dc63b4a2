use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Server messages carry numeric ids; optimistic ones carry a client-generated string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Server(i64),
    Local(String),
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageId::Server(id) => write!(f, "{id}"),
            MessageId::Local(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(
        default,
        rename = "sourceType",
        alias = "source_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_type: Option<String>,
}

impl Citation {
    /// Label shown for the citation: title, then url, then a placeholder.
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.url.as_deref().filter(|u| !u.is_empty()))
            .unwrap_or("Unknown source")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub content: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub created_at: String,
    #[serde(default, rename = "isOptimistic", skip_serializing_if = "std::ops::Not::not")]
    pub is_optimistic: bool,
    #[serde(default, rename = "isLoading", skip_serializing_if = "std::ops::Not::not")]
    pub is_loading: bool,
}

impl ChatMessage {
    /// The locally shown copy of a question the user just submitted.
    pub fn optimistic_user(content: &str) -> Self {
        Self {
            id: MessageId::Local(format!("optimistic-user-{}", uuid::Uuid::new_v4())),
            role: Role::User,
            content: content.to_string(),
            citations: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
            is_optimistic: true,
            is_loading: false,
        }
    }

    /// Placeholder assistant reply shown while the answer is pending.
    pub fn optimistic_placeholder() -> Self {
        Self {
            id: MessageId::Local(format!("optimistic-assistant-{}", uuid::Uuid::new_v4())),
            role: Role::Assistant,
            content: String::new(),
            citations: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
            is_optimistic: true,
            is_loading: true,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
