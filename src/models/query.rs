use serde::{Deserialize, Serialize};

use super::message::Citation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryAnswer {
    #[serde(default)]
    pub conversation_id: Option<i64>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// The query endpoint answers either flat or wrapped in `data`.
#[derive(Debug, Deserialize)]
pub(crate) struct QueryEnvelope {
    #[serde(default)]
    data: Option<QueryAnswer>,
    #[serde(flatten)]
    inline: QueryAnswer,
}

impl QueryEnvelope {
    pub(crate) fn into_answer(self) -> QueryAnswer {
        self.data.unwrap_or(self.inline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_missing_conversation() {
        let req = QueryRequest { question: "What did I save?".into(), conversation_id: None };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"question": "What did I save?"}));

        let req = QueryRequest { question: "More".into(), conversation_id: Some(7) };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["conversation_id"], 7);
    }

    #[test]
    fn test_wrapped_answer() {
        let json = r#"{"success": true, "data": {"conversation_id": 12, "answer": "Yes [1]", "citations": [{"number": 1}]}}"#;
        let answer = serde_json::from_str::<QueryEnvelope>(json).unwrap().into_answer();
        assert_eq!(answer.conversation_id, Some(12));
        assert_eq!(answer.answer.as_deref(), Some("Yes [1]"));
        assert_eq!(answer.citations.len(), 1);
    }

    #[test]
    fn test_flat_answer() {
        let json = r#"{"conversation_id": 5, "answer": "No"}"#;
        let answer = serde_json::from_str::<QueryEnvelope>(json).unwrap().into_answer();
        assert_eq!(answer.conversation_id, Some(5));
        assert!(answer.citations.is_empty());
    }
}
