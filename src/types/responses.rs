//! Payloads de resposta das ferramentas MCP.

use serde::{Deserialize, Serialize};

use crate::assistant::{HumanAnswerOutcome, QueryReply};
use crate::conversation::EscalatedSession;
use crate::knowledge::KnowledgeRecord;

/// Resultado de `support_create_session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: String,
}

/// Resultado de `support_chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub confidence: f64,
    /// Presente (e true) apenas quando a consulta foi escalada.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub needs_human: bool,
}

impl From<QueryReply> for ChatResponse {
    fn from(reply: QueryReply) -> Self {
        Self {
            response: reply.response,
            confidence: reply.confidence,
            needs_human: reply.needs_human,
        }
    }
}

/// Resultado de `support_tickets`.
#[derive(Debug, Clone, Serialize)]
pub struct TicketsResponse {
    pub tickets: Vec<EscalatedSession>,
}

/// Resultado de `support_human_response`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanAnswerResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HumanAnswerResponse {
    pub fn session_not_found() -> Self {
        Self {
            success: false,
            learned: None,
            error: Some("Session not found".to_string()),
        }
    }
}

impl From<HumanAnswerOutcome> for HumanAnswerResponse {
    fn from(outcome: HumanAnswerOutcome) -> Self {
        Self {
            success: true,
            learned: Some(outcome.learned),
            error: None,
        }
    }
}

/// Resultado de `support_knowledge`.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeResponse {
    pub count: usize,
    pub records: Vec<KnowledgeRecord>,
}

impl From<Vec<KnowledgeRecord>> for KnowledgeResponse {
    fn from(records: Vec<KnowledgeRecord>) -> Self {
        Self {
            count: records.len(),
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::QueryOutcome;
    use serde_json::json;

    #[test]
    fn test_needs_human_omitted_when_false() {
        let resolved = ChatResponse::from(QueryReply {
            response: "ok".into(),
            confidence: 0.9,
            needs_human: false,
            outcome: QueryOutcome::KbMatched,
        });
        assert_eq!(
            serde_json::to_value(&resolved).unwrap(),
            json!({"response": "ok", "confidence": 0.9})
        );

        let escalated = ChatResponse {
            needs_human: true,
            ..resolved
        };
        assert_eq!(serde_json::to_value(&escalated).unwrap()["needsHuman"], json!(true));
    }

    #[test]
    fn test_human_answer_response_shapes() {
        assert_eq!(
            serde_json::to_value(HumanAnswerResponse::session_not_found()).unwrap(),
            json!({"success": false, "error": "Session not found"})
        );

        let learned = HumanAnswerResponse {
            success: true,
            learned: Some(true),
            error: None,
        };
        assert_eq!(
            serde_json::to_value(learned).unwrap(),
            json!({"success": true, "learned": true})
        );
    }
}
