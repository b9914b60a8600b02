//! Payloads de requisição aceitos pelas ferramentas MCP.

use serde::{Deserialize, Serialize};

/// Sessão usada quando a requisição não informa nenhuma.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Argumentos de `support_chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Mensagem do usuário.
    pub message: String,

    /// Sessão alvo; cai em [`DEFAULT_SESSION_ID`] se ausente.
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Id de sessão efetivo, com o padrão quando ausente.
    pub fn session_id(&self) -> &str {
        self.session_id.as_deref().unwrap_or(DEFAULT_SESSION_ID)
    }
}

/// Argumentos de `support_human_response`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanAnswerRequest {
    /// Sessão da pergunta; cai em [`DEFAULT_SESSION_ID`] se ausente.
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,

    /// Texto exato da pergunta do usuário sendo respondida.
    pub question: String,

    /// Resposta do agente humano.
    pub answer: String,
}

impl HumanAnswerRequest {
    /// Id de sessão efetivo, com o padrão quando ausente.
    pub fn session_id(&self) -> &str {
        self.session_id.as_deref().unwrap_or(DEFAULT_SESSION_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_request_defaults_session() {
        let request: ChatRequest = serde_json::from_value(json!({"message": "hi"})).unwrap();
        assert_eq!(request.session_id(), DEFAULT_SESSION_ID);

        let request = ChatRequest::new("hi").with_session("abc");
        assert_eq!(request.session_id(), "abc");
    }

    #[test]
    fn test_camel_case_session_id_accepted() {
        let request: HumanAnswerRequest = serde_json::from_value(json!({
            "sessionId": "abc",
            "question": "q",
            "answer": "a"
        }))
        .unwrap();

        assert_eq!(request.session_id(), "abc");
    }

    #[test]
    fn test_human_answer_defaults_session() {
        let request: HumanAnswerRequest =
            serde_json::from_value(json!({"question": "q", "answer": "a"})).unwrap();
        assert_eq!(request.session_id(), DEFAULT_SESSION_ID);
    }
}
