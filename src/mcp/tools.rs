//! Handlers das ferramentas MCP.
//!
//! 1. `support_create_session` - abre uma conversa
//! 2. `support_chat` - responde uma mensagem do usuário
//! 3. `support_tickets` - conversas aguardando humano
//! 4. `support_human_response` - registra uma resposta humana e aprende com ela
//! 5. `support_analytics` - contadores de uso
//! 6. `support_knowledge` - registros de conhecimento atuais

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::assistant::SupportAssistant;
use crate::types::requests::{ChatRequest, HumanAnswerRequest};
use crate::types::responses::{
    ChatResponse, HumanAnswerResponse, KnowledgeResponse, SessionCreated, TicketsResponse,
};
use crate::SupportError;

use super::protocol::{ToolDescription, ToolResult};

/// Despacha chamadas de ferramenta para o assistente.
#[derive(Clone)]
pub struct ToolHandler {
    assistant: Arc<SupportAssistant>,
}

impl ToolHandler {
    pub fn new(assistant: Arc<SupportAssistant>) -> Self {
        Self { assistant }
    }

    pub fn assistant(&self) -> &Arc<SupportAssistant> {
        &self.assistant
    }

    /// Todas as ferramentas que o servidor expõe.
    pub fn list_tools() -> Vec<ToolDescription> {
        vec![
            ToolDescription::new(
                "support_create_session",
                "Open a new support conversation and return its session id.",
                json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            ),
            ToolDescription::new(
                "support_chat",
                "Answer a customer message. Known questions are answered from the knowledge base; \
                 others are generated and escalated to a human agent when confidence is low.",
                json!({
                    "type": "object",
                    "properties": {
                        "message": {
                            "type": "string",
                            "description": "The customer's message"
                        },
                        "session_id": {
                            "type": "string",
                            "description": "Conversation to continue (defaults to \"default\")"
                        }
                    },
                    "required": ["message"]
                }),
            ),
            ToolDescription::new(
                "support_tickets",
                "List conversations waiting for a human agent.",
                json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            ),
            ToolDescription::new(
                "support_human_response",
                "Submit a human agent's answer to a customer question. Answers that differ \
                 from the automated one are added to the knowledge base.",
                json!({
                    "type": "object",
                    "properties": {
                        "session_id": {
                            "type": "string",
                            "description": "Conversation the question belongs to (defaults to \"default\")"
                        },
                        "question": {
                            "type": "string",
                            "description": "Exact text of the customer question"
                        },
                        "answer": {
                            "type": "string",
                            "description": "The human agent's answer"
                        }
                    },
                    "required": ["question", "answer"]
                }),
            ),
            ToolDescription::new(
                "support_analytics",
                "Show query, resolution and learning counters.",
                json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            ),
            ToolDescription::new(
                "support_knowledge",
                "List the knowledge base records, oldest first.",
                json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            ),
        ]
    }

    /// Executa uma ferramenta. Falhas voltam como resultado de erro, nunca como panic.
    pub async fn handle_tool_call(&self, name: &str, arguments: Value) -> ToolResult {
        tracing::info!(tool = name, "Processing tool call");

        match name {
            "support_create_session" => self.handle_create_session().await,
            "support_chat" => self.handle_chat(arguments).await,
            "support_tickets" => self.handle_tickets().await,
            "support_human_response" => self.handle_human_response(arguments).await,
            "support_analytics" => ToolResult::success_json(&self.assistant.analytics()),
            "support_knowledge" => self.handle_knowledge().await,
            _ => ToolResult::error(format!("Unknown tool: {}", name)),
        }
    }

    async fn handle_create_session(&self) -> ToolResult {
        let session_id = self.assistant.create_session().await;
        ToolResult::success_json(&SessionCreated { session_id })
    }

    async fn handle_chat(&self, arguments: Value) -> ToolResult {
        let request: ChatRequest = match parse_arguments(arguments) {
            Ok(r) => r,
            Err(result) => return result,
        };

        let reply = self
            .assistant
            .handle_query(request.session_id(), &request.message)
            .await;

        ToolResult::success_json(&ChatResponse::from(reply))
    }

    async fn handle_tickets(&self) -> ToolResult {
        let tickets = self.assistant.tickets().await;
        ToolResult::success_json(&TicketsResponse { tickets })
    }

    async fn handle_human_response(&self, arguments: Value) -> ToolResult {
        let request: HumanAnswerRequest = match parse_arguments(arguments) {
            Ok(r) => r,
            Err(result) => return result,
        };

        match self
            .assistant
            .handle_human_answer(request.session_id(), &request.question, &request.answer)
            .await
        {
            Ok(outcome) => ToolResult::success_json(&HumanAnswerResponse::from(outcome)),
            Err(SupportError::SessionNotFound(_)) => {
                ToolResult::error_json(&HumanAnswerResponse::session_not_found())
            }
            Err(e) => ToolResult::error(e.to_string()),
        }
    }

    async fn handle_knowledge(&self) -> ToolResult {
        let records = self.assistant.knowledge().await;
        ToolResult::success_json(&KnowledgeResponse::from(records))
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolResult> {
    serde_json::from_value(arguments)
        .map_err(|e| ToolResult::error(format!("Invalid parameters: {}", e)))
}
