//! Testes de integração do servidor MCP.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use supportloop::assistant::SupportAssistant;
use supportloop::completion::CompletionService;
use supportloop::conversation::Message;
use supportloop::knowledge::FixedRandom;
use supportloop::mcp::{JsonRpcResponse, LineTransport, McpServer};
use supportloop::SupportResult;

struct Escalating;

#[async_trait]
impl CompletionService for Escalating {
    fn name(&self) -> &str {
        "escalating"
    }

    async fn complete(&self, _history: &[Message]) -> SupportResult<String> {
        Ok("Let me check with a human agent about that.".to_string())
    }
}

fn jsonrpc_request(id: u64, method: &str, params: Option<Value>) -> String {
    let mut req = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
    });
    if let Some(p) = params {
        req["params"] = p;
    }
    serde_json::to_string(&req).unwrap()
}

fn tool_call(id: u64, name: &str, arguments: Value) -> String {
    jsonrpc_request(
        id,
        "tools/call",
        Some(json!({"name": name, "arguments": arguments})),
    )
}

/// Envia `lines` para um servidor novo e retorna as respostas.
async fn run_session(lines: &[String]) -> Vec<JsonRpcResponse> {
    let assistant = SupportAssistant::builder(Arc::new(Escalating))
        .random(Arc::new(FixedRandom(0.25)))
        .build();
    let mut server = McpServer::new(Arc::new(assistant));

    let input = lines.join("\n") + "\n";
    let mut transport = LineTransport::new(input.as_bytes(), Vec::new());
    server.serve(&mut transport).await.unwrap();

    let (_, output) = transport.into_parts();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// Parseia o texto JSON de um resultado de ferramenta.
fn tool_body(response: &JsonRpcResponse) -> (Value, bool) {
    let result = response.result.as_ref().expect("tool calls return a result");
    let text = result["content"][0]["text"].as_str().unwrap();
    let is_error = result["isError"].as_bool().unwrap_or(false);
    (serde_json::from_str(text).unwrap(), is_error)
}

#[tokio::test]
async fn test_handshake_and_tool_listing() {
    let responses = run_session(&[
        jsonrpc_request(1, "initialize", Some(json!({"protocolVersion": "2024-11-05"}))),
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#.to_string(),
        jsonrpc_request(2, "tools/list", None),
    ])
    .await;

    assert_eq!(responses.len(), 2);

    let init = responses[0].result.as_ref().unwrap();
    assert_eq!(init["serverInfo"]["name"], "supportloop");

    let tools = responses[1].result.as_ref().unwrap()["tools"].as_array().unwrap().clone();
    assert_eq!(tools.len(), 6);
    assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
}

#[tokio::test]
async fn test_escalation_and_learning_loop() {
    let question = "Why was I charged twice this month?";

    let responses = run_session(&[
        tool_call(1, "support_chat", json!({"message": question, "session_id": "s-1"})),
        tool_call(2, "support_tickets", json!({})),
        tool_call(
            3,
            "support_human_response",
            json!({
                "session_id": "s-1",
                "question": question,
                "answer": "Duplicate charges are pending authorizations and drop off within three days."
            }),
        ),
        tool_call(4, "support_tickets", json!({})),
        tool_call(5, "support_analytics", json!({})),
        tool_call(6, "support_knowledge", json!({})),
        tool_call(7, "support_chat", json!({"message": question})),
    ])
    .await;

    assert_eq!(responses.len(), 7);

    let (chat, _) = tool_body(&responses[0]);
    assert_eq!(chat["needsHuman"], true);
    assert_eq!(chat["confidence"], 0.25);

    let (tickets, _) = tool_body(&responses[1]);
    assert_eq!(tickets["tickets"][0]["sessionId"], "s-1");
    assert_eq!(tickets["tickets"][0]["conversation"][0]["content"], question);

    let (answered, is_error) = tool_body(&responses[2]);
    assert!(!is_error);
    assert_eq!(answered, json!({"success": true, "learned": true}));

    let (tickets, _) = tool_body(&responses[3]);
    assert_eq!(tickets["tickets"], json!([]));

    let (analytics, _) = tool_body(&responses[4]);
    assert_eq!(
        analytics,
        json!({
            "total_queries": 1,
            "ai_resolved": 0,
            "human_resolved": 1,
            "learning_events": 1
        })
    );

    let (knowledge, _) = tool_body(&responses[5]);
    assert_eq!(knowledge["count"], 4);
    assert_eq!(
        knowledge["records"][3]["source_answer"],
        "Let me check with a human agent about that."
    );

    // Sessão padrão, respondida com o que acabou de ser aprendido
    let (chat, _) = tool_body(&responses[6]);
    assert_eq!(chat["confidence"], 0.9);
    assert!(chat.get("needsHuman").is_none());
}

#[tokio::test]
async fn test_create_session_and_unknown_human_response() {
    let responses = run_session(&[
        tool_call(1, "support_create_session", json!({})),
        tool_call(
            2,
            "support_human_response",
            json!({"session_id": "nobody", "question": "q", "answer": "a"}),
        ),
    ])
    .await;

    let (created, _) = tool_body(&responses[0]);
    assert!(!created["sessionId"].as_str().unwrap().is_empty());

    let (missing, is_error) = tool_body(&responses[1]);
    assert!(is_error);
    assert_eq!(missing, json!({"success": false, "error": "Session not found"}));
}

#[tokio::test]
async fn test_protocol_errors_do_not_stop_the_server() {
    let responses = run_session(&[
        "{ this is not json".to_string(),
        jsonrpc_request(1, "prompts/list", None),
        jsonrpc_request(2, "tools/call", None),
        tool_call(3, "support_analytics", json!({})),
    ])
    .await;

    assert_eq!(responses.len(), 4);
    assert_eq!(responses[0].error.as_ref().unwrap().code, -32700);
    assert_eq!(responses[1].error.as_ref().unwrap().code, -32601);
    assert_eq!(responses[2].error.as_ref().unwrap().code, -32602);
    assert!(!responses[3].is_error());
}
