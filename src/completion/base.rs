//! Trait base para backends de completação de texto.

use async_trait::async_trait;

use crate::conversation::{Message, Role};
use crate::SupportError;
use crate::SupportResult;

/// Instrução colocada antes da transcrição.
pub const SYSTEM_PROMPT: &str = "You are a helpful customer support assistant.";

/// Marcador antes de cada turno do assistente no prompt.
pub const ASSISTANT_MARKER: &str = "Assistant: ";

/// Resposta usada quando o backend devolveu algo inutilizável.
pub const PROCESSING_FALLBACK: &str = "I'm having trouble processing your request.";

/// Resposta usada quando o backend não pôde ser alcançado.
pub const CONNECTION_FALLBACK: &str = "I'm having trouble connecting to my brain right now.";

/// Serviço opaco de completação de texto.
///
/// Dada a conversa até aqui, produz a próxima resposta do assistente.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Nome do backend, usado em logs e erros.
    fn name(&self) -> &str;

    /// Indica se o backend parece utilizável (binário instalado, token presente, ...).
    async fn is_available(&self) -> bool {
        true
    }

    /// Produz a próxima resposta do assistente para `history`.
    async fn complete(&self, history: &[Message]) -> SupportResult<String>;
}

/// Monta a transcrição como prompt de texto terminando num turno aberto do assistente.
pub fn build_prompt(history: &[Message]) -> String {
    let mut prompt = format!("{}\n\n", SYSTEM_PROMPT);

    for message in history {
        match message.role {
            Role::User => prompt.push_str("User: "),
            Role::Assistant => prompt.push_str(ASSISTANT_MARKER),
        }
        prompt.push_str(&message.content);
        prompt.push('\n');
    }

    prompt.push_str(ASSISTANT_MARKER);
    prompt
}

/// Mantém só o texto após o último marcador do assistente.
///
/// Endpoints de geração ecoam o prompt; a resposta é o que vem
/// depois do último `Assistant: `.
pub fn extract_reply(generated: &str) -> String {
    generated
        .rsplit(ASSISTANT_MARKER)
        .next()
        .unwrap_or(generated)
        .trim()
        .to_string()
}

/// Resposta degradada para uma completação que falhou.
pub fn fallback_reply(error: &SupportError) -> &'static str {
    match error {
        SupportError::CompletionMalformed(_, _) | SupportError::CompletionStatus(_, _, _) => {
            PROCESSING_FALLBACK
        }
        _ => CONNECTION_FALLBACK,
    }
}
