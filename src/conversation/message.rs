//! Mensagens e conversas por sessão.

use serde::{Deserialize, Serialize};

/// Frase que marca uma mensagem do assistente como repasse para humano.
pub const ESCALATION_PHRASE: &str = "human agent";

/// Resposta mostrada ao usuário quando a resposta gerada não é confiável.
pub const ESCALATION_NOTICE: &str =
    "I'm not confident in my answer. Let me connect you with a human agent who can help better.";

/// Autor de uma mensagem.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Uma mensagem do chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Onde a resposta humana ficou na conversa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyPlacement {
    /// Substituiu a mensagem neste índice.
    Replaced(usize),
    /// Adicionada no final.
    Appended,
}

/// Histórico ordenado de mensagens de uma sessão.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Índice da primeira mensagem do usuário cujo conteúdo é exatamente `question`.
    pub fn find_user_message(&self, question: &str) -> Option<usize> {
        self.messages
            .iter()
            .position(|m| m.role == Role::User && m.content == question)
    }

    /// Conteúdo da mensagem logo após a primeira mensagem do usuário igual a `question`.
    pub fn reply_to(&self, question: &str) -> Option<&str> {
        let index = self.find_user_message(question)?;
        self.messages.get(index + 1).map(|m| m.content.as_str())
    }

    /// Substitui a mensagem seguinte a `question` por uma mensagem do assistente
    /// com `answer`, ou adiciona uma quando não há o que substituir.
    pub fn replace_or_append_assistant_reply(&mut self, question: &str, answer: &str) -> ReplyPlacement {
        if let Some(index) = self.find_user_message(question) {
            if let Some(slot) = self.messages.get_mut(index + 1) {
                *slot = Message::assistant(answer);
                return ReplyPlacement::Replaced(index + 1);
            }
        }

        self.messages.push(Message::assistant(answer));
        ReplyPlacement::Appended
    }

    /// Indica se a conversa está aguardando um humano.
    ///
    /// Verdadeiro quando há pelo menos duas mensagens e a última é do
    /// assistente e menciona [`ESCALATION_PHRASE`].
    pub fn is_escalated(&self) -> bool {
        if self.messages.len() < 2 {
            return false;
        }

        matches!(
            self.last(),
            Some(m) if m.role == Role::Assistant && m.content.contains(ESCALATION_PHRASE)
        )
    }
}
