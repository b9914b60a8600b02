//! Armazenamento de conversas por sessão.
//!
//! Cada conversa fica atrás do seu próprio mutex: o trabalho numa sessão é
//! serializado e sessões diferentes andam em paralelo. O mapa externo só
//! recebe lock de escrita para criar uma sessão.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::{SupportError, SupportResult};

use super::message::{Conversation, Message, ReplyPlacement, Role};

/// Emite identificadores de sessão opacos.
pub trait SessionIssuer: Send + Sync {
    fn issue(&self) -> String;
}

/// Identificadores UUID v4 aleatórios.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIssuer;

impl SessionIssuer for UuidIssuer {
    fn issue(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Uma conversa aguardando resposta humana.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalatedSession {
    pub session_id: String,
    pub conversation: Conversation,
}

struct SessionSlot {
    /// Ordem de criação, usada para listar sessões de forma determinística.
    seq: u64,
    conversation: Arc<Mutex<Conversation>>,
}

/// Dono de todas as conversas, indexadas pelo id de sessão.
pub struct ConversationStore {
    sessions: RwLock<HashMap<String, SessionSlot>>,
    issuer: Arc<dyn SessionIssuer>,
    next_seq: AtomicU64,
}

impl ConversationStore {
    pub fn new(issuer: Arc<dyn SessionIssuer>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            issuer,
            next_seq: AtomicU64::new(0),
        }
    }

    /// Emite um novo id de sessão e inicia uma conversa vazia.
    pub async fn create_session(&self) -> String {
        let session_id = self.issuer.issue();
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id.clone(), self.new_slot());
        tracing::debug!(session_id = %session_id, "Session created");
        session_id
    }

    /// Acesso exclusivo a uma sessão, criando-a se desconhecida.
    pub async fn lock_or_create(&self, session_id: &str) -> OwnedMutexGuard<Conversation> {
        let existing = {
            let sessions = self.sessions.read().await;
            sessions.get(session_id).map(|s| s.conversation.clone())
        };

        let conversation = match existing {
            Some(c) => c,
            None => {
                let mut sessions = self.sessions.write().await;
                sessions
                    .entry(session_id.to_string())
                    .or_insert_with(|| {
                        tracing::debug!(session_id = %session_id, "Session created implicitly");
                        self.new_slot()
                    })
                    .conversation
                    .clone()
            }
        };

        conversation.lock_owned().await
    }

    /// Acesso exclusivo a uma sessão existente.
    pub async fn lock(&self, session_id: &str) -> SupportResult<OwnedMutexGuard<Conversation>> {
        let conversation = {
            let sessions = self.sessions.read().await;
            sessions
                .get(session_id)
                .map(|s| s.conversation.clone())
                .ok_or_else(|| SupportError::SessionNotFound(session_id.to_string()))?
        };

        Ok(conversation.lock_owned().await)
    }

    /// Adiciona uma mensagem, criando a sessão se desconhecida.
    pub async fn append_message(&self, session_id: &str, role: Role, content: impl Into<String>) {
        let mut conversation = self.lock_or_create(session_id).await;
        conversation.push(Message {
            role,
            content: content.into(),
        });
    }

    /// Veja [`Conversation::replace_or_append_assistant_reply`].
    pub async fn replace_or_append_assistant_reply(
        &self,
        session_id: &str,
        question: &str,
        answer: &str,
    ) -> SupportResult<ReplyPlacement> {
        let mut conversation = self.lock(session_id).await?;
        Ok(conversation.replace_or_append_assistant_reply(question, answer))
    }

    /// Todas as sessões aguardando humano, em ordem de criação.
    pub async fn list_escalated(&self) -> Vec<EscalatedSession> {
        let mut slots: Vec<(u64, String, Arc<Mutex<Conversation>>)> = {
            let sessions = self.sessions.read().await;
            sessions
                .iter()
                .map(|(id, slot)| (slot.seq, id.clone(), slot.conversation.clone()))
                .collect()
        };
        slots.sort_by_key(|(seq, _, _)| *seq);

        let mut escalated = Vec::new();
        for (_, session_id, conversation) in slots {
            let conversation = conversation.lock().await;
            if conversation.is_escalated() {
                escalated.push(EscalatedSession {
                    session_id,
                    conversation: conversation.clone(),
                });
            }
        }

        escalated
    }

    /// Cópia da conversa de uma sessão.
    pub async fn get(&self, session_id: &str) -> Option<Conversation> {
        let conversation = {
            let sessions = self.sessions.read().await;
            sessions.get(session_id).map(|s| s.conversation.clone())
        }?;

        let guard = conversation.lock().await;
        Some(guard.clone())
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn new_slot(&self) -> SessionSlot {
        SessionSlot {
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            conversation: Arc::new(Mutex::new(Conversation::new())),
        }
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(Arc::new(UuidIssuer))
    }
}
