//! Armazenamento de conversas.
//!
//! Um histórico ordenado por sessão. Ids de sessão são strings opacas
//! emitidas por um [`SessionIssuer`] e só comparadas por igualdade.

mod message;
mod store;

pub use message::{
    Conversation, Message, ReplyPlacement, Role, ESCALATION_NOTICE, ESCALATION_PHRASE,
};
pub use store::{ConversationStore, EscalatedSession, SessionIssuer, UuidIssuer};
