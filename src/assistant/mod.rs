//! O assistente de atendimento.
//!
//! Junta base de conhecimento, conversas, contadores e backend de completação
//! e leva cada consulta a uma resolução ou a um escalonamento.

mod engine;

pub use engine::{
    HumanAnswerOutcome, QueryOutcome, QueryReply, SupportAssistant, SupportAssistantBuilder,
    DEFAULT_COMPLETION_BUDGET, ESCALATION_THRESHOLD, KB_MATCH_CONFIDENCE,
};
