//! Busca e aprendizado de conhecimento.
//!
//! - **SimilarityScorer**: Jaccard entre conjuntos de palavras minúsculas, sem stop words
//! - **KnowledgeBase**: registros P/R append-only com busca pelo primeiro que casa
//! - **ConfidenceEstimator**: score de confiança das respostas geradas
//! - **FeedbackLearner**: transforma correções humanas em novos registros

mod base;
mod clock;
mod confidence;
mod learner;
mod similarity;

pub use base::{KnowledgeBase, KnowledgeRecord, MATCH_THRESHOLD, SAMPLE_KNOWLEDGE};
pub use clock::{Clock, FixedClock, SystemClock};
pub use confidence::{ConfidenceEstimator, FixedRandom, RandomSource, ThreadRandom};
pub use learner::{FeedbackLearner, LEARN_THRESHOLD};
pub use similarity::{SimilarityScorer, STOP_WORDS};
