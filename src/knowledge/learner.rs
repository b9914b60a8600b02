//! Transforma correções humanas em novos registros de conhecimento.

use std::sync::Arc;

use super::base::{KnowledgeBase, KnowledgeRecord};
use super::clock::{Clock, SystemClock};
use super::similarity::SimilarityScorer;

/// Limiar padrão de aprendizado.
pub const LEARN_THRESHOLD: f64 = 0.7;

/// Decide se uma resposta humana é diferente o bastante da automática
/// para valer a pena guardar.
#[derive(Clone)]
pub struct FeedbackLearner {
    clock: Arc<dyn Clock>,
    threshold: f64,
}

impl FeedbackLearner {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_threshold(clock, LEARN_THRESHOLD)
    }

    pub fn with_threshold(clock: Arc<dyn Clock>, threshold: f64) -> Self {
        Self { clock, threshold }
    }

    /// Adiciona `{question, human_answer}` a `kb` quando a resposta humana
    /// fica abaixo do limiar contra `ai_answer`.
    ///
    /// Retorna se um registro foi adicionado.
    pub fn learn(
        &self,
        kb: &mut KnowledgeBase,
        question: &str,
        ai_answer: &str,
        human_answer: &str,
    ) -> bool {
        let similarity = SimilarityScorer::similarity(ai_answer, human_answer);

        if similarity >= self.threshold {
            tracing::debug!(
                question = %question,
                similarity,
                "Human answer matches the automated one, nothing learned"
            );
            return false;
        }

        kb.append(KnowledgeRecord::learned(
            question,
            human_answer,
            ai_answer,
            self.clock.today(),
        ));

        tracing::info!(
            question = %question,
            similarity,
            knowledge_size = kb.len(),
            "Learned new solution"
        );

        true
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for FeedbackLearner {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
