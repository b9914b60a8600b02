//! Heurística de confiança para respostas geradas.
//!
//! Regras, vale a primeira aplicável:
//!
//! 1. alguma pergunta armazenada passa de 0.8 contra a consulta → 0.95
//! 2. alguma pergunta armazenada passa de 0.5 → 0.7
//! 3. a resposta tem menos de 20 caracteres → 0.3
//! 4. senão, um sorteio uniforme em [0.2, 0.7]

use std::sync::Arc;

use rand::Rng;

use super::base::KnowledgeBase;

pub const HIGH_SIMILARITY: f64 = 0.8;
pub const MEDIUM_SIMILARITY: f64 = 0.5;
pub const HIGH_CONFIDENCE: f64 = 0.95;
pub const MEDIUM_CONFIDENCE: f64 = 0.7;
pub const SHORT_ANSWER_CONFIDENCE: f64 = 0.3;
pub const SHORT_ANSWER_CHARS: usize = 20;
pub const RANDOM_RANGE: (f64, f64) = (0.2, 0.7);

/// Fonte de valores uniformemente distribuídos.
pub trait RandomSource: Send + Sync {
    /// Um valor em `[low, high]`.
    fn uniform(&self, low: f64, high: f64) -> f64;
}

/// RNG local da thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn uniform(&self, low: f64, high: f64) -> f64 {
        rand::thread_rng().gen_range(low..=high)
    }
}

/// Retorna sempre o mesmo valor, limitado ao intervalo pedido.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn uniform(&self, low: f64, high: f64) -> f64 {
        self.0.clamp(low, high)
    }
}

/// Mede o quanto uma resposta gerada é confiável.
#[derive(Clone)]
pub struct ConfidenceEstimator {
    random: Arc<dyn RandomSource>,
}

impl ConfidenceEstimator {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Confiança (0.0 - 1.0) de `response` como resposta a `query`.
    pub fn estimate(&self, kb: &KnowledgeBase, query: &str, response: &str) -> f64 {
        let best = kb.similarities(query).fold(0.0_f64, f64::max);

        if best > HIGH_SIMILARITY {
            return HIGH_CONFIDENCE;
        }
        if best > MEDIUM_SIMILARITY {
            return MEDIUM_CONFIDENCE;
        }

        // Respostas muito curtas costumam indicar que o modelo se perdeu
        if response.chars().count() < SHORT_ANSWER_CHARS {
            return SHORT_ANSWER_CONFIDENCE;
        }

        let (low, high) = RANDOM_RANGE;
        self.random.uniform(low, high)
    }
}

impl Default for ConfidenceEstimator {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }
}
