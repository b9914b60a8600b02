//! Base de conhecimento append-only de pares pergunta/resposta.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::similarity::SimilarityScorer;

/// Limiar padrão de busca.
pub const MATCH_THRESHOLD: f64 = 0.7;

/// Um par pergunta/resposta aprendido.
///
/// Registros nunca são editados; uma correção vira um novo registro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub question: String,
    pub answer: String,
    /// Resposta automática substituída por este registro, quando aprendido de feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_answer: Option<String>,
    pub created_at: NaiveDate,
}

impl KnowledgeRecord {
    /// Cria um registro que não veio de feedback.
    pub fn new(question: impl Into<String>, answer: impl Into<String>, created_at: NaiveDate) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            source_answer: None,
            created_at,
        }
    }

    /// Cria um registro aprendido de uma correção humana de `source_answer`.
    pub fn learned(
        question: impl Into<String>,
        answer: impl Into<String>,
        source_answer: impl Into<String>,
        created_at: NaiveDate,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            source_answer: Some(source_answer.into()),
            created_at,
        }
    }
}

/// Pares de exemplo carregados na inicialização.
pub const SAMPLE_KNOWLEDGE: [(&str, &str); 3] = [
    (
        "How do I reset my password?",
        "To reset your password, click on the 'Forgot Password' link on the login page and follow the instructions sent to your email.",
    ),
    (
        "What payment methods do you accept?",
        "We accept Visa, Mastercard, American Express, and PayPal as payment methods.",
    ),
    (
        "How can I track my order?",
        "You can track your order by logging into your account and visiting the 'Order History' section, or by using the tracking number sent in your shipping confirmation email.",
    ),
];

/// Coleção ordenada de registros de conhecimento.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    records: Vec<KnowledgeRecord>,
    match_threshold: f64,
}

impl KnowledgeBase {
    /// Cria uma base de conhecimento vazia.
    pub fn new() -> Self {
        Self::with_threshold(MATCH_THRESHOLD)
    }

    /// Cria uma base vazia com limiar de busca próprio.
    pub fn with_threshold(match_threshold: f64) -> Self {
        Self {
            records: Vec::new(),
            match_threshold,
        }
    }

    /// Cria uma base com os pares de exemplo, datados com `today`.
    pub fn seeded(today: NaiveDate) -> Self {
        let mut kb = Self::new();
        kb.seed_samples(today);
        kb
    }

    /// Adiciona os pares de exemplo.
    pub fn seed_samples(&mut self, today: NaiveDate) {
        for (question, answer) in SAMPLE_KNOWLEDGE {
            self.append(KnowledgeRecord::new(question, answer, today));
        }
    }

    /// Primeiro registro, em ordem de inserção, cuja pergunta é similar o bastante a `query`.
    ///
    /// Vale o primeiro que passa do limiar: um registro posterior com score
    /// maior nunca ganha de um anterior.
    pub fn find_best_match(&self, query: &str) -> Option<&KnowledgeRecord> {
        self.records
            .iter()
            .find(|record| SimilarityScorer::similarity(query, &record.question) > self.match_threshold)
    }

    /// Adiciona um registro no final.
    pub fn append(&mut self, record: KnowledgeRecord) {
        tracing::debug!(question = %record.question, "Knowledge record appended");
        self.records.push(record);
    }

    /// Similaridade de `query` com cada pergunta armazenada, em ordem de inserção.
    pub fn similarities<'a>(&'a self, query: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.records
            .iter()
            .map(move |record| SimilarityScorer::similarity(query, &record.question))
    }

    /// Todos os registros em ordem de inserção.
    pub fn records(&self) -> &[KnowledgeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Limiar de busca atual.
    pub fn match_threshold(&self) -> f64 {
        self.match_threshold
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_seeded_contains_samples() {
        let kb = KnowledgeBase::seeded(day());
        assert_eq!(kb.len(), 3);
        assert_eq!(kb.records()[0].question, "How do I reset my password?");
        assert!(kb.records().iter().all(|r| r.source_answer.is_none()));
        assert!(kb.records().iter().all(|r| r.created_at == day()));
    }

    #[test]
    fn test_find_best_match_hit() {
        let kb = KnowledgeBase::seeded(day());
        let record = kb.find_best_match("how do i reset my password").unwrap();
        assert!(record.answer.contains("Forgot Password"));
    }

    #[test]
    fn test_find_best_match_miss() {
        let kb = KnowledgeBase::seeded(day());
        assert!(kb.find_best_match("Do you ship to Canada?").is_none());
        assert!(kb.find_best_match("").is_none());
    }

    #[test]
    fn test_threshold_is_strict() {
        // {reset, password, now} vs {reset, password, today}: 2/4 = 0.5
        let mut kb = KnowledgeBase::with_threshold(0.5);
        kb.append(KnowledgeRecord::new("reset password now", "x", day()));
        assert!(kb.find_best_match("reset password today").is_none());
    }

    #[test]
    fn test_first_match_wins_over_better_match() {
        let mut kb = KnowledgeBase::new();
        // 3/4 = 0.75 contra a consulta
        kb.append(KnowledgeRecord::new("cancel my order please", "first", day()));
        // pergunta idêntica, 1.0
        kb.append(KnowledgeRecord::new("cancel my order", "second", day()));

        let record = kb.find_best_match("cancel my order").unwrap();
        assert_eq!(record.answer, "first");
    }

    #[test]
    fn test_append_keeps_duplicates() {
        let mut kb = KnowledgeBase::new();
        kb.append(KnowledgeRecord::new("q", "a", day()));
        kb.append(KnowledgeRecord::new("q", "a", day()));
        assert_eq!(kb.len(), 2);
    }
}
