//! Similaridade léxica entre dois textos.
//!
//! Os dois textos vão para minúsculas, são quebrados em tokens de palavra e
//! viram conjuntos; uma lista fixa de palavras funcionais do inglês é removida
//! antes de calcular o índice de Jaccard.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Palavras funcionais ignoradas na comparação.
pub const STOP_WORDS: [&str; 20] = [
    "a", "an", "the", "and", "or", "but", "is", "are", "was", "were", "in", "on", "at", "to",
    "for", "with", "by", "about", "like", "from",
];

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// Calculador de similaridade por conjuntos de tokens.
pub struct SimilarityScorer;

impl SimilarityScorer {
    /// Tokens minúsculos de `text`, incluindo stop words.
    pub fn tokenize(text: &str) -> HashSet<String> {
        let lowered = text.to_lowercase();
        WORD.find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Tokens de `text` sem as stop words.
    pub fn content_tokens(text: &str) -> HashSet<String> {
        let mut tokens = Self::tokenize(text);
        tokens.retain(|t| !STOP_WORDS.contains(&t.as_str()));
        tokens
    }

    /// Similaridade de Jaccard (0.0 - 1.0) entre os tokens de conteúdo dos dois textos.
    ///
    /// Retorna 0.0 quando algum texto não tem tokens, ou quando nada sobra
    /// de algum lado após remover as stop words.
    pub fn similarity(a: &str, b: &str) -> f64 {
        let words_a = Self::content_tokens(a);
        let words_b = Self::content_tokens(b);

        if words_a.is_empty() || words_b.is_empty() {
            return 0.0;
        }

        let intersection = words_a.intersection(&words_b).count();
        let union = words_a.union(&words_b).count();

        if union == 0 {
            0.0
        } else {
            intersection as f64 / union as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_text_scores_one() {
        let text = "How do I reset my password?";
        assert_eq!(SimilarityScorer::similarity(text, text), 1.0);
    }

    #[test]
    fn test_case_and_punctuation_are_ignored() {
        assert_eq!(
            SimilarityScorer::similarity("Track my ORDER!", "track my order"),
            1.0
        );
    }

    #[test]
    fn test_stop_words_do_not_count() {
        // {reset, password} dos dois lados sem "the"/"a"/"for"
        assert_eq!(
            SimilarityScorer::similarity("reset the password", "a reset for password"),
            1.0
        );
    }

    #[test]
    fn test_partial_overlap() {
        // {how, can, i, reset, my, pwd} vs {how, do, i, reset, my, password}
        let score = SimilarityScorer::similarity("how can I reset my pwd", "How do I reset my password?");
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_and_stop_word_only_inputs_score_zero() {
        assert_eq!(SimilarityScorer::similarity("", "anything at all"), 0.0);
        assert_eq!(SimilarityScorer::similarity("the and or", "the and or"), 0.0);
        assert_eq!(SimilarityScorer::similarity("!!!", "???"), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("What payment methods do you accept?", "payment accepted here"),
            ("short", "a completely different long explanation"),
            ("", "x"),
        ];
        for (a, b) in pairs {
            assert_eq!(
                SimilarityScorer::similarity(a, b),
                SimilarityScorer::similarity(b, a)
            );
        }
    }

    #[test]
    fn test_whole_words_only() {
        // "pass" não casa como substring de "password"
        assert_eq!(SimilarityScorer::similarity("pass", "password"), 0.0);
    }

    #[test]
    fn test_tokenize_keeps_duplicates_once() {
        let tokens = SimilarityScorer::tokenize("Order order ORDER status");
        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains("order"));
        assert!(tokens.contains("status"));
    }
}
