//! Métricas de uso.
//!
//! Conta consultas, respostas resolvidas sem humano, resoluções humanas e
//! eventos de aprendizado.

mod counters;

pub use counters::{Analytics, AnalyticsSnapshot};
