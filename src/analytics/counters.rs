//! Contadores de eventos do processo.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Contadores monotônicos de eventos processados.
///
/// Os contadores só crescem; zeram quando o processo reinicia.
#[derive(Debug, Default)]
pub struct Analytics {
    total_queries: AtomicU64,
    ai_resolved: AtomicU64,
    human_resolved: AtomicU64,
    learning_events: AtomicU64,
}

impl Analytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_query(&self) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ai_resolved(&self) {
        self.ai_resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_human_resolved(&self) {
        self.human_resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_learning_event(&self) {
        self.learning_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_queries(&self) -> u64 {
        self.total_queries.load(Ordering::Relaxed)
    }

    pub fn ai_resolved(&self) -> u64 {
        self.ai_resolved.load(Ordering::Relaxed)
    }

    pub fn human_resolved(&self) -> u64 {
        self.human_resolved.load(Ordering::Relaxed)
    }

    pub fn learning_events(&self) -> u64 {
        self.learning_events.load(Ordering::Relaxed)
    }

    /// Valores atuais.
    pub fn snapshot(&self) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            total_queries: self.total_queries(),
            ai_resolved: self.ai_resolved(),
            human_resolved: self.human_resolved(),
            learning_events: self.learning_events(),
        }
    }
}

/// Cópia pontual dos contadores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub total_queries: u64,
    pub ai_resolved: u64,
    pub human_resolved: u64,
    pub learning_events: u64,
}

impl AnalyticsSnapshot {
    /// Fração das consultas respondidas sem humano (ai_resolved / total).
    pub fn ai_resolution_rate(&self) -> f64 {
        if self.total_queries == 0 {
            0.0
        } else {
            self.ai_resolved as f64 / self.total_queries as f64
        }
    }
}
