//! Fonte de data usada para datar novos registros.

use chrono::{Local, NaiveDate};

/// Fornece a data atual.
pub trait Clock: Send + Sync {
    /// Data de hoje.
    fn today(&self) -> NaiveDate;
}

/// Relógio local.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Relógio fixo numa única data.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
