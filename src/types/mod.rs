//! Tipos compartilhados: configuração, erros, requisições e respostas.

pub mod config;
pub mod errors;
pub mod requests;
pub mod responses;
