//! # supportloop
//!
//! Assistente de atendimento que aprende com as respostas humanas.
//!
//! Perguntas são respondidas pela base de conhecimento quando algum par
//! pergunta/resposta conhecido corresponde; caso contrário, por um backend de
//! completação de texto. Respostas com baixa confiança são escaladas para um
//! agente humano, e respostas humanas diferentes da automática são aprendidas.
//!
//! ## Módulos
//!
//! - [`assistant`] - Tratamento de consultas e da resposta humana
//! - [`knowledge`] - Similaridade, base de conhecimento, confiança e aprendizado
//! - [`conversation`] - Histórico de mensagens por sessão
//! - [`analytics`] - Contadores de uso
//! - [`completion`] - Backends de completação (Hugging Face, comando local)
//! - [`mcp`] - Servidor MCP (Model Context Protocol)
//! - [`cli`] - Interface de linha de comando
//! - [`types`] - Configuração, erros e payloads das ferramentas

pub mod analytics;
pub mod assistant;
#[cfg(feature = "cli")]
pub mod cli;
pub mod completion;
pub mod conversation;
pub mod knowledge;
pub mod mcp;
pub mod types;

pub use types::config::Config;
pub use types::errors::{SupportError, SupportResult};
