//! Backends de completação de texto.
//!
//! Perguntas novas são respondidas por um [`CompletionService`]:
//!
//! - **HuggingFaceClient**: inferência hospedada via HTTP (padrão)
//! - **CommandCompletion**: um comando local como `ollama run`
//!
//! [`from_config`] envolve ambos em [`RetryingCompletion`].

mod base;
mod command;
mod huggingface;
mod retry;

use std::sync::Arc;

pub use base::{
    build_prompt, extract_reply, fallback_reply, CompletionService, ASSISTANT_MARKER,
    CONNECTION_FALLBACK, PROCESSING_FALLBACK, SYSTEM_PROMPT,
};
pub use command::CommandCompletion;
pub use huggingface::HuggingFaceClient;
pub use retry::RetryingCompletion;

use crate::types::config::{CompletionConfig, CompletionProvider};
use crate::SupportResult;

/// Cria o backend configurado, envolvido pela política de retentativa.
pub fn from_config(config: &CompletionConfig) -> SupportResult<Arc<dyn CompletionService>> {
    let service: Arc<dyn CompletionService> = match config.provider {
        CompletionProvider::HuggingFace => Arc::new(RetryingCompletion::new(
            HuggingFaceClient::from_config(config)?,
            config.retry.clone(),
        )),
        CompletionProvider::Command => Arc::new(RetryingCompletion::new(
            CommandCompletion::from_config(config),
            config.retry.clone(),
        )),
    };

    tracing::debug!(backend = service.name(), "Completion backend ready");
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_selects_provider() {
        let mut config = CompletionConfig::default();
        assert_eq!(from_config(&config).unwrap().name(), "HuggingFace");

        config.provider = CompletionProvider::Command;
        config.command = "llama-cli".to_string();
        assert_eq!(from_config(&config).unwrap().name(), "llama-cli");
    }
}
