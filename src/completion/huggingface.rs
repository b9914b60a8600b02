//! Backend de inferência hospedada no Hugging Face.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::base::{build_prompt, extract_reply, CompletionService};
use crate::conversation::Message;
use crate::types::config::CompletionConfig;
use crate::{SupportError, SupportResult};

const NAME: &str = "HuggingFace";

/// Um elemento do array de resposta da geração de texto.
#[derive(Debug, Deserialize)]
struct Generation {
    #[serde(default)]
    generated_text: String,
}

/// Cliente da API de inferência de geração de texto.
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    client: Client,
    api_url: String,
    api_token: Option<String>,
    max_length: u32,
}

impl HuggingFaceClient {
    /// Cria um cliente; `timeout` limita cada requisição HTTP.
    pub fn new(
        api_url: impl Into<String>,
        api_token: Option<String>,
        max_length: u32,
        timeout: Duration,
    ) -> SupportResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_token,
            max_length,
        })
    }

    /// Cria o cliente a partir da configuração, lendo o token do ambiente.
    pub fn from_config(config: &CompletionConfig) -> SupportResult<Self> {
        let api_token = std::env::var(&config.api_token_env)
            .ok()
            .filter(|token| !token.trim().is_empty());

        if api_token.is_none() {
            tracing::warn!(
                env = %config.api_token_env,
                "No Hugging Face API token found, requests will be anonymous"
            );
        }

        Self::new(
            &config.api_url,
            api_token,
            config.max_length,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Indica se há bearer token configurado.
    pub fn has_token(&self) -> bool {
        self.api_token.is_some()
    }

    /// Extrai a resposta do corpo retornado.
    ///
    /// A API responde com `[{"generated_text": "..."}]`; qualquer outra coisa
    /// (objetos de erro, arrays vazios) é malformada.
    pub fn parse_response(body: &Value) -> SupportResult<String> {
        let generations: Vec<Generation> = match body {
            Value::Array(items) if !items.is_empty() => serde_json::from_value(body.clone())
                .map_err(|e| SupportError::CompletionMalformed(NAME.to_string(), e.to_string()))?,
            other => {
                return Err(SupportError::CompletionMalformed(
                    NAME.to_string(),
                    other.to_string(),
                ))
            }
        };

        let generated = generations
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .unwrap_or_default();

        Ok(extract_reply(&generated))
    }
}

#[async_trait]
impl CompletionService for HuggingFaceClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn is_available(&self) -> bool {
        self.has_token()
    }

    async fn complete(&self, history: &[Message]) -> SupportResult<String> {
        let payload = json!({
            "inputs": build_prompt(history),
            "parameters": { "max_length": self.max_length }
        });

        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SupportError::CompletionTimeout(NAME.to_string())
            } else {
                SupportError::CompletionFailed(NAME.to_string(), e.to_string())
            }
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(SupportError::CompletionStatus(
                NAME.to_string(),
                status.as_u16(),
                text,
            ));
        }

        let body: Value = serde_json::from_str(&text)?;
        let reply = Self::parse_response(&body)?;

        tracing::debug!(chars = reply.len(), "Completion received");
        Ok(reply)
    }
}
