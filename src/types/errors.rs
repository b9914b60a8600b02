//! Tipos de erro do supportloop.

use thiserror::Error;

/// Tipo de resultado padrão do supportloop.
pub type SupportResult<T> = Result<T, SupportError>;

/// Erros possíveis no supportloop.
#[derive(Error, Debug)]
pub enum SupportError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Erro de HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "cli")]
    #[error("Erro no prompt: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Sessão não encontrada: {0}")]
    SessionNotFound(String),

    #[error("Serviço de completação '{0}' falhou: {1}")]
    CompletionFailed(String, String),

    #[error("Serviço de completação '{0}' retornou status {1}: {2}")]
    CompletionStatus(String, u16, String),

    #[error("Serviço de completação '{0}' retornou resposta malformada: {1}")]
    CompletionMalformed(String, String),

    #[error("Timeout aguardando o serviço de completação '{0}'")]
    CompletionTimeout(String),

    #[error("Erro no servidor MCP: {0}")]
    McpServer(String),

    #[error("{0}")]
    Other(String),
}

impl SupportError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Indica se vale tentar de novo uma completação que falhou com este erro.
    ///
    /// Timeouts, falhas de transporte, rate limiting e respostas 5xx são
    /// transitórios; corpos malformados e respostas 4xx não.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::CompletionTimeout(_) | Self::CompletionFailed(_, _) => true,
            Self::CompletionStatus(_, status, _) => *status == 429 || *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
