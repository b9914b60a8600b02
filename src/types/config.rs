//! Configuração do supportloop.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::SupportResult;

/// Nome padrão do arquivo de configuração.
pub const CONFIG_FILE_NAME: &str = "supportloop.toml";

/// Configuração principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Configurações gerais.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Configurações do serviço de completação.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Configurações da base de conhecimento.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Configurações de escalonamento.
    #[serde(default)]
    pub escalation: EscalationConfig,
}

/// Configurações gerais.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Nível de log (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Formato de log (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Tempo máximo da etapa de completação de uma consulta (em segundos),
    /// incluindo as retentativas.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_timeout() -> u64 {
    60
}

/// Backend de completação que responde perguntas novas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionProvider {
    /// Inferência hospedada no Hugging Face via HTTP.
    HuggingFace,
    /// Comando local; o prompt é passado como último argumento.
    Command,
}

/// Configurações do serviço de completação.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Backend a usar.
    #[serde(default = "default_provider")]
    pub provider: CompletionProvider,

    /// Endpoint de inferência.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Variável de ambiente com o bearer token.
    #[serde(default = "default_api_token_env")]
    pub api_token_env: String,

    /// Parâmetro de geração `max_length`.
    #[serde(default = "default_max_length")]
    pub max_length: u32,

    /// Timeout de uma tentativa (em segundos).
    #[serde(default = "default_completion_timeout")]
    pub timeout_secs: u64,

    /// Comando do provider `command`.
    #[serde(default = "default_command")]
    pub command: String,

    /// Argumentos colocados antes do prompt.
    #[serde(default)]
    pub args: Vec<String>,

    /// Política de retentativa.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: default_api_url(),
            api_token_env: default_api_token_env(),
            max_length: default_max_length(),
            timeout_secs: default_completion_timeout(),
            command: default_command(),
            args: Vec::new(),
            retry: RetryConfig::default(),
        }
    }
}

fn default_provider() -> CompletionProvider {
    CompletionProvider::HuggingFace
}

fn default_api_url() -> String {
    "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2".to_string()
}

fn default_api_token_env() -> String {
    "HUGGING_FACE_API_TOKEN".to_string()
}

fn default_max_length() -> u32 {
    150
}

fn default_completion_timeout() -> u64 {
    30
}

fn default_command() -> String {
    "ollama".to_string()
}

/// Retentativa limitada com backoff exponencial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retentativas após a primeira tentativa.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Espera antes da primeira retentativa (ms).
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Limite superior de uma espera (ms).
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Fator de crescimento entre esperas consecutivas.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

fn default_max_retries() -> u32 {
    2
}

fn default_initial_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    5_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

/// Configurações da base de conhecimento.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Carrega os pares de exemplo na inicialização.
    #[serde(default = "default_true")]
    pub seed_samples: bool,

    /// Limiar de busca; um registro casa quando a similaridade é estritamente maior.
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,

    /// Uma resposta humana é aprendida quando sua similaridade com a resposta
    /// automática é estritamente menor que este valor.
    #[serde(default = "default_learn_threshold")]
    pub learn_threshold: f64,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            seed_samples: true,
            match_threshold: default_match_threshold(),
            learn_threshold: default_learn_threshold(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_match_threshold() -> f64 {
    0.7
}

fn default_learn_threshold() -> f64 {
    0.7
}

/// Configurações de escalonamento.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Respostas geradas com confiança abaixo disto vão para um humano.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

fn default_confidence_threshold() -> f64 {
    0.5
}

impl Config {
    /// Carrega configuração de um arquivo TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> SupportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Salva configuração em um arquivo TOML.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> SupportResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Cria configuração padrão.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            completion: CompletionConfig::default(),
            knowledge: KnowledgeConfig::default(),
            escalation: EscalationConfig::default(),
        }
    }

    /// Rejeita limiares fora de [0, 1].
    pub fn validate(&self) -> SupportResult<()> {
        let thresholds = [
            ("knowledge.match_threshold", self.knowledge.match_threshold),
            ("knowledge.learn_threshold", self.knowledge.learn_threshold),
            (
                "escalation.confidence_threshold",
                self.escalation.confidence_threshold,
            ),
        ];

        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(crate::SupportError::config(format!(
                    "{} deve estar em [0, 1], recebido {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Caminho da configuração do usuário (`<config_dir>/supportloop/supportloop.toml`).
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("supportloop").join(CONFIG_FILE_NAME))
    }

    /// Carrega do diretório atual, depois do diretório do usuário, senão usa o padrão.
    pub fn load_or_default() -> Self {
        let candidates = std::iter::once(PathBuf::from(CONFIG_FILE_NAME))
            .chain(Self::user_config_path());

        for path in candidates {
            if path.exists() {
                match Self::load(&path) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid configuration");
                    }
                }
            }
        }

        Self::default_config()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
