//! Backend de comando local (ex.: `ollama run <model>`).
//!
//! O prompt montado é passado como último argumento e o que o comando
//! imprime em stdout é a resposta.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::base::{build_prompt, extract_reply, CompletionService};
use crate::conversation::Message;
use crate::types::config::CompletionConfig;
use crate::{SupportError, SupportResult};

/// Executa um comando local para gerar completações.
#[derive(Debug, Clone)]
pub struct CommandCompletion {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandCompletion {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &CompletionConfig) -> Self {
        Self::new(&config.command, config.args.clone())
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Primeira linha de `<command> --version`.
    pub async fn version(&self) -> SupportResult<String> {
        let output = Command::new(&self.command).arg("--version").output().await?;

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("unknown")
            .to_string();

        Ok(version)
    }
}

#[async_trait]
impl CompletionService for CommandCompletion {
    fn name(&self) -> &str {
        &self.command
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    async fn complete(&self, history: &[Message]) -> SupportResult<String> {
        let prompt = build_prompt(history);

        let result = tokio::time::timeout(
            self.timeout,
            Command::new(&self.command)
                .args(&self.args)
                .arg(&prompt)
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => {
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(SupportError::CompletionFailed(
                        self.command.clone(),
                        stderr.trim().to_string(),
                    ));
                }

                let reply = extract_reply(&String::from_utf8_lossy(&output.stdout));
                if reply.is_empty() {
                    return Err(SupportError::CompletionMalformed(
                        self.command.clone(),
                        "empty output".to_string(),
                    ));
                }

                Ok(reply)
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => Err(
                SupportError::CompletionFailed(self.command.clone(), "command not found".to_string()),
            ),
            Ok(Err(e)) => Err(SupportError::CompletionFailed(
                self.command.clone(),
                e.to_string(),
            )),
            Err(_) => Err(SupportError::CompletionTimeout(self.command.clone())),
        }
    }
}
