//! Implementação dos comandos da CLI.

use std::path::{Path, PathBuf};

use crate::assistant::SupportAssistant;
use crate::completion::{self, CommandCompletion};
use crate::knowledge::SimilarityScorer;
use crate::mcp::McpServer;
use crate::types::config::{CompletionProvider, Config, CONFIG_FILE_NAME};
use crate::SupportResult;

use super::interactive::thinking_spinner;

/// Escreve um arquivo de configuração padrão.
pub async fn init(path: Option<PathBuf>, force: bool) -> SupportResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!(dir = %target_dir.display(), "Directory created");
    }

    let config_path = target_dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        println!("Configuration already exists at: {}", config_path.display());
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("Configuration created at: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Put your API token in {} (a .env file works too)",
        config.completion.api_token_env
    );
    println!("  2. Check the backend: supportloop status");
    println!("  3. Try it out: supportloop chat");

    Ok(())
}

/// Inicia o servidor MCP via stdio.
pub async fn serve(config: &Config) -> SupportResult<()> {
    tracing::debug!(
        provider = ?config.completion.provider,
        timeout_secs = config.general.timeout_secs,
        "Starting MCP server"
    );

    let mut server = McpServer::from_config(config)?;
    server.run().await
}

/// Responde uma pergunta e imprime o resultado.
pub async fn ask(question: &str, config: &Config) -> SupportResult<()> {
    let assistant = SupportAssistant::from_config(config)?;
    let session_id = assistant.create_session().await;

    let spinner = thinking_spinner();
    let reply = assistant.handle_query(&session_id, question).await;
    spinner.finish_and_clear();

    println!("{}", reply.response);
    println!();
    println!("confidence: {:.2}", reply.confidence);

    if reply.needs_human {
        // O aviso substituiu o rascunho; mostra o que o modelo gerou
        if let Some(draft) = assistant
            .conversation(&session_id)
            .await
            .and_then(|c| c.last().map(|m| m.content.clone()))
        {
            println!("draft answer: {}", draft);
        }
    }

    Ok(())
}

/// Imprime a similaridade de dois textos e os tokens comparados.
pub fn similarity(a: &str, b: &str) {
    let score = SimilarityScorer::similarity(a, b);

    let mut left: Vec<String> = SimilarityScorer::content_tokens(a).into_iter().collect();
    let mut right: Vec<String> = SimilarityScorer::content_tokens(b).into_iter().collect();
    left.sort();
    right.sort();

    println!("{:.4}", score);
    println!("  a: [{}]", left.join(", "));
    println!("  b: [{}]", right.join(", "));
}

/// Mostra a disponibilidade do backend e a configuração da base de conhecimento.
pub async fn status(config: &Config, config_path: Option<&Path>) -> SupportResult<()> {
    match config_path {
        Some(path) => println!("Configuration: {}", path.display()),
        None => println!("Configuration: lookup / defaults"),
    }
    println!();

    let backend = completion::from_config(&config.completion)?;
    let available = backend.is_available().await;
    let icon = if available { "✓" } else { "✗" };

    match config.completion.provider {
        CompletionProvider::HuggingFace => {
            let detail = if available {
                "token found".to_string()
            } else {
                format!("no token in {}", config.completion.api_token_env)
            };
            println!("  {} {} - {}", icon, backend.name(), detail);
            println!("      endpoint: {}", config.completion.api_url);
        }
        CompletionProvider::Command => {
            let detail = if available { "installed" } else { "not found" };
            println!("  {} {} - {}", icon, backend.name(), detail);

            if available {
                if let Ok(version) = CommandCompletion::from_config(&config.completion).version().await {
                    println!("      version: {}", version);
                }
            }
        }
    }

    println!();
    println!("Knowledge base:");
    println!(
        "  seed samples: {}",
        if config.knowledge.seed_samples { "yes" } else { "no" }
    );
    println!("  match threshold: {}", config.knowledge.match_threshold);
    println!("  learn threshold: {}", config.knowledge.learn_threshold);
    println!(
        "  escalation below confidence: {}",
        config.escalation.confidence_threshold
    );

    Ok(())
}

/// Imprime a versão.
pub fn version() {
    println!("supportloop {}", env!("CARGO_PKG_VERSION"));
}
