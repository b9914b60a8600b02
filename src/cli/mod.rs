//! Interface de linha de comando do supportloop.

pub mod commands;
pub mod interactive;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::types::config::Config;
use crate::SupportResult;

/// supportloop - assistente de atendimento que aprende com humanos.
#[derive(Parser, Debug)]
#[command(name = "supportloop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração (padrão: ./supportloop.toml, depois o diretório do usuário).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Modo verbose.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Modo silencioso (só erros).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cria um supportloop.toml padrão.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Sobrescreve um arquivo existente.
        #[arg(long)]
        force: bool,
    },

    /// Inicia o servidor MCP em stdin/stdout.
    Serve,

    /// Conversa com o assistente; escalonamentos podem ser respondidos na hora.
    Chat {
        /// Id de sessão a usar (senão um novo é emitido).
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Faz uma pergunta e imprime a resposta.
    Ask {
        /// A pergunta.
        question: String,
    },

    /// Imprime a similaridade entre dois textos.
    Similarity {
        a: String,
        b: String,
    },

    /// Mostra o status do backend de completação e da base de conhecimento.
    Status,

    /// Mostra a versão.
    Version,
}

/// Carrega a configuração indicada na linha de comando, ou procura uma.
///
/// Um caminho explícito precisa existir e ser válido; a busca cai no padrão.
pub fn load_config(explicit: Option<&Path>) -> SupportResult<Config> {
    match explicit {
        Some(path) => Config::load(path),
        None => Ok(Config::load_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_similarity() {
        let cli = Cli::parse_from(["supportloop", "-v", "similarity", "reset password", "password reset"]);

        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Similarity { ref a, .. } if a == "reset password"));
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("supportloop.toml");
        std::fs::write(&path, "[escalation]\nconfidence_threshold = 0.4\n").unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.escalation.confidence_threshold, 0.4);
    }
}
