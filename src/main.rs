use clap::Parser;
use supportloop::cli::{commands, interactive, load_config, Cli, Commands};
use supportloop::SupportResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> SupportResult<()> {
    // Tokens de API podem ficar num arquivo .env
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    // Flags da CLI têm precedência sobre o nível configurado
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("supportloop={}", log_level)
            .parse()
            .unwrap_or_else(|_| "supportloop=info".parse().expect("fallback directive is valid")),
    );

    // Logs vão para stderr; stdout é do transporte MCP
    let layer = if config.general.log_format == "json" {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    tracing_subscriber::registry().with(layer).with(filter).init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    match cli.command {
        Commands::Init { path, force } => commands::init(path, force).await?,
        Commands::Serve => commands::serve(&config).await?,
        Commands::Chat { session } => interactive::run_chat(&config, session).await?,
        Commands::Ask { question } => commands::ask(&question, &config).await?,
        Commands::Similarity { a, b } => commands::similarity(&a, &b),
        Commands::Status => commands::status(&config, cli.config.as_deref()).await?,
        Commands::Version => commands::version(),
    }

    Ok(())
}
