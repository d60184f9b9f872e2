// Viagens dos Sonhos travel assistant
// Main entry point for the travel-agent binary

use clap::Parser;
use travel_agent::cli::{Cli, Command, ConfigAction};
use travel_agent::config::Config;
use travel_agent::handlers::{handle_ask, handle_chat, handle_config_path, handle_config_show};
use travel_agent::secrets::load_dotenv;
use travel_agent::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before anything reads the environment
    let dotenv_path = load_dotenv();

    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };
    let config = if cli.config.is_some() {
        Config::load_from_path(&config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log wins over the config file; RUST_LOG wins over both
    let log_level = cli.log_level(&config.core.log_level)?;
    init_telemetry_with_level(log_level);

    tracing::info!("Travel agent v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Configuration loaded from {}", config_path.display());
    if let Some(path) = &dotenv_path {
        tracing::debug!("Environment loaded from {}", path.display());
    }

    let session_id = cli
        .session
        .clone()
        .unwrap_or_else(|| config.agent.session_id.clone());

    match cli.command() {
        Command::Chat => handle_chat(&config, &session_id).await,

        Command::Ask { message } => handle_ask(&config, &session_id, &message).await,

        Command::Config { action } => {
            let mut stdout = std::io::stdout();
            match action {
                ConfigAction::Show => handle_config_show(&config, &mut stdout),
                ConfigAction::Path => handle_config_path(&config_path, &mut stdout),
            }
        }
    }
}
