//! CLI interface
//!
//! Command-line surface built with clap's derive API. Running the binary
//! without a subcommand starts the interactive chat.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::validate_log_level;
use crate::errors::EngineError;

/// Viagens dos Sonhos travel assistant
///
/// Chat with a travel-agency assistant backed by a hosted language model.
/// The API key is read from the environment (OPENAI_API_KEY by default),
/// which is first populated from a `.env` file when one exists.
#[derive(Parser, Debug)]
#[command(name = "travel-agent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the session identifier from the configuration
    #[arg(long, global = true, value_name = "ID")]
    pub session: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start the interactive chat (default)
    Chat,

    /// Send a single message and print the reply
    Ask {
        /// The message to send
        message: String,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration inspection actions
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Print the default configuration file path
    Path,
}

impl Cli {
    /// Subcommand to run, defaulting to the interactive chat
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }

    /// `--log` if given and valid, otherwise `config_level`
    pub fn log_level<'a>(&'a self, config_level: &'a str) -> Result<&'a str, EngineError> {
        match self.log.as_deref() {
            Some(level) => {
                validate_log_level(level)?;
                Ok(level)
            }
            None => Ok(config_level),
        }
    }
}
