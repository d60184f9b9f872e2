//! Command handlers for CLI operations
//!
//! - chat: interactive loop on the configured session
//! - ask: one turn, reply printed to stdout
//! - config show / config path: inspect configuration

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::BufReader;

use crate::config::Config;
use crate::conversation::ConversationEngine;
use crate::llm::openai::OpenAIProvider;
use crate::repl::{write_turn_result, Repl};
use crate::session::SessionStore;

/// Build the conversation engine described by the configuration
///
/// No network traffic happens here; a missing API key only shows up on the
/// first turn.
pub fn build_engine(config: &Config) -> Result<ConversationEngine> {
    let openai = &config.llm.openai;
    let provider =
        OpenAIProvider::from_config(openai).context("Failed to create OpenAI provider")?;

    tracing::info!(
        "Using {} at {} (model {}, temperature {})",
        config.llm.provider,
        openai.base_url,
        openai.model,
        openai.temperature
    );

    Ok(ConversationEngine::new(
        Arc::new(provider),
        Arc::new(SessionStore::new()),
        config.agent.system_prompt.clone(),
        openai.generation_params(),
    )
    .with_timeout(openai.request_timeout()))
}

/// Run the interactive chat on stdin/stdout
pub async fn handle_chat(config: &Config, session_id: &str) -> Result<()> {
    let engine = build_engine(config)?;
    let repl = Repl::new(&engine, session_id, config.agent.exit_keywords.clone());

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    repl.run(stdin, &mut stdout)
        .await
        .context("Chat loop failed")?;
    Ok(())
}

/// Send a single message and print the outcome
///
/// A failed turn is printed like in the chat loop and is not a process error.
pub async fn handle_ask(config: &Config, session_id: &str, message: &str) -> Result<()> {
    let engine = build_engine(config)?;
    let result = engine.respond(session_id, message).await;

    let mut stdout = std::io::stdout();
    write_turn_result(&mut stdout, &result)?;
    stdout.flush()?;
    Ok(())
}

/// Print the effective configuration as TOML
pub fn handle_config_show<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    let toml = config.to_toml_string()?;
    out.write_all(toml.as_bytes())?;
    Ok(())
}

/// Print the configuration file path in use
pub fn handle_config_path<W: Write>(path: &Path, out: &mut W) -> Result<()> {
    writeln!(out, "{}", path.display())?;
    Ok(())
}
