//! Error types and handling
//!
//! Startup errors (configuration, I/O) live in [`EngineError`]. Per-turn
//! errors are [`crate::conversation::ConversationError`] and wrap the provider
//! errors from [`crate::llm::LLMError`]. Every error exposed to the terminal
//! implements [`AgentErrorExt`], which supplies the hint line printed under
//! `Erro: ...`.

use thiserror::Error;

/// Extension trait for user-facing error details
pub trait AgentErrorExt {
    /// Returns a short, user-friendly hint for the error
    ///
    /// The hint never contains secrets or raw provider payloads.
    fn user_hint(&self) -> &str;
}

/// Engine startup error type
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Verifique o arquivo config.toml",
            Self::Io(_) => "Falha de leitura ou escrita no terminal ou no sistema de arquivos",
        }
    }
}
