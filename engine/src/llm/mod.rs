//! LLM Provider Abstraction Layer
//!
//! The conversation engine only ever needs one capability from a hosted
//! model: send an ordered list of role-tagged messages plus generation
//! parameters and get back the generated text. The [`LLMProvider`] trait
//! captures that contract so the engine can be driven by the OpenAI client in
//! production and by scripted providers in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AgentErrorExt;

pub mod openai;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl AgentErrorExt for LLMError {
    fn user_hint(&self) -> &str {
        match self {
            Self::AuthenticationFailed(_) => {
                "Verifique se sua chave da OpenAI está configurada no arquivo .env ou no ambiente"
            }
            Self::RateLimitExceeded => "Limite de uso da API atingido. Aguarde e tente novamente",
            Self::NetworkError(_) | Self::ProviderUnavailable(_) => {
                "Não foi possível contatar o provedor. Verifique sua conexão"
            }
            Self::Timeout => "O provedor demorou demais para responder. Tente novamente",
            Self::InvalidRequest(_) | Self::ParseError(_) => {
                "O provedor rejeitou a requisição. Verifique o modelo configurado"
            }
        }
    }
}

/// Message sent to the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role of the message sender (system, user, assistant)
    pub role: MessageRole,

    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction
    System,

    /// User message
    User,

    /// Assistant message
    Assistant,
}

/// Generation parameters held constant for every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Model identifier (e.g., "gpt-3.5-turbo")
    pub model: String,

    /// Sampling temperature, 0.0 (deterministic) to 2.0 (creative)
    pub temperature: f64,
}

impl GenerationParams {
    pub fn new(model: impl Into<String>, temperature: f64) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }
}

/// LLM Provider trait that all providers must implement
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the name of the provider (e.g., "openai")
    fn name(&self) -> &str;

    /// Generate a reply for the given conversation
    ///
    /// # Arguments
    /// * `messages` - System instruction, prior turns and the new user message, in order
    /// * `params` - Model and temperature for this request
    ///
    /// # Returns
    /// * `Ok(String)` - The generated reply text
    /// * `Err(LLMError)` - If the request fails
    async fn complete(&self, messages: &[Message], params: &GenerationParams) -> Result<String>;
}
