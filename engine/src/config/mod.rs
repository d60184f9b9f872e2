//! Configuration management
//!
//! This module handles loading, validation, and management of the agent
//! configuration. Configuration is stored in TOML format at
//! ~/.travel-agent/config.toml and is created with defaults on first run.
//!
//! # Configuration Sections
//!
//! - **core**: Log level
//! - **llm**: Provider selection and OpenAI connection/generation settings
//! - **agent**: Session identifier, persona (system prompt) and exit keywords
//!
//! The API key itself is never stored here. `llm.openai.api_key_env` names the
//! environment variable it is read from.
//!
//! # Examples
//!
//! ```no_run
//! use travel_agent::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Model: {}", config.llm.openai.model);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::EngineError;
use crate::llm::GenerationParams;

/// Persona sent as the system instruction when the config does not override it
pub const DEFAULT_SYSTEM_PROMPT: &str = "Você é um assistente especializado em turismo e viagens da agência 'Viagens dos Sonhos'. \n    \
\n    \
Suas responsabilidades:\n    \
- Ajudar clientes a planejar viagens\n    \
- Sugerir destinos baseado no perfil e orçamento\n    \
- Informar sobre documentação necessária\n    \
- Recomendar hotéis, restaurantes e atividades\n    \
- Fornecer dicas de viagem e informações sobre clima\n    \
- Ser sempre prestativo e entusiasmado sobre viagens\n    \
\n    \
Mantenha um tom amigável e profissional. Se não souber algo específico, seja honesto e sugira que o cliente entre em contato com a agência.";

/// Accepted values for `core.log_level` and `--log`
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Reject anything that is not one of [`LOG_LEVELS`]
pub fn validate_log_level(level: &str) -> Result<(), EngineError> {
    if LOG_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(EngineError::Config(format!(
            "Invalid log level '{}'. Must be one of: {}",
            level,
            LOG_LEVELS.join(", ")
        )))
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// LLM provider configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Conversation settings
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Provider used for completions (only "openai" is supported)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// OpenAI provider settings
    #[serde(default)]
    pub openai: OpenAIConfig,
}

/// OpenAI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// Base URL for the OpenAI-compatible API
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Sampling temperature (0.0-2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Conversation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Session identifier used by the interactive loop
    #[serde(default = "default_session_id")]
    pub session_id: String,

    /// System instruction prepended to every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Inputs that end the interactive loop (compared case-insensitively)
    #[serde(default = "default_exit_keywords")]
    pub exit_keywords: Vec<String>,
}

// Default value functions
fn default_log_level() -> String {
    "warn".to_string()
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_session_id() -> String {
    "user_session".to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_exit_keywords() -> Vec<String> {
    vec!["sair".to_string(), "exit".to_string(), "quit".to_string()]
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            openai: OpenAIConfig::default(),
        }
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            session_id: default_session_id(),
            system_prompt: default_system_prompt(),
            exit_keywords: default_exit_keywords(),
        }
    }
}

impl OpenAIConfig {
    /// Fixed generation parameters for every request
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams::new(self.model.clone(), self.temperature)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the default location (~/.travel-agent/config.toml)
    ///
    /// If the configuration file doesn't exist, writes a default one first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read or written
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Serialize the effective configuration
    pub fn to_toml_string(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Get the default configuration file path (~/.travel-agent/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".travel-agent").join("config.toml"))
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default();
        config.validate_and_process()?;

        fs::write(path, config.to_toml_string()?)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Wrote default configuration to {}", path.display());
        Ok(config)
    }

    /// Validate values and normalize exit keywords to lowercase
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        validate_log_level(&self.core.log_level)?;

        let valid_providers = ["openai"];
        if !valid_providers.contains(&self.llm.provider.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid provider '{}'. Must be one of: {}",
                self.llm.provider,
                valid_providers.join(", ")
            )));
        }

        let openai = &self.llm.openai;
        if !(0.0..=2.0).contains(&openai.temperature) {
            return Err(EngineError::Config(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if openai.timeout_secs == 0 {
            return Err(EngineError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        if openai.model.trim().is_empty() {
            return Err(EngineError::Config("model must not be empty".to_string()));
        }
        if openai.api_key_env.trim().is_empty() {
            return Err(EngineError::Config(
                "api_key_env must not be empty".to_string(),
            ));
        }

        if self.agent.session_id.trim().is_empty() {
            return Err(EngineError::Config(
                "session_id must not be empty".to_string(),
            ));
        }
        if self.agent.system_prompt.trim().is_empty() {
            return Err(EngineError::Config(
                "system_prompt must not be empty".to_string(),
            ));
        }

        self.agent.exit_keywords = self
            .agent
            .exit_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if self.agent.exit_keywords.is_empty() {
            return Err(EngineError::Config(
                "exit_keywords must contain at least one keyword".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default();

        assert_eq!(config.core.log_level, "warn");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.openai.model, "gpt-3.5-turbo");
        assert_eq!(config.llm.openai.temperature, 0.7);
        assert_eq!(config.llm.openai.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.agent.session_id, "user_session");
        assert_eq!(config.agent.exit_keywords, vec!["sair", "exit", "quit"]);
        assert!(config.agent.system_prompt.contains("Viagens dos Sonhos"));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.llm.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.openai.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_generation_params() {
        let params = Config::default().llm.openai.generation_params();
        assert_eq!(params, GenerationParams::new("gpt-3.5-turbo", 0.7));
    }

    #[test]
    fn test_default_prompt_layout() {
        assert!(DEFAULT_SYSTEM_PROMPT.starts_with(
            "Você é um assistente especializado em turismo e viagens da agência 'Viagens dos Sonhos'. \n    \n    Suas responsabilidades:\n"
        ));
        assert!(DEFAULT_SYSTEM_PROMPT.contains("\n    - Ajudar clientes a planejar viagens\n"));
        assert!(DEFAULT_SYSTEM_PROMPT
            .contains("viagens\n    \n    Mantenha um tom amigável e profissional."));
        assert!(DEFAULT_SYSTEM_PROMPT.ends_with("entre em contato com a agência."));
        assert_eq!(DEFAULT_SYSTEM_PROMPT.lines().count(), 11);
    }

    #[test]
    fn test_log_level_check() {
        for level in LOG_LEVELS {
            assert!(validate_log_level(level).is_ok());
        }
        assert!(validate_log_level("loud").is_err());
        assert!(validate_log_level("DEBUG").is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let err = Config::from_toml_str("[core]\nlog_level = \"loud\"\n").unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = Config::from_toml_str("[llm]\nprovider = \"ollama\"\n").unwrap_err();
        assert!(err.to_string().contains("Invalid provider"));
    }

    #[test]
    fn test_temperature_bounds() {
        assert!(Config::from_toml_str("[llm.openai]\ntemperature = 2.0\n").is_ok());
        assert!(Config::from_toml_str("[llm.openai]\ntemperature = 0.0\n").is_ok());
        assert!(Config::from_toml_str("[llm.openai]\ntemperature = 2.5\n").is_err());
        assert!(Config::from_toml_str("[llm.openai]\ntemperature = -0.1\n").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Config::from_toml_str("[llm.openai]\ntimeout_secs = 0\n").is_err());
    }

    #[test]
    fn test_exit_keywords_are_normalized() {
        let config =
            Config::from_toml_str("[agent]\nexit_keywords = [\" Tchau \", \"BYE\", \"\"]\n")
                .unwrap();
        assert_eq!(config.agent.exit_keywords, vec!["tchau", "bye"]);
    }

    #[test]
    fn test_empty_exit_keywords_rejected() {
        assert!(Config::from_toml_str("[agent]\nexit_keywords = []\n").is_err());
    }

    #[test]
    fn test_blank_session_and_prompt_rejected() {
        assert!(Config::from_toml_str("[agent]\nsession_id = \"  \"\n").is_err());
        assert!(Config::from_toml_str("[agent]\nsystem_prompt = \"\"\n").is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_string = config.to_toml_string().unwrap();

        let deserialized = Config::from_toml_str(&toml_string).unwrap();
        assert_eq!(config.core.log_level, deserialized.core.log_level);
        assert_eq!(config.llm.openai.model, deserialized.llm.openai.model);
        assert_eq!(config.agent.system_prompt, deserialized.agent.system_prompt);
    }
}
