//! Credential lookup and secret scrubbing
//!
//! The provider API key is read from an environment variable at request
//! time, so a missing key surfaces as an authentication failure on the first
//! turn instead of aborting startup. A `.env` file, if present, is loaded into
//! the environment once at startup. Anything derived from provider responses
//! goes through [`scrub`] before it reaches logs or the terminal.

pub mod string;

pub use string::SecretString;

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Regex patterns for detecting common secret formats.
static SECRET_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// Initializes and returns the secret detection patterns.
///
/// Patterns match:
/// - OpenAI API keys: sk-[a-zA-Z0-9-_]{20,} (including sk-proj-)
/// - Bearer tokens: Bearer\s+[^\s]{20,}
fn get_secret_patterns() -> &'static Vec<Regex> {
    SECRET_PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"sk-[a-zA-Z0-9\-_]{20,}").expect("Invalid OpenAI pattern"),
            Regex::new(r"Bearer\s+[^\s]{20,}").expect("Invalid Bearer pattern"),
        ]
    })
}

/// Replace every detected secret in `text` with `[REDACTED]`.
///
/// # Examples
/// ```
/// use travel_agent::secrets::scrub;
///
/// let scrubbed = scrub("Incorrect API key provided: sk-1234567890abcdefghij");
/// assert_eq!(scrubbed, "Incorrect API key provided: [REDACTED]");
/// ```
pub fn scrub(text: &str) -> String {
    let mut result = text.to_string();
    for pattern in get_secret_patterns() {
        result = pattern.replace_all(&result, "[REDACTED]").to_string();
    }
    result
}

/// Load `.env` from the working directory or one of its parents.
///
/// Variables already present in the process environment are kept. Returns the
/// file that was loaded, or `None` when there is none.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Load a specific env file. Existing variables are kept.
pub fn load_dotenv_from(path: &Path) -> Result<(), dotenvy::Error> {
    dotenvy::from_path(path)
}

/// API key resolved from an environment variable on every lookup
#[derive(Debug, Clone)]
pub struct EnvApiKey {
    var_name: String,
}

impl EnvApiKey {
    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
        }
    }

    /// Name of the environment variable holding the key
    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    /// Read the key. Unset and blank values both count as missing.
    pub fn resolve(&self) -> Option<SecretString> {
        std::env::var(&self.var_name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(SecretString::new)
    }
}
