//! OpenAI Chat Completions provider
//!
//! Sends the assembled conversation to `POST {base_url}/chat/completions`
//! and returns the content of the first choice. Works with any
//! OpenAI-compatible endpoint, which is how the integration tests point it at
//! a mock server.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{GenerationParams, LLMError, LLMProvider, Message, Result};
use crate::config::OpenAIConfig;
use crate::secrets::{scrub, EnvApiKey};

/// OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    /// Base URL without the trailing endpoint (e.g., "https://api.openai.com/v1")
    base_url: String,

    /// Where the API key is read from on each request
    api_key: EnvApiKey,

    /// HTTP client for API requests
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    ///
    /// # Arguments
    /// * `base_url` - API base URL (e.g., "https://api.openai.com/v1")
    /// * `api_key` - Environment-backed API key
    /// * `timeout` - Whole-request timeout for the HTTP client
    pub fn new(
        base_url: impl Into<String>,
        api_key: EnvApiKey,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                LLMError::ProviderUnavailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    /// Create a provider from the `[llm.openai]` config section
    pub fn from_config(config: &OpenAIConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            EnvApiKey::new(config.api_key_env.clone()),
            config.request_timeout(),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Map a non-success HTTP status to an error, keeping the API's own message if present
    fn error_for_status(status: StatusCode, body: &str) -> LLMError {
        let detail = serde_json::from_str::<ApiErrorBody>(body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| body.to_string());
        let detail = scrub(&detail);

        match status.as_u16() {
            401 | 403 => LLMError::AuthenticationFailed(detail),
            429 => LLMError::RateLimitExceeded,
            500..=599 => LLMError::ProviderUnavailable(format!("HTTP {}: {}", status, detail)),
            _ => LLMError::InvalidRequest(format!("HTTP {}: {}", status, detail)),
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, messages: &[Message], params: &GenerationParams) -> Result<String> {
        let api_key = self.api_key.resolve().ok_or_else(|| {
            LLMError::AuthenticationFailed(format!(
                "environment variable {} is not set",
                self.api_key.var_name()
            ))
        })?;

        let payload = ChatCompletionRequest {
            model: &params.model,
            messages,
            temperature: params.temperature,
        };

        debug!(
            "Sending {} messages to {} (model {})",
            messages.len(),
            self.endpoint(),
            params.model
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key.unsecure())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else {
                    LLMError::NetworkError(scrub(&e.to_string()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Self::error_for_status(status, &text));
        }

        let data: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let content = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::ParseError("No choices in response".to_string()))?
            .message
            .content
            .ok_or_else(|| LLMError::ParseError("Empty content".to_string()))?;

        debug!("Received reply of {} bytes", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: &str) -> OpenAIProvider {
        OpenAIProvider::new(
            base_url,
            EnvApiKey::new("TRAVEL_AGENT_UNIT_TEST_KEY"),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_provider_properties() {
        let p = provider("https://api.openai.com/v1/");
        assert_eq!(p.name(), "openai");
        assert_eq!(p.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![Message::system("persona"), Message::user("Oi")];
        let payload = ChatCompletionRequest {
            model: "gpt-3.5-turbo",
            messages: &messages,
            temperature: 0.7,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    {"role": "system", "content": "persona"},
                    {"role": "user", "content": "Oi"}
                ],
                "temperature": 0.7
            })
        );
    }

    #[test]
    fn test_status_mapping() {
        let body =
            r#"{"error": {"message": "Incorrect API key provided: sk-abcdefghijklmnopqrstuvwxyz"}}"#;
        match OpenAIProvider::error_for_status(StatusCode::UNAUTHORIZED, body) {
            LLMError::AuthenticationFailed(msg) => {
                assert_eq!(msg, "Incorrect API key provided: [REDACTED]");
            }
            other => panic!("Expected AuthenticationFailed, got {:?}", other),
        }

        assert_eq!(
            OpenAIProvider::error_for_status(StatusCode::TOO_MANY_REQUESTS, ""),
            LLMError::RateLimitExceeded
        );
        assert!(matches!(
            OpenAIProvider::error_for_status(StatusCode::BAD_GATEWAY, "upstream"),
            LLMError::ProviderUnavailable(_)
        ));
        assert!(matches!(
            OpenAIProvider::error_for_status(StatusCode::BAD_REQUEST, "not json"),
            LLMError::InvalidRequest(msg) if msg.contains("not json")
        ));
    }

    #[tokio::test]
    async fn test_missing_key_is_auth_failure() {
        let p = OpenAIProvider::new(
            "http://127.0.0.1:9",
            EnvApiKey::new("TRAVEL_AGENT_KEY_NEVER_SET"),
            Duration::from_secs(1),
        )
        .unwrap();

        let err = p
            .complete(
                &[Message::user("Oi")],
                &GenerationParams::new("gpt-3.5-turbo", 0.7),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LLMError::AuthenticationFailed(msg) if msg.contains("TRAVEL_AGENT_KEY_NEVER_SET")
        ));
    }
}
