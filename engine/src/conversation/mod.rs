//! Conversation Engine
//!
//! Turns one user utterance into one provider call:
//!
//! 1. Reject blank input
//! 2. Lock the session's transcript (created on first use)
//! 3. Send `[system] ++ transcript ++ [user]` to the provider, under a timeout
//! 4. On success append the user turn and the reply, in that order
//!
//! A failed call leaves the transcript untouched, so the next turn resends
//! only exchanges that actually got a reply.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::errors::AgentErrorExt;
use crate::llm::{GenerationParams, LLMError, LLMProvider, Message};
use crate::session::{SessionStore, Transcript, Turn};

/// Default upper bound for a single provider call
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 60;

/// Errors from a single conversation turn
#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("a mensagem não pode estar vazia")]
    EmptyInput,

    #[error(transparent)]
    Provider(#[from] LLMError),
}

impl AgentErrorExt for ConversationError {
    fn user_hint(&self) -> &str {
        match self {
            Self::EmptyInput => "Digite uma pergunta sobre sua viagem",
            Self::Provider(e) => e.user_hint(),
        }
    }
}

/// Build the exact message list sent for a turn:
/// system instruction, every prior turn in order, then the new user text.
pub fn build_messages(
    system_instruction: &str,
    transcript: &Transcript,
    user_text: &str,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(transcript.len() + 2);
    messages.push(Message::system(system_instruction));
    messages.extend(transcript.turns().iter().map(Message::from));
    messages.push(Message::user(user_text));
    messages
}

/// Session-aware front end to an [`LLMProvider`]
pub struct ConversationEngine {
    provider: Arc<dyn LLMProvider>,
    store: Arc<SessionStore>,
    system_instruction: String,
    params: GenerationParams,
    provider_timeout: Duration,
}

impl ConversationEngine {
    /// Create a new engine
    ///
    /// # Arguments
    /// * `provider` - Completion provider
    /// * `store` - Session store shared with whoever else reads transcripts
    /// * `system_instruction` - Persona text prepended to every request
    /// * `params` - Model and temperature, fixed for the engine's lifetime
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        store: Arc<SessionStore>,
        system_instruction: impl Into<String>,
        params: GenerationParams,
    ) -> Self {
        Self {
            provider,
            store,
            system_instruction: system_instruction.into(),
            params,
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
        }
    }

    /// Override the provider call timeout
    pub fn with_timeout(mut self, provider_timeout: Duration) -> Self {
        self.provider_timeout = provider_timeout;
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Answer `user_text` within the conversation `session_id`
    ///
    /// Makes exactly one provider call, never retries. The session's lock is
    /// held for the whole turn, so concurrent turns on one session run one
    /// after the other while other sessions proceed independently.
    ///
    /// # Errors
    /// * [`ConversationError::EmptyInput`] - `user_text` is empty or whitespace
    /// * [`ConversationError::Provider`] - the provider failed or timed out
    pub async fn respond(
        &self,
        session_id: &str,
        user_text: &str,
    ) -> Result<String, ConversationError> {
        if user_text.trim().is_empty() {
            return Err(ConversationError::EmptyInput);
        }

        let handle = self.store.get_or_create(session_id);
        let mut transcript = handle.lock().await;

        let messages = build_messages(&self.system_instruction, &transcript, user_text);
        debug!(
            "Session '{}': sending {} messages ({} prior turns) to {}",
            session_id,
            messages.len(),
            transcript.len(),
            self.provider.name()
        );

        let start = Instant::now();
        let reply = match timeout(
            self.provider_timeout,
            self.provider.complete(&messages, &self.params),
        )
        .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                error!("Session '{}': provider call failed: {}", session_id, e);
                return Err(e.into());
            }
            Err(_) => {
                error!(
                    "Session '{}': provider call timed out after {:?}",
                    session_id, self.provider_timeout
                );
                return Err(LLMError::Timeout.into());
            }
        };

        transcript.push(Turn::user(user_text));
        transcript.push(Turn::assistant(reply.clone()));

        info!(
            "Session '{}': turn completed in {}ms, transcript has {} turns",
            session_id,
            start.elapsed().as_millis(),
            transcript.len()
        );

        Ok(reply)
    }
}
