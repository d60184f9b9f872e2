//! Session Store
//!
//! Maps session identifiers to their conversation transcripts. Sessions are
//! created lazily on first reference, never expire and live as long as the
//! store itself. Each transcript sits behind its own async mutex so a turn in
//! progress on one session never blocks another session.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::debug;

use crate::llm::{Message, MessageRole};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

impl From<TurnRole> for MessageRole {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => MessageRole::User,
            TurnRole::Assistant => MessageRole::Assistant,
        }
    }
}

/// One role-tagged message of a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: TurnRole,
    content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> TurnRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        Message {
            role: turn.role.into(),
            content: turn.content.clone(),
        }
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No turn recorded yet
    New,
    /// At least one exchange recorded
    Active,
}

/// Ordered, append-only history of one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn at the end
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns in insertion order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn state(&self) -> SessionState {
        if self.turns.is_empty() {
            SessionState::New
        } else {
            SessionState::Active
        }
    }
}

/// Shared handle to one session's transcript
pub type TranscriptHandle = Arc<Mutex<Transcript>>;

/// Session identifier to transcript map
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, TranscriptHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the transcript registered under `session_id`, registering an
    /// empty one first if the identifier is unseen.
    ///
    /// Repeated calls with the same identifier return handles to the same
    /// transcript.
    pub fn get_or_create(&self, session_id: &str) -> TranscriptHandle {
        {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(handle) = sessions.get(session_id) {
                return Arc::clone(handle);
            }
        }

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let handle = sessions.entry(session_id.to_string()).or_insert_with(|| {
            debug!("Creating session '{}'", session_id);
            Arc::new(Mutex::new(Transcript::new()))
        });
        Arc::clone(handle)
    }

    /// Append a turn to the session, creating the session if needed
    pub async fn append(&self, session_id: &str, turn: Turn) {
        let handle = self.get_or_create(session_id);
        handle.lock().await.push(turn);
    }

    /// Snapshot of the session's transcript, creating the session if needed
    pub async fn transcript(&self, session_id: &str) -> Transcript {
        let handle = self.get_or_create(session_id);
        let transcript = handle.lock().await;
        transcript.clone()
    }

    /// Whether a session has been referenced before
    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(session_id)
    }

    /// Number of known sessions
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
