//! In-memory session registry for conversation history.
//!
//! Sessions are keyed by the `app:user:session` triple and shared across
//! agents through a single [`SessionService`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Default maximum number of messages in a session
pub const DEFAULT_MAX_MESSAGES: usize = 100;

/// Session registry errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("session already exists: {0}")]
    AlreadyExists(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Compose the registry key for a session
pub fn session_key(app_name: &str, user_id: &str, session_id: &str) -> String {
    format!("{}:{}:{}", app_name, user_id, session_id)
}

/// A conversation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session key (app:user:session)
    pub key: String,
    /// Messages in the session
    pub messages: Vec<Message>,
    /// Created at timestamp
    pub created_at: DateTime<Local>,
    /// Last updated timestamp
    pub updated_at: DateTime<Local>,
    /// Session metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Maximum number of messages before truncation
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

/// A message in the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role: user, assistant, system
    pub role: String,
    /// Message content
    pub content: String,
    /// Timestamp
    pub timestamp: DateTime<Local>,
    /// Additional metadata
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Session {
    /// Create a new session with default max_messages
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_max_messages(key, DEFAULT_MAX_MESSAGES)
    }

    /// Create a new session with specified max_messages
    pub fn with_max_messages(key: impl Into<String>, max_messages: usize) -> Self {
        let now = Local::now();
        Self {
            key: key.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            metadata: HashMap::new(),
            max_messages,
        }
    }

    /// Add a message to the session
    pub fn add_message(&mut self, role: impl Into<String>, content: impl Into<String>) {
        self.messages.push(Message {
            role: role.into(),
            content: content.into(),
            timestamp: Local::now(),
            extra: HashMap::new(),
        });
        self.updated_at = Local::now();

        // Enforce max messages limit
        self.enforce_max_messages();
    }

    /// Enforce max_messages limit by truncating oldest messages
    fn enforce_max_messages(&mut self) {
        if self.messages.len() > self.max_messages {
            let to_remove = self.messages.len() - self.max_messages;
            self.messages.drain(0..to_remove);
            debug!(
                "Session {} truncated to {} messages",
                self.key,
                self.messages.len()
            );
        }
    }

    /// Get message history for LLM context
    pub fn get_history(&self, max_messages: usize) -> Vec<resumeguide_provider::Message> {
        self.messages
            .iter()
            .skip(self.messages.len().saturating_sub(max_messages))
            .map(|m| resumeguide_provider::Message {
                role: m.role.clone(),
                content: Some(m.content.clone()),
                tool_calls: None,
                tool_call_id: None,
                name: None,
            })
            .collect()
    }

    /// Clear all messages
    pub fn clear(&mut self) {
        self.messages.clear();
        self.updated_at = Local::now();
    }

    /// Get the max messages limit
    pub fn max_messages(&self) -> usize {
        self.max_messages
    }
}

/// Shared registry of conversation sessions.
///
/// All agents resolve sessions through one instance of this service, so a
/// session created under one identity can never collide with another. Lookups
/// on unknown keys report [`SessionError::NotFound`] rather than creating
/// anything; callers decide when a missing session warrants a fresh one.
pub struct SessionService {
    sessions: RwLock<HashMap<String, Session>>,
    max_messages: usize,
}

impl SessionService {
    /// Create an empty registry with default max_messages
    pub fn new() -> Self {
        Self::with_max_messages(DEFAULT_MAX_MESSAGES)
    }

    /// Create an empty registry with specified max_messages
    pub fn with_max_messages(max_messages: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_messages,
        }
    }

    /// Create a session for the given identity
    pub async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Session> {
        let key = session_key(app_name, user_id, session_id);
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&key) {
            return Err(SessionError::AlreadyExists(key));
        }

        let session = Session::with_max_messages(&key, self.max_messages);
        sessions.insert(key.clone(), session.clone());
        debug!("created session {}", key);
        Ok(session)
    }

    /// Look up a session, returning a snapshot of its current state
    pub async fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Session> {
        let key = session_key(app_name, user_id, session_id);
        let sessions = self.sessions.read().await;
        sessions
            .get(&key)
            .cloned()
            .ok_or(SessionError::NotFound(key))
    }

    /// Append a message to an existing session
    pub async fn append_message(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        role: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<()> {
        let key = session_key(app_name, user_id, session_id);
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&key)
            .ok_or_else(|| SessionError::NotFound(key.clone()))?;
        session.add_message(role, content);
        Ok(())
    }

    /// Get message history for LLM context
    pub async fn get_history(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        max_messages: usize,
    ) -> Result<Vec<resumeguide_provider::Message>> {
        let key = session_key(app_name, user_id, session_id);
        let sessions = self.sessions.read().await;
        let session = sessions.get(&key).ok_or(SessionError::NotFound(key))?;
        Ok(session.get_history(max_messages))
    }

    /// Delete a session. Returns whether it existed.
    pub async fn delete_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> bool {
        let key = session_key(app_name, user_id, session_id);
        let removed = self.sessions.write().await.remove(&key).is_some();
        if removed {
            debug!("deleted session {}", key);
        }
        removed
    }

    /// List session ids for an app and user, sorted
    pub async fn list_sessions(&self, app_name: &str, user_id: &str) -> Vec<String> {
        let prefix = format!("{}:{}:", app_name, user_id);
        let sessions = self.sessions.read().await;
        let mut ids: Vec<String> = sessions
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix).map(|id| id.to_string()))
            .collect();
        ids.sort();
        ids
    }

    /// Number of sessions currently stored
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every session
    pub async fn clear_all(&self) {
        self.sessions.write().await.clear();
    }
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}
