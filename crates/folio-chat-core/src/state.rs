//! UI-agnostic chat state types
//!
//! Shared by every front end that renders a chat panel; nothing here depends
//! on a UI framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Where the panel sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unconfigured,
    Idle,
    Awaiting,
    /// Idle, but the last request failed. Still accepts input.
    Error,
}

impl SessionState {
    pub fn is_configured(&self) -> bool {
        !matches!(self, SessionState::Unconfigured)
    }
}

/// Hands out time-derived message ids that never repeat or go backwards,
/// even when several messages are created within the same millisecond.
#[derive(Debug, Default)]
pub struct MessageIds {
    last: u64,
}

impl MessageIds {
    pub fn next_at(&mut self, now: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        self.last = millis.max(self.last + 1);
        self.last
    }
}

impl ChatMessage {
    pub(crate) fn new(ids: &mut MessageIds, role: ChatRole, content: impl Into<String>) -> Self {
        let timestamp = Utc::now();
        Self {
            id: ids.next_at(timestamp),
            role,
            content: content.into(),
            timestamp,
        }
    }
}
