//! Wire types for the MiniMind chat server and the HTTP client that speaks it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod client;

#[cfg(test)]
mod tests;

pub use client::{ApiClient, ApiError, ChatBackend, DEFAULT_API_URL};

/// Shown in place of a conversation title the server left blank.
pub const NEW_CONVERSATION_TITLE: &str = "New conversation";

/// Server-assigned identifier grouping the messages of one conversation.
///
/// The reference server hands out integer row ids, but the client treats the
/// value as opaque and accepts strings as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConversationId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationId::Number(id) => write!(f, "{id}"),
            ConversationId::Text(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for ConversationId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("conversation id cannot be empty".to_string());
        }
        Ok(trimmed
            .parse::<i64>()
            .map(ConversationId::Number)
            .unwrap_or_else(|_| ConversationId::Text(trimmed.to_string())))
    }
}

#[derive(Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl LoginResponse {
    /// The issued token, if the server actually handed one out.
    pub fn issued_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }
}

/// Body of `POST /chat`. `conversation_id` is sent as `null` for a new
/// conversation rather than omitted.
#[derive(Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub conversation_id: Option<&'a ConversationId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(default)]
    pub conversation_id: Option<ConversationId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ConversationSummary {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title,
            _ => NEW_CONVERSATION_TITLE,
        }
    }

    /// `created_at` reformatted to minute precision when it parses as a
    /// SQLite-style or RFC 3339 timestamp; otherwise the raw value.
    pub fn display_created_at(&self) -> Option<String> {
        let raw = self.created_at.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Some(parsed.format("%Y-%m-%d %H:%M").to_string());
        }
        if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.format("%Y-%m-%d %H:%M").to_string());
        }
        Some(raw.to_string())
    }
}

/// Error payloads use `message` for auth failures and `error` for server faults.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .filter(|message| !message.trim().is_empty())
    }
}
