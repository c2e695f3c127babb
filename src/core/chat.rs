use tracing::{debug, error};

use crate::api::{ApiError, ChatBackend, ConversationId, ConversationSummary};
use crate::core::message::Message;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input: nothing was sent or rendered.
    Ignored,
    Replied {
        /// The message opened a conversation that was not in the list yet.
        started_conversation: bool,
    },
    /// Shown to the user as an alert.
    Failed(String),
    /// The token was rejected; the session is no longer usable.
    Unauthorized(String),
}

/// State behind the chat screen: the transcript, the sidebar's conversation
/// list and the conversation new messages are sent to.
#[derive(Debug, Clone, Default)]
pub struct ChatPage {
    pub user_email: String,
    pub current_conversation: Option<ConversationId>,
    pub transcript: Vec<Message>,
    pub history: Vec<ConversationSummary>,
}

impl ChatPage {
    pub fn new(user_email: impl Into<String>) -> Self {
        Self {
            user_email: user_email.into(),
            ..Self::default()
        }
    }

    /// An empty transcript renders as the welcome banner.
    pub fn shows_welcome(&self) -> bool {
        self.transcript.is_empty()
    }

    /// Replace the conversation list. On failure the old list is kept and the
    /// error is logged; the caller only needs it to spot a rejected token.
    pub async fn load_history(
        &mut self,
        backend: &dyn ChatBackend,
        token: &str,
    ) -> Result<usize, ApiError> {
        match backend.history(token).await {
            Ok(history) => {
                debug!(count = history.len(), "history loaded");
                self.history = history;
                Ok(self.history.len())
            }
            Err(err) => {
                error!(error = %err, "failed to load conversation history");
                Err(err)
            }
        }
    }

    /// Trim the input and, if anything is left, append it to the transcript.
    /// Returns the text to send.
    pub fn begin_send(&mut self, input: &str) -> Option<String> {
        let message = input.trim();
        if message.is_empty() {
            return None;
        }
        self.transcript.push(Message::user(message));
        Some(message.to_string())
    }

    /// Send a message already placed by [`ChatPage::begin_send`] and render
    /// the reply.
    pub async fn complete_send(
        &mut self,
        backend: &dyn ChatBackend,
        token: &str,
        message: &str,
    ) -> SendOutcome {
        let previous = self.current_conversation.clone();
        match backend
            .send_message(token, message, previous.as_ref())
            .await
        {
            Ok(response) => {
                self.transcript.push(Message::bot(response.reply));
                self.current_conversation = response.conversation_id;
                let started_conversation = previous.is_none()
                    && self.current_conversation.as_ref().is_some_and(|id| {
                        !self.history.iter().any(|entry| &entry.id == id)
                    });
                SendOutcome::Replied {
                    started_conversation,
                }
            }
            Err(ApiError::Unauthorized(message)) => SendOutcome::Unauthorized(message),
            Err(err) => SendOutcome::Failed(format!("Failed to send message: {err}")),
        }
    }

    pub async fn send(
        &mut self,
        backend: &dyn ChatBackend,
        token: &str,
        input: &str,
    ) -> SendOutcome {
        match self.begin_send(input) {
            Some(message) => self.complete_send(backend, token, &message).await,
            None => SendOutcome::Ignored,
        }
    }

    /// Switch to an existing conversation. There is no endpoint for past
    /// messages, so the transcript starts empty.
    pub fn select_conversation(&mut self, id: ConversationId) {
        self.current_conversation = Some(id);
        self.transcript.clear();
    }

    pub fn new_chat(&mut self) {
        self.current_conversation = None;
        self.transcript.clear();
    }
}
