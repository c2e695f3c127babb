use std::collections::VecDeque;
use std::sync::Mutex;

use reqwest::StatusCode;

use crate::api::{
    ApiError, ChatBackend, ChatResponse, ConversationId, ConversationSummary, LoginResponse,
    RegisterResponse,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Register {
        email: String,
    },
    Login {
        email: String,
    },
    Chat {
        token: String,
        message: String,
        conversation_id: Option<ConversationId>,
    },
    History {
        token: String,
    },
}

/// In-memory stand-in for the chat server that records every call.
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<BackendCall>>,
    login_token: Option<String>,
    login_rejection: Option<String>,
    register_rejection: Option<String>,
    failure: Option<String>,
    unauthorized: Option<String>,
    history_failure: Option<String>,
    replies: Mutex<VecDeque<ChatResponse>>,
    history: Vec<ConversationSummary>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login_token(mut self, token: &str) -> Self {
        self.login_token = Some(token.to_string());
        self
    }

    pub fn with_login_rejection(mut self, message: &str) -> Self {
        self.login_rejection = Some(message.to_string());
        self
    }

    pub fn with_register_rejection(mut self, message: &str) -> Self {
        self.register_rejection = Some(message.to_string());
        self
    }

    /// Every call fails as if the server were unreachable.
    pub fn failing_with(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Authenticated calls answer 401.
    pub fn rejecting_token(mut self, message: &str) -> Self {
        self.unauthorized = Some(message.to_string());
        self
    }

    pub fn with_history_failure(mut self, message: &str) -> Self {
        self.history_failure = Some(message.to_string());
        self
    }

    pub fn with_reply(self, reply: &str, conversation_id: Option<ConversationId>) -> Self {
        self.replies
            .lock()
            .expect("replies lock")
            .push_back(ChatResponse {
                reply: reply.to_string(),
                conversation_id,
            });
        self
    }

    pub fn with_history(mut self, entries: &[(i64, Option<&str>)]) -> Self {
        self.history = entries
            .iter()
            .map(|(id, title)| ConversationSummary {
                id: ConversationId::Number(*id),
                title: title.map(str::to_string),
                created_at: None,
            })
            .collect();
        self
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn history_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, BackendCall::History { .. }))
            .count()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn check_failure(&self) -> Result<(), ApiError> {
        match &self.failure {
            Some(message) => Err(ApiError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn check_token(&self) -> Result<(), ApiError> {
        self.check_failure()?;
        match &self.unauthorized {
            Some(message) => Err(ApiError::Unauthorized(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ChatBackend for FakeBackend {
    async fn register(&self, email: &str, _password: &str) -> Result<RegisterResponse, ApiError> {
        self.record(BackendCall::Register {
            email: email.to_string(),
        });
        self.check_failure()?;
        Ok(match &self.register_rejection {
            Some(message) => RegisterResponse {
                success: false,
                message: Some(message.clone()),
            },
            None => RegisterResponse {
                success: true,
                message: None,
            },
        })
    }

    async fn login(&self, email: &str, _password: &str) -> Result<LoginResponse, ApiError> {
        self.record(BackendCall::Login {
            email: email.to_string(),
        });
        self.check_failure()?;
        Ok(LoginResponse {
            token: self.login_token.clone(),
            message: self.login_rejection.clone(),
        })
    }

    async fn send_message(
        &self,
        token: &str,
        message: &str,
        conversation_id: Option<&ConversationId>,
    ) -> Result<ChatResponse, ApiError> {
        self.record(BackendCall::Chat {
            token: token.to_string(),
            message: message.to_string(),
            conversation_id: conversation_id.cloned(),
        });
        self.check_token()?;
        let queued = self.replies.lock().expect("replies lock").pop_front();
        Ok(queued.unwrap_or_else(|| ChatResponse {
            reply: format!("echo: {message}"),
            conversation_id: Some(
                conversation_id
                    .cloned()
                    .unwrap_or(ConversationId::Number(1)),
            ),
        }))
    }

    async fn history(&self, token: &str) -> Result<Vec<ConversationSummary>, ApiError> {
        self.record(BackendCall::History {
            token: token.to_string(),
        });
        self.check_token()?;
        if let Some(message) = &self.history_failure {
            return Err(ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: message.clone(),
            });
        }
        Ok(self.history.clone())
    }
}
