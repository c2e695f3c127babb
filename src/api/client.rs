use std::error::Error;
use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{
    ChatRequest, ChatResponse, ConversationId, ConversationSummary, Credentials, ErrorBody,
    LoginResponse, RegisterResponse,
};
use crate::utils::url::{construct_api_url, normalize_base_url};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

const CONNECT_TIMEOUT_SECONDS: u64 = 10;
const MISSING_TOKEN_MESSAGE: &str = "Authentication required";

/// Failures surfaced by [`ChatBackend`] calls.
#[derive(Debug)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    Transport(reqwest::Error),
    /// The server answered but the body was not the JSON we expected.
    Decode {
        endpoint: &'static str,
        source: serde_json::Error,
    },
    /// The bearer token was missing, expired or rejected.
    Unauthorized(String),
    /// Any other non-success status.
    Status { status: StatusCode, message: String },
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(err) => write!(f, "{err}"),
            ApiError::Decode { endpoint, source } => {
                write!(f, "Unexpected response from /{endpoint}: {source}")
            }
            ApiError::Unauthorized(message) => write!(f, "{message}"),
            ApiError::Status { status, message } => {
                write!(f, "Server returned {status}: {message}")
            }
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            ApiError::Decode { source, .. } => Some(source),
            ApiError::Unauthorized(_) | ApiError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err)
    }
}

/// The four calls the front end makes against the chat server.
///
/// Authenticated calls take the bearer token explicitly; where it is stored
/// is the session layer's concern.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    async fn register(&self, email: &str, password: &str) -> Result<RegisterResponse, ApiError>;

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    async fn send_message(
        &self,
        token: &str,
        message: &str,
        conversation_id: Option<&ConversationId>,
    ) -> Result<ChatResponse, ApiError>;

    async fn history(&self, token: &str) -> Result<Vec<ConversationSummary>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECONDS))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }

    /// Decode the body whatever the status. Register and login report
    /// failures in-band (`401 {"message": ...}`), so the status is ignored.
    async fn decode_any_status<T: DeserializeOwned>(
        endpoint: &'static str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(endpoint, %status, bytes = bytes.len(), "response received");
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode { endpoint, source })
    }

    async fn decode_success<T: DeserializeOwned>(
        endpoint: &'static str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(endpoint, %status, bytes = bytes.len(), "response received");

        if status.is_success() {
            return serde_json::from_slice(&bytes)
                .map_err(|source| ApiError::Decode { endpoint, source });
        }

        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| {
                let text = String::from_utf8_lossy(&bytes).trim().to_string();
                if text.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                } else {
                    text
                }
            });

        if status == StatusCode::UNAUTHORIZED {
            Err(ApiError::Unauthorized(message))
        } else {
            Err(ApiError::Status { status, message })
        }
    }
}

#[async_trait::async_trait]
impl ChatBackend for ApiClient {
    async fn register(&self, email: &str, password: &str) -> Result<RegisterResponse, ApiError> {
        let url = construct_api_url(&self.base_url, "register");
        debug!(%url, email, "register");
        let response = self
            .client
            .post(url)
            .json(&Credentials { email, password })
            .send()
            .await?;
        Self::decode_any_status("register", response).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = construct_api_url(&self.base_url, "login");
        debug!(%url, email, "login");
        let response = self
            .client
            .post(url)
            .json(&Credentials { email, password })
            .send()
            .await?;
        Self::decode_any_status("login", response).await
    }

    async fn send_message(
        &self,
        token: &str,
        message: &str,
        conversation_id: Option<&ConversationId>,
    ) -> Result<ChatResponse, ApiError> {
        if token.is_empty() {
            return Err(ApiError::Unauthorized(MISSING_TOKEN_MESSAGE.to_string()));
        }
        let url = construct_api_url(&self.base_url, "chat");
        debug!(%url, conversation = ?conversation_id, chars = message.chars().count(), "chat");
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&ChatRequest {
                message,
                conversation_id,
            })
            .send()
            .await?;
        Self::decode_success("chat", response).await
    }

    async fn history(&self, token: &str) -> Result<Vec<ConversationSummary>, ApiError> {
        if token.is_empty() {
            return Err(ApiError::Unauthorized(MISSING_TOKEN_MESSAGE.to_string()));
        }
        let url = construct_api_url(&self.base_url, "history");
        debug!(%url, "history");
        let response = self.client.get(url).bearer_auth(token).send().await?;
        Self::decode_success("history", response).await
    }
}
