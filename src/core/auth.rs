//! Login and registration flows shared by the auth screen and the CLI.
//!
//! Both flows fold every failure into an outcome carrying the message to
//! show the user, so callers only decide how to display it.

use tracing::{debug, warn};

use crate::api::ChatBackend;
use crate::core::session::{Session, SessionManager};

pub const PASSWORD_MISMATCH_MESSAGE: &str = "Passwords do not match";
pub const REGISTERED_MESSAGE: &str = "Registration succeeded, please log in";

const NO_REASON: &str = "no reason given";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A token was issued and stored.
    Authenticated(Session),
    /// Nothing was stored; the message is for the user.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    Failed(String),
}

impl RegisterOutcome {
    pub fn message(&self) -> &str {
        match self {
            RegisterOutcome::Registered => REGISTERED_MESSAGE,
            RegisterOutcome::Failed(message) => message,
        }
    }
}

pub async fn login(
    backend: &dyn ChatBackend,
    sessions: &SessionManager,
    email: &str,
    password: &str,
) -> LoginOutcome {
    let response = match backend.login(email, password).await {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "login request failed");
            return LoginOutcome::Failed(format!("Login error: {err}"));
        }
    };

    let Some(token) = response.issued_token() else {
        debug!(email, "login rejected");
        let reason = response.message.as_deref().unwrap_or(NO_REASON);
        return LoginOutcome::Failed(format!("Login failed: {reason}"));
    };

    if let Err(err) = sessions.establish(token, email) {
        return LoginOutcome::Failed(format!("Login error: {err}"));
    }

    LoginOutcome::Authenticated(Session {
        token: token.to_string(),
        user_email: email.to_string(),
    })
}

/// Register a new account. Mismatched passwords are rejected before any
/// request is made.
pub async fn register(
    backend: &dyn ChatBackend,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> RegisterOutcome {
    if password != confirm_password {
        return RegisterOutcome::Failed(PASSWORD_MISMATCH_MESSAGE.to_string());
    }

    match backend.register(email, password).await {
        Ok(response) if response.success => RegisterOutcome::Registered,
        Ok(response) => {
            let reason = response.message.as_deref().unwrap_or(NO_REASON);
            RegisterOutcome::Failed(format!("Registration failed: {reason}"))
        }
        Err(err) => {
            warn!(error = %err, "register request failed");
            RegisterOutcome::Failed(format!("Registration error: {err}"))
        }
    }
}
