//! Account commands that run without the full-screen UI: `login`,
//! `register`, `logout` and `status`.

use std::error::Error;
use std::io::Write;

use crate::api::ChatBackend;
use crate::core::auth::{self, LoginOutcome, RegisterOutcome};
use crate::core::config::SessionStorage;
use crate::core::session::SessionManager;
use crate::utils::line_editor::{prompt_line, LineEditorError, MaskMode};

/// Values a command would otherwise prompt for.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub confirm_password: Option<String>,
}

/// Read one prompted value. Esc or Ctrl+C yields `None`.
fn prompt(label: &str, mask: MaskMode) -> Result<Option<String>, LineEditorError> {
    cancelled_as_none(prompt_line(label, mask))
}

fn cancelled_as_none(
    result: Result<String, LineEditorError>,
) -> Result<Option<String>, LineEditorError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_cancelled() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Prompt for whatever was not given on the command line. Returns `None`
/// when the user cancels any prompt.
pub fn prompt_credentials(
    email: Option<String>,
    confirm: bool,
) -> Result<Option<Credentials>, LineEditorError> {
    let email = match email {
        Some(email) => email,
        None => match prompt("Email: ", MaskMode::None)? {
            Some(email) => email,
            None => return Ok(None),
        },
    };
    let Some(password) = prompt("Password: ", MaskMode::Hidden)? else {
        return Ok(None);
    };
    let confirm_password = if confirm {
        match prompt("Confirm password: ", MaskMode::Hidden)? {
            Some(value) => Some(value),
            None => return Ok(None),
        }
    } else {
        None
    };
    Ok(Some(Credentials {
        email: email.trim().to_string(),
        password,
        confirm_password,
    }))
}

pub async fn run_login(
    backend: &dyn ChatBackend,
    sessions: &SessionManager,
    credentials: &Credentials,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    match auth::login(backend, sessions, &credentials.email, &credentials.password).await {
        LoginOutcome::Authenticated(session) => {
            writeln!(out, "✅ Logged in as {}", session.user_email)?;
            Ok(())
        }
        LoginOutcome::Failed(message) => Err(message.into()),
    }
}

pub async fn run_register(
    backend: &dyn ChatBackend,
    credentials: &Credentials,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let confirm = credentials
        .confirm_password
        .as_deref()
        .unwrap_or(&credentials.password);
    match auth::register(backend, &credentials.email, &credentials.password, confirm).await {
        RegisterOutcome::Registered => {
            writeln!(out, "✅ {}", RegisterOutcome::Registered.message())?;
            Ok(())
        }
        RegisterOutcome::Failed(message) => Err(message.into()),
    }
}

pub fn run_logout(sessions: &SessionManager, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    let was_logged_in = sessions.is_authenticated()?;
    sessions.logout()?;
    if was_logged_in {
        writeln!(out, "✅ Logged out")?;
    } else {
        writeln!(out, "Not logged in")?;
    }
    Ok(())
}

pub fn run_status(
    sessions: &SessionManager,
    storage: SessionStorage,
    api_url: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    match sessions.current()? {
        Some(session) => writeln!(
            out,
            "Logged in as {} (session stored in {storage})",
            session.user_email
        )?,
        None => writeln!(out, "Not logged in")?,
    }
    writeln!(out, "Server: {api_url}")?;
    Ok(())
}
