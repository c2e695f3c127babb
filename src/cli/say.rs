//! TUI-less "say" and "history" commands

use std::error::Error;
use std::io::Write;

use tracing::warn;

use crate::api::{ApiError, ChatBackend, ConversationId};
use crate::core::session::SessionManager;

/// Message returned when a command needs a session and none is stored.
pub const NOT_LOGGED_IN: &str = "Not logged in. Run 'minimind-chat login' first.";

fn require_token(sessions: &SessionManager) -> Result<String, Box<dyn Error>> {
    sessions.token()?.ok_or_else(|| NOT_LOGGED_IN.into())
}

/// A rejected token is cleared so the next command asks for a fresh login.
fn handle_api_error(sessions: &SessionManager, err: ApiError) -> Box<dyn Error> {
    if err.is_unauthorized() {
        if let Err(clear_err) = sessions.logout() {
            warn!(error = %clear_err, "failed to clear rejected session");
        }
        return format!("Session expired ({err}). Run 'minimind-chat login' again.").into();
    }
    err.into()
}

pub async fn run_say(
    backend: &dyn ChatBackend,
    sessions: &SessionManager,
    message: &[String],
    conversation: Option<&ConversationId>,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let message = message.join(" ");
    let message = message.trim();
    if message.is_empty() {
        return Err("Usage: minimind-chat say <message>".into());
    }

    let token = require_token(sessions)?;
    let response = backend
        .send_message(&token, message, conversation)
        .await
        .map_err(|err| handle_api_error(sessions, err))?;

    writeln!(out, "{}", response.reply)?;
    if let Some(id) = response.conversation_id {
        writeln!(out)?;
        writeln!(out, "conversation: {id}")?;
    }
    Ok(())
}

pub async fn run_history(
    backend: &dyn ChatBackend,
    sessions: &SessionManager,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let token = require_token(sessions)?;
    let history = backend
        .history(&token)
        .await
        .map_err(|err| handle_api_error(sessions, err))?;

    if history.is_empty() {
        writeln!(out, "No conversations yet")?;
        return Ok(());
    }

    let id_width = history
        .iter()
        .map(|entry| entry.id.to_string().len())
        .max()
        .unwrap_or(0);
    for entry in &history {
        match entry.display_created_at() {
            Some(created) => writeln!(
                out,
                "{:>id_width$}  {}  ({created})",
                entry.id.to_string(),
                entry.display_title()
            )?,
            None => writeln!(
                out,
                "{:>id_width$}  {}",
                entry.id.to_string(),
                entry.display_title()
            )?,
        }
    }
    Ok(())
}
