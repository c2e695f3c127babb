//! Page routing and action execution for the full-screen client.
//!
//! The app is always on one of two pages. The auth page holds the tabbed
//! login/register forms; the chat page is only reachable with a stored
//! token. Key handling is synchronous and returns an [`AppAction`] when a
//! network call is needed; the event loop redraws and then awaits
//! [`App::execute`], so one request is in flight at a time.

pub mod auth_form;
pub mod chat_screen;


use std::sync::Arc;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::api::ChatBackend;
use crate::core::auth::{self, LoginOutcome, RegisterOutcome};
use crate::core::chat::SendOutcome;
use crate::core::session::SessionManager;
use crate::ui::renderer::max_transcript_scroll;
use crate::ui::theme::Theme;

pub use auth_form::{AuthField, AuthForm, AuthSubmission, AuthTab};
pub use chat_screen::{ChatCommand, ChatFocus, ChatScreen};

pub enum Page {
    Auth(AuthForm),
    Chat(Box<ChatScreen>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
        password: String,
        confirm_password: String,
    },
    Send(String),
    LoadHistory,
    Logout,
}

impl AppAction {
    pub fn busy_label(&self) -> &'static str {
        match self {
            AppAction::Login { .. } => "Signing in…",
            AppAction::Register { .. } => "Creating account…",
            AppAction::Send(_) => "Waiting for reply…",
            AppAction::LoadHistory => "Loading conversations…",
            AppAction::Logout => "Signing out…",
        }
    }
}

impl From<AuthSubmission> for AppAction {
    fn from(submission: AuthSubmission) -> Self {
        match submission {
            AuthSubmission::Login { email, password } => AppAction::Login { email, password },
            AuthSubmission::Register {
                email,
                password,
                confirm_password,
            } => AppAction::Register {
                email,
                password,
                confirm_password,
            },
        }
    }
}

pub struct App {
    pub page: Page,
    /// A blocking notice; all other input waits until it is dismissed.
    pub alert: Option<String>,
    pub busy: Option<&'static str>,
    pub should_quit: bool,
    pub theme: Theme,
    pub api_url: String,
    backend: Arc<dyn ChatBackend>,
    sessions: SessionManager,
    /// Set by `new` when startup landed on the chat page.
    startup_action: Option<AppAction>,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>, sessions: SessionManager, api_url: String) -> Self {
        let mut app = Self {
            page: Page::Auth(AuthForm::new()),
            alert: None,
            busy: None,
            should_quit: false,
            theme: Theme::dark_default(),
            api_url,
            backend,
            sessions,
            startup_action: None,
        };
        app.startup_action = app.open_chat();
        app
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn is_on_chat_page(&self) -> bool {
        matches!(self.page, Page::Chat(_))
    }

    pub fn chat_screen(&self) -> Option<&ChatScreen> {
        match &self.page {
            Page::Chat(screen) => Some(screen),
            Page::Auth(_) => None,
        }
    }

    pub fn auth_form(&self) -> Option<&AuthForm> {
        match &self.page {
            Page::Auth(form) => Some(form),
            Page::Chat(_) => None,
        }
    }

    pub fn show_alert(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "alert");
        self.alert = Some(message);
    }

    /// Go to the chat page. Without a stored token this lands on the auth
    /// page instead. Returns the action to run on arrival.
    pub fn open_chat(&mut self) -> Option<AppAction> {
        match self.sessions.current() {
            Ok(Some(session)) => {
                self.page = Page::Chat(Box::new(ChatScreen::new(session.user_email, &self.theme)));
                Some(AppAction::LoadHistory)
            }
            Ok(None) => {
                self.show_auth_page();
                None
            }
            Err(err) => {
                self.show_auth_page();
                self.show_alert(format!("Could not read the saved session: {err}"));
                None
            }
        }
    }

    pub fn show_auth_page(&mut self) {
        self.page = Page::Auth(AuthForm::new());
    }

    /// What to run right after startup, before any key is pressed. Yields
    /// the action once.
    pub fn take_startup_action(&mut self) -> Option<AppAction> {
        self.startup_action.take()
    }

    /// Record the drawable area so the transcript cannot scroll past its top.
    pub fn fit_to_area(&mut self, area: Rect) {
        let theme = &self.theme;
        if let Page::Chat(screen) = &mut self.page {
            let max = max_transcript_scroll(area, screen, theme);
            screen.set_max_scroll_back(max);
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<AppAction> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.alert = None;
            }
            return None;
        }

        let theme = &self.theme;
        match &mut self.page {
            Page::Auth(form) => form.handle_key(key).map(AppAction::from),
            Page::Chat(screen) => match screen.handle_key(key, theme)? {
                ChatCommand::Send(message) => Some(AppAction::Send(message)),
                ChatCommand::RefreshHistory => Some(AppAction::LoadHistory),
                ChatCommand::Logout => Some(AppAction::Logout),
            },
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.alert.is_some() {
            return;
        }
        match &mut self.page {
            Page::Auth(form) => form.handle_paste(text),
            Page::Chat(screen) => screen.handle_paste(text),
        }
    }

    /// Run an action and whatever it leads to (a login loads the history, a
    /// message that opened a conversation reloads it).
    pub async fn execute(&mut self, action: AppAction) {
        let mut next = Some(action);
        while let Some(action) = next.take() {
            self.busy = Some(action.busy_label());
            next = self.run(action).await;
        }
        self.busy = None;
    }

    async fn run(&mut self, action: AppAction) -> Option<AppAction> {
        match action {
            AppAction::Login { email, password } => {
                let outcome =
                    auth::login(self.backend.as_ref(), &self.sessions, &email, &password).await;
                match outcome {
                    LoginOutcome::Authenticated(_) => {
                        info!(email, "logged in");
                        self.open_chat()
                    }
                    LoginOutcome::Failed(message) => {
                        self.show_alert(message);
                        None
                    }
                }
            }
            AppAction::Register {
                email,
                password,
                confirm_password,
            } => {
                let outcome =
                    auth::register(self.backend.as_ref(), &email, &password, &confirm_password)
                        .await;
                if outcome == RegisterOutcome::Registered {
                    info!(email, "registered");
                    self.show_auth_page();
                }
                self.show_alert(outcome.message());
                None
            }
            AppAction::Send(message) => {
                let token = self.require_token()?;
                let backend = Arc::clone(&self.backend);
                let Page::Chat(screen) = &mut self.page else {
                    return None;
                };
                match screen
                    .page
                    .complete_send(backend.as_ref(), &token, &message)
                    .await
                {
                    SendOutcome::Replied {
                        started_conversation,
                    } => started_conversation.then_some(AppAction::LoadHistory),
                    SendOutcome::Ignored => None,
                    SendOutcome::Failed(message) => {
                        self.show_alert(message);
                        None
                    }
                    SendOutcome::Unauthorized(message) => {
                        self.handle_unauthorized(&message);
                        None
                    }
                }
            }
            AppAction::LoadHistory => {
                let token = self.require_token()?;
                let backend = Arc::clone(&self.backend);
                let Page::Chat(screen) = &mut self.page else {
                    return None;
                };
                match screen.page.load_history(backend.as_ref(), &token).await {
                    Ok(_) => screen.clamp_history_cursor(),
                    Err(err) if err.is_unauthorized() => {
                        self.handle_unauthorized(&err.to_string())
                    }
                    Err(_) => {}
                }
                None
            }
            AppAction::Logout => {
                self.logout();
                None
            }
        }
    }

    pub fn logout(&mut self) {
        if let Err(err) = self.sessions.logout() {
            warn!(error = %err, "failed to clear session");
            self.show_alert(format!("Logout failed: {err}"));
            return;
        }
        self.show_auth_page();
    }

    /// The stored token, or a redirect to the auth page when there is none.
    fn require_token(&mut self) -> Option<String> {
        match self.sessions.token() {
            Ok(Some(token)) => Some(token),
            Ok(None) => {
                self.show_auth_page();
                None
            }
            Err(err) => {
                self.show_alert(format!("Could not read the saved session: {err}"));
                None
            }
        }
    }

    fn handle_unauthorized(&mut self, message: &str) {
        warn!(%message, "token rejected, returning to login");
        if let Err(err) = self.sessions.logout() {
            warn!(error = %err, "failed to clear rejected session");
        }
        self.show_auth_page();
        self.show_alert(format!("Session expired ({message}), please log in again"));
    }
}
