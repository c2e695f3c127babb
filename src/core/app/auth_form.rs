use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::utils::line_editor::{map_key_event_to_action, LineEditAction, LineEditorState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthTab {
    #[default]
    Login,
    Register,
}

impl AuthTab {
    pub fn title(self) -> &'static str {
        match self {
            AuthTab::Login => "Login",
            AuthTab::Register => "Register",
        }
    }

    pub fn other(self) -> Self {
        match self {
            AuthTab::Login => AuthTab::Register,
            AuthTab::Register => AuthTab::Login,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Password,
    ConfirmPassword,
}

impl AuthField {
    pub fn label(self) -> &'static str {
        match self {
            AuthField::Email => "Email",
            AuthField::Password => "Password",
            AuthField::ConfirmPassword => "Confirm password",
        }
    }
}

const LOGIN_FIELDS: &[AuthField] = &[AuthField::Email, AuthField::Password];
const REGISTER_FIELDS: &[AuthField] = &[
    AuthField::Email,
    AuthField::Password,
    AuthField::ConfirmPassword,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSubmission {
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
        password: String,
        confirm_password: String,
    },
}

#[derive(Debug, Clone)]
struct FormFields {
    email: LineEditorState,
    password: LineEditorState,
    confirm_password: LineEditorState,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            email: LineEditorState::default(),
            password: LineEditorState::masked(),
            confirm_password: LineEditorState::masked(),
        }
    }
}

/// The login/register screen: two tabbed forms, only one visible at a time.
/// Each form keeps its own field values while hidden.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    tab: AuthTab,
    focus_index: usize,
    login: FormFields,
    register: FormFields,
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> AuthTab {
        self.tab
    }

    pub fn switch_tab(&mut self, tab: AuthTab) {
        if self.tab != tab {
            self.tab = tab;
            self.focus_index = 0;
        }
    }

    pub fn fields(&self) -> &'static [AuthField] {
        match self.tab {
            AuthTab::Login => LOGIN_FIELDS,
            AuthTab::Register => REGISTER_FIELDS,
        }
    }

    pub fn focused(&self) -> AuthField {
        self.fields()[self.focus_index.min(self.fields().len() - 1)]
    }

    pub fn field(&self, field: AuthField) -> &LineEditorState {
        let form = match self.tab {
            AuthTab::Login => &self.login,
            AuthTab::Register => &self.register,
        };
        match field {
            AuthField::Email => &form.email,
            AuthField::Password => &form.password,
            AuthField::ConfirmPassword => &form.confirm_password,
        }
    }

    fn field_mut(&mut self, field: AuthField) -> &mut LineEditorState {
        let form = match self.tab {
            AuthTab::Login => &mut self.login,
            AuthTab::Register => &mut self.register,
        };
        match field {
            AuthField::Email => &mut form.email,
            AuthField::Password => &mut form.password,
            AuthField::ConfirmPassword => &mut form.confirm_password,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus_index = (self.focus_index + 1) % self.fields().len();
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.focus_index = (self.focus_index + len - 1) % len;
    }

    /// The visible form's values, ready to hand to the login or register flow.
    pub fn submission(&self) -> AuthSubmission {
        let email = self.field(AuthField::Email).text.trim().to_string();
        let password = self.field(AuthField::Password).text.clone();
        match self.tab {
            AuthTab::Login => AuthSubmission::Login { email, password },
            AuthTab::Register => AuthSubmission::Register {
                email,
                password,
                confirm_password: self.field(AuthField::ConfirmPassword).text.clone(),
            },
        }
    }

    /// Ctrl+T switches tabs, Tab/arrows move between fields, Enter on the
    /// last field submits the visible form.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<AuthSubmission> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('t') if ctrl => self.switch_tab(self.tab.other()),
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Enter => {
                if self.focus_index + 1 >= self.fields().len() {
                    return Some(self.submission());
                }
                self.focus_next();
            }
            KeyCode::Esc => {}
            _ => {
                if let Some(action) = map_key_event_to_action(key) {
                    let focused = self.focused();
                    self.field_mut(focused).apply(action);
                }
            }
        }
        None
    }

    pub fn handle_paste(&mut self, text: &str) {
        let focused = self.focused();
        self.field_mut(focused)
            .apply(LineEditAction::Paste(text.replace(['\r', '\n'], "")));
    }
}
