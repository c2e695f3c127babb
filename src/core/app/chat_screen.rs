use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::{Input as TAInput, TextArea};

use crate::core::chat::ChatPage;
use crate::ui::theme::Theme;
use crate::utils::input::sanitize_text_input;

const SCROLL_STEP: u16 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatFocus {
    #[default]
    Input,
    History,
}

/// What a key press on the chat screen asks the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// The message was placed in the transcript and should now be sent.
    Send(String),
    RefreshHistory,
    Logout,
}

/// Terminal state wrapped around a [`ChatPage`]: the compose box, which pane
/// has focus, the sidebar cursor and the transcript scroll position.
pub struct ChatScreen {
    pub page: ChatPage,
    pub textarea: TextArea<'static>,
    pub focus: ChatFocus,
    pub history_cursor: usize,
    /// Lines scrolled up from the bottom of the transcript.
    pub scroll_back: u16,
    /// Largest useful `scroll_back` for the last drawn layout.
    max_scroll_back: u16,
}

impl ChatScreen {
    pub fn new(user_email: impl Into<String>, theme: &Theme) -> Self {
        let mut screen = Self {
            page: ChatPage::new(user_email),
            textarea: TextArea::default(),
            focus: ChatFocus::Input,
            history_cursor: 0,
            scroll_back: 0,
            max_scroll_back: 0,
        };
        screen.configure_textarea(theme);
        screen
    }

    pub fn configure_textarea(&mut self, theme: &Theme) {
        self.textarea.set_style(theme.input_text_style);
        self.textarea.set_cursor_style(theme.input_cursor_style);
        self.textarea
            .set_cursor_line_style(ratatui::style::Style::default());
    }

    pub fn input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    fn clear_input(&mut self, theme: &Theme) {
        self.textarea = TextArea::default();
        self.configure_textarea(theme);
    }

    /// Keep the sidebar cursor inside the list after it was reloaded.
    pub fn clamp_history_cursor(&mut self) {
        self.history_cursor = self
            .history_cursor
            .min(self.page.history.len().saturating_sub(1));
    }

    pub fn set_max_scroll_back(&mut self, max: u16) {
        self.max_scroll_back = max;
        self.scroll_back = self.scroll_back.min(max);
    }

    pub fn new_chat(&mut self) {
        self.page.new_chat();
        self.scroll_back = 0;
    }

    pub fn handle_key(&mut self, key: &KeyEvent, theme: &Theme) -> Option<ChatCommand> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    ChatFocus::Input if !self.page.history.is_empty() => ChatFocus::History,
                    _ => ChatFocus::Input,
                };
                self.clamp_history_cursor();
                None
            }
            KeyCode::Char('n') if ctrl => {
                self.new_chat();
                None
            }
            KeyCode::Char('r') if ctrl => Some(ChatCommand::RefreshHistory),
            KeyCode::Char('l') if ctrl => Some(ChatCommand::Logout),
            KeyCode::PageUp => {
                self.scroll_back = self
                    .scroll_back
                    .saturating_add(SCROLL_STEP)
                    .min(self.max_scroll_back);
                None
            }
            KeyCode::PageDown => {
                self.scroll_back = self.scroll_back.saturating_sub(SCROLL_STEP);
                None
            }
            _ => match self.focus {
                ChatFocus::History => {
                    self.handle_history_key(key);
                    None
                }
                ChatFocus::Input => self.handle_input_key(key, theme),
            },
        }
    }

    fn handle_history_key(&mut self, key: &KeyEvent) {
        match key.code {
            KeyCode::Up => self.history_cursor = self.history_cursor.saturating_sub(1),
            KeyCode::Down => {
                self.history_cursor += 1;
                self.clamp_history_cursor();
            }
            KeyCode::Enter => {
                if let Some(entry) = self.page.history.get(self.history_cursor) {
                    let id = entry.id.clone();
                    self.page.select_conversation(id);
                    self.scroll_back = 0;
                    self.focus = ChatFocus::Input;
                }
            }
            KeyCode::Esc => self.focus = ChatFocus::Input,
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: &KeyEvent, theme: &Theme) -> Option<ChatCommand> {
        let newline_modifier = key
            .modifiers
            .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);
        match key.code {
            KeyCode::Enter if newline_modifier => {
                self.textarea.insert_newline();
                None
            }
            KeyCode::Enter => {
                let message = self.page.begin_send(&self.input_text())?;
                self.clear_input(theme);
                self.scroll_back = 0;
                Some(ChatCommand::Send(message))
            }
            _ => {
                self.textarea.input(TAInput::from(*key));
                None
            }
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.focus == ChatFocus::Input {
            self.textarea.insert_str(sanitize_text_input(text));
        }
    }
}
