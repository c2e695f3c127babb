//! Single-line text field used by the auth form and the CLI prompts.
//!
//! Editing is pure state manipulation ([`LineEditorState::apply`]) so the
//! same field logic drives both the full-screen form and the raw-mode
//! prompt in [`prompt_line`].

use crate::utils::input::sanitize_text_input;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

const MASK_CHAR: char = '•';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskMode {
    #[default]
    None,
    Hidden,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditorState {
    pub text: String,
    /// Cursor position in chars, not bytes.
    pub cursor: usize,
    pub mask: MaskMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEditAction {
    Insert(char),
    Backspace,
    Delete,
    MoveLeft,
    MoveRight,
    MoveStart,
    MoveEnd,
    DeleteToEnd,
    DeleteWord,
    ClearAll,
    Paste(String),
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEditOutcome {
    Continue { redraw: bool },
    Submit(String),
    Cancelled,
}

impl LineEditorState {
    pub fn new(mask: MaskMode) -> Self {
        Self {
            mask,
            ..Self::default()
        }
    }

    pub fn masked() -> Self {
        Self::new(MaskMode::Hidden)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// What the field shows: the text, or one mask glyph per char.
    pub fn display_text(&self) -> String {
        match self.mask {
            MaskMode::None => self.text.clone(),
            MaskMode::Hidden => MASK_CHAR.to_string().repeat(self.text.chars().count()),
        }
    }

    /// Terminal columns between the start of the field and the cursor.
    pub fn cursor_column(&self) -> u16 {
        let prefix: String = self.display_text().chars().take(self.cursor).collect();
        UnicodeWidthStr::width(prefix.as_str()) as u16
    }

    pub fn apply(&mut self, action: LineEditAction) -> LineEditOutcome {
        let changed = match action {
            LineEditAction::Insert(c) => {
                let byte_idx = char_to_byte_index(&self.text, self.cursor);
                self.text.insert(byte_idx, c);
                self.cursor += 1;
                true
            }
            LineEditAction::Backspace => {
                if self.cursor == 0 {
                    false
                } else {
                    let end = char_to_byte_index(&self.text, self.cursor);
                    let start = char_to_byte_index(&self.text, self.cursor - 1);
                    self.text.replace_range(start..end, "");
                    self.cursor -= 1;
                    true
                }
            }
            LineEditAction::Delete => {
                let start = char_to_byte_index(&self.text, self.cursor);
                if start >= self.text.len() {
                    false
                } else {
                    let end = char_to_byte_index(&self.text, self.cursor + 1);
                    self.text.replace_range(start..end, "");
                    true
                }
            }
            LineEditAction::MoveLeft => {
                let moved = self.cursor > 0;
                self.cursor = self.cursor.saturating_sub(1);
                moved
            }
            LineEditAction::MoveRight => {
                let moved = self.cursor < self.text.chars().count();
                if moved {
                    self.cursor += 1;
                }
                moved
            }
            LineEditAction::MoveStart => std::mem::replace(&mut self.cursor, 0) != 0,
            LineEditAction::MoveEnd => {
                let end = self.text.chars().count();
                std::mem::replace(&mut self.cursor, end) != end
            }
            LineEditAction::DeleteToEnd => {
                let byte_idx = char_to_byte_index(&self.text, self.cursor);
                let changed = byte_idx < self.text.len();
                self.text.truncate(byte_idx);
                changed
            }
            LineEditAction::DeleteWord => {
                if self.cursor == 0 {
                    false
                } else {
                    self.delete_word_before_cursor();
                    true
                }
            }
            LineEditAction::ClearAll => {
                let changed = !self.text.is_empty();
                self.clear();
                changed
            }
            LineEditAction::Paste(text) => {
                let sanitized = sanitize_text_input(&text);
                let first_line = sanitized.split('\n').next().unwrap_or("");
                if !first_line.is_empty() {
                    let byte_idx = char_to_byte_index(&self.text, self.cursor);
                    self.text.insert_str(byte_idx, first_line);
                    self.cursor += first_line.chars().count();
                }
                if sanitized.contains('\n') {
                    return LineEditOutcome::Submit(self.text.clone());
                }
                !first_line.is_empty()
            }
            LineEditAction::Submit => return LineEditOutcome::Submit(self.text.clone()),
            LineEditAction::Cancel => return LineEditOutcome::Cancelled,
        };
        LineEditOutcome::Continue { redraw: changed }
    }

    fn delete_word_before_cursor(&mut self) {
        let mut chars: Vec<char> = self.text.chars().collect();
        let end = self.cursor.min(chars.len());
        let mut idx = end;
        while idx > 0 && chars[idx - 1] == ' ' {
            idx -= 1;
        }
        while idx > 0 && chars[idx - 1] != ' ' {
            idx -= 1;
        }
        chars.drain(idx..end);
        self.text = chars.into_iter().collect();
        self.cursor = idx;
    }
}

/// Map a key press to a field edit. Enter submits, Esc and Ctrl+C cancel.
/// Returns `None` for keys the field does not handle.
pub fn map_key_event_to_action(key: &KeyEvent) -> Option<LineEditAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Some(LineEditAction::Submit),
        KeyCode::Esc => Some(LineEditAction::Cancel),
        KeyCode::Backspace => Some(LineEditAction::Backspace),
        KeyCode::Delete => Some(LineEditAction::Delete),
        KeyCode::Left => Some(LineEditAction::MoveLeft),
        KeyCode::Right => Some(LineEditAction::MoveRight),
        KeyCode::Home => Some(LineEditAction::MoveStart),
        KeyCode::End => Some(LineEditAction::MoveEnd),
        KeyCode::Char('a') if ctrl => Some(LineEditAction::MoveStart),
        KeyCode::Char('e') if ctrl => Some(LineEditAction::MoveEnd),
        KeyCode::Char('k') if ctrl => Some(LineEditAction::DeleteToEnd),
        KeyCode::Char('w') if ctrl => Some(LineEditAction::DeleteWord),
        KeyCode::Char('u') if ctrl => Some(LineEditAction::ClearAll),
        KeyCode::Char('c') if ctrl => Some(LineEditAction::Cancel),
        KeyCode::Char(c) if !ctrl => Some(LineEditAction::Insert(c)),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct LineEditorError {
    message: String,
}

impl LineEditorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(CANCELLED_MESSAGE)
    }

    pub fn is_cancelled(&self) -> bool {
        self.message == CANCELLED_MESSAGE
    }
}

const CANCELLED_MESSAGE: &str = "Cancelled by user";

impl fmt::Display for LineEditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LineEditorError {}

fn io_err(err: io::Error) -> LineEditorError {
    LineEditorError::new(err.to_string())
}

/// Read one line from the terminal in raw mode, echoing through `mask`.
pub fn prompt_line(prompt: &str, mask: MaskMode) -> Result<String, LineEditorError> {
    enable_raw_mode().map_err(io_err)?;
    let mut stdout = io::stdout();
    execute!(stdout, event::EnableBracketedPaste).map_err(io_err)?;

    let result = read_until_submit(prompt, LineEditorState::new(mask));

    let disable_raw = disable_raw_mode().map_err(io_err);
    let disable_paste = execute!(stdout, event::DisableBracketedPaste).map_err(io_err);
    println!();

    let value = result?;
    disable_raw?;
    disable_paste?;
    Ok(value)
}

fn read_until_submit(
    prompt: &str,
    mut state: LineEditorState,
) -> Result<String, LineEditorError> {
    let mut needs_redraw = true;
    loop {
        if needs_redraw {
            redraw_line(prompt, &state).map_err(io_err)?;
            needs_redraw = false;
        }

        if !event::poll(Duration::from_millis(100)).map_err(io_err)? {
            continue;
        }

        let action = match event::read().map_err(io_err)? {
            Event::Key(key) if key.kind == KeyEventKind::Press => map_key_event_to_action(&key),
            Event::Paste(text) => Some(LineEditAction::Paste(text)),
            _ => None,
        };

        if let Some(action) = action {
            match state.apply(action) {
                LineEditOutcome::Continue { redraw } => needs_redraw = redraw,
                LineEditOutcome::Submit(value) => return Ok(value),
                LineEditOutcome::Cancelled => {
                    return Err(LineEditorError::cancelled());
                }
            }
        }
    }
}

fn redraw_line(prompt: &str, state: &LineEditorState) -> io::Result<()> {
    let prompt_width = UnicodeWidthStr::width(prompt) as u16;
    print!("\r\x1b[K{}{}", prompt, state.display_text());

    let cursor_columns = prompt_width + state.cursor_column();
    if cursor_columns > 0 {
        print!("\r\x1b[{}C", cursor_columns);
    } else {
        print!("\r");
    }

    io::stdout().flush()
}

fn char_to_byte_index(input: &str, char_index: usize) -> usize {
    input
        .char_indices()
        .nth(char_index)
        .map(|(idx, _)| idx)
        .unwrap_or(input.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> LineEditorState {
        let mut state = LineEditorState::default();
        for c in text.chars() {
            state.apply(LineEditAction::Insert(c));
        }
        state
    }

    #[test]
    fn insert_and_move_cursor() {
        let mut state = LineEditorState::default();
        assert_eq!(
            state.apply(LineEditAction::Insert('a')),
            LineEditOutcome::Continue { redraw: true }
        );
        state.apply(LineEditAction::MoveLeft);
        state.apply(LineEditAction::Insert('b'));
        assert_eq!(state.text, "ba");
        assert_eq!(state.cursor, 1);
    }

    #[test]
    fn backspace_handles_multibyte_chars() {
        let mut state = typed("héllo");
        state.apply(LineEditAction::MoveStart);
        state.apply(LineEditAction::MoveRight);
        state.apply(LineEditAction::MoveRight);
        state.apply(LineEditAction::Backspace);
        assert_eq!(state.text, "hllo");
        assert_eq!(state.cursor, 1);
    }

    #[test]
    fn noop_edits_do_not_request_redraw() {
        let mut state = LineEditorState::default();
        assert_eq!(
            state.apply(LineEditAction::Backspace),
            LineEditOutcome::Continue { redraw: false }
        );
        assert_eq!(
            state.apply(LineEditAction::MoveStart),
            LineEditOutcome::Continue { redraw: false }
        );
        assert_eq!(
            state.apply(LineEditAction::ClearAll),
            LineEditOutcome::Continue { redraw: false }
        );
    }

    #[test]
    fn ctrl_w_deletes_previous_word() {
        let mut state = typed("ada@example.com extra  ");
        state.apply(LineEditAction::DeleteWord);
        assert_eq!(state.text, "ada@example.com ");
        assert_eq!(state.cursor, 16);
    }

    #[test]
    fn delete_to_end_truncates() {
        let mut state = typed("hello world");
        state.cursor = 6;
        state.apply(LineEditAction::DeleteToEnd);
        assert_eq!(state.text, "hello ");
    }

    #[test]
    fn paste_with_newline_submits_first_line() {
        let mut state = LineEditorState::default();
        assert_eq!(
            state.apply(LineEditAction::Paste("secret\tpw\nignored".to_string())),
            LineEditOutcome::Submit("secret    pw".to_string())
        );
    }

    #[test]
    fn masked_fields_hide_text_but_track_cursor_width() {
        let mut state = LineEditorState::masked();
        for c in "pässword".chars() {
            state.apply(LineEditAction::Insert(c));
        }
        assert_eq!(state.display_text(), "••••••••");
        assert_eq!(state.cursor_column(), 8);
        assert_eq!(state.text, "pässword");
    }

    #[test]
    fn key_mapping() {
        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        let plain_x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        let shift_x = KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT);
        let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(map_key_event_to_action(&ctrl_u), Some(LineEditAction::ClearAll));
        assert_eq!(
            map_key_event_to_action(&plain_x),
            Some(LineEditAction::Insert('x'))
        );
        assert_eq!(
            map_key_event_to_action(&shift_x),
            Some(LineEditAction::Insert('X'))
        );
        assert_eq!(map_key_event_to_action(&tab), None);
    }

    #[test]
    fn cancelled_error_is_recognisable() {
        assert!(LineEditorError::cancelled().is_cancelled());
        assert!(!LineEditorError::new("io failure").is_cancelled());
    }
}
