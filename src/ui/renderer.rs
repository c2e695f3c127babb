use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::app::{App, AuthForm, AuthTab, ChatFocus, ChatScreen, Page};
use crate::core::chat::ChatPage;
use crate::ui::theme::Theme;

pub const WELCOME_TITLE: &str = "MiniMind Chat";
pub const WELCOME_SUBTITLE: &str = "Start a new conversation!";

const SIDEBAR_WIDTH: u16 = 30;
const AUTH_FORM_WIDTH: u16 = 56;
const ALERT_WIDTH: u16 = 60;
const MAX_INPUT_LINES: u16 = 6;

pub fn ui(f: &mut Frame, app: &App) {
    match &app.page {
        Page::Auth(form) => render_auth(f, f.area(), form, app),
        Page::Chat(screen) => render_chat(f, f.area(), screen, app),
    }

    if let Some(message) = &app.alert {
        render_alert(f, message, &app.theme);
    }
}

fn render_auth(f: &mut Frame, area: Rect, form: &AuthForm, app: &App) {
    let theme = &app.theme;
    let fields = form.fields();
    // Tabs, one bordered box per field, a blank row and the hint line.
    let height = 2 + 1 + fields.len() as u16 * 3 + 1 + 1 + 2;
    let outer = centered_rect(AUTH_FORM_WIDTH, height, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style)
        .title(Span::styled(
            format!(" {WELCOME_TITLE} "),
            theme.welcome_title_style,
        ));
    let inner = block.inner(outer);
    f.render_widget(Clear, outer);
    f.render_widget(block, outer);

    let mut constraints = vec![Constraint::Length(2)];
    constraints.extend(fields.iter().map(|_| Constraint::Length(3)));
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let selected = match form.tab() {
        AuthTab::Login => 0,
        AuthTab::Register => 1,
    };
    let tabs = Tabs::new([AuthTab::Login.title(), AuthTab::Register.title()])
        .select(selected)
        .style(theme.tab_inactive_style)
        .highlight_style(theme.tab_active_style)
        .divider(" ");
    f.render_widget(tabs, rows[0]);

    let focused = form.focused();
    for (index, field) in fields.iter().enumerate() {
        let rect = rows[index + 1];
        let state = form.field(*field);
        let is_focused = *field == focused;
        let border = if is_focused {
            theme.focused_border_style
        } else {
            theme.border_style
        };
        let input = Paragraph::new(state.display_text())
            .style(theme.input_text_style)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(Span::styled(field.label(), theme.field_label_style)),
            );
        f.render_widget(input, rect);

        if is_focused && app.alert.is_none() && app.busy.is_none() {
            let max_x = rect.width.saturating_sub(2);
            let x = rect.x + 1 + state.cursor_column().min(max_x.saturating_sub(1));
            f.set_cursor_position((x, rect.y + 1));
        }
    }

    let status = match app.busy {
        Some(label) => Line::from(Span::styled(label, theme.busy_style)),
        None => Line::from(Span::styled(
            "Enter submit • Tab next field • Ctrl+T switch tab • Ctrl+C quit",
            theme.hint_style,
        )),
    };
    let status_row = rows[rows.len() - 1];
    f.render_widget(Paragraph::new(status).wrap(Wrap { trim: true }), status_row);
}

/// Regions of the chat page.
struct ChatAreas {
    sidebar: Rect,
    header: Rect,
    transcript: Rect,
    input: Rect,
    status: Rect,
}

fn chat_areas(area: Rect, screen: &ChatScreen) -> ChatAreas {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(area);

    let input_lines = (screen.textarea.lines().len() as u16).clamp(1, MAX_INPUT_LINES);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(input_lines + 2),
            Constraint::Length(1),
        ])
        .split(columns[1]);

    ChatAreas {
        sidebar: columns[0],
        header: rows[0],
        transcript: rows[1],
        input: rows[2],
        status: rows[3],
    }
}

fn transcript_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style)
}

/// How far the transcript can scroll up when the chat page fills `area`.
pub fn max_transcript_scroll(area: Rect, screen: &ChatScreen, theme: &Theme) -> u16 {
    if screen.page.shows_welcome() {
        return 0;
    }
    let inner = transcript_block(theme).inner(chat_areas(area, screen).transcript);
    let rows = transcript_rows(&screen.page, theme, inner.width);
    let total = rows.len().min(u16::MAX as usize) as u16;
    total.saturating_sub(inner.height)
}

fn render_chat(f: &mut Frame, area: Rect, screen: &ChatScreen, app: &App) {
    let areas = chat_areas(area, screen);
    render_history(f, areas.sidebar, screen, &app.theme);

    render_header(f, areas.header, &screen.page, app);
    render_transcript(f, areas.transcript, screen, &app.theme);

    let input_border = if screen.focus == ChatFocus::Input {
        app.theme.focused_border_style
    } else {
        app.theme.border_style
    };
    let mut textarea = screen.textarea.clone();
    textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(input_border)
            .title(Span::styled("Message", app.theme.title_style)),
    );
    f.render_widget(&textarea, areas.input);

    let status = match app.busy {
        Some(label) => Line::from(Span::styled(label, app.theme.busy_style)),
        None => Line::from(Span::styled(
            "Enter send • Alt+Enter newline • Tab history • Ctrl+N new chat • Ctrl+R refresh • Ctrl+L logout • Ctrl+C quit",
            app.theme.hint_style,
        )),
    };
    f.render_widget(Paragraph::new(status), areas.status);
}

fn render_header(f: &mut Frame, area: Rect, page: &ChatPage, app: &App) {
    let conversation = match &page.current_conversation {
        Some(id) => format!("conversation {id}"),
        None => "new conversation".to_string(),
    };
    let header = Line::from(vec![
        Span::styled(WELCOME_TITLE, app.theme.welcome_title_style),
        Span::styled(
            format!(" • {} • {} • {}", page.user_email, conversation, app.api_url),
            app.theme.title_style,
        ),
    ]);
    f.render_widget(Paragraph::new(header), area);
}

fn render_history(f: &mut Frame, area: Rect, screen: &ChatScreen, theme: &Theme) {
    let border = if screen.focus == ChatFocus::History {
        theme.focused_border_style
    } else {
        theme.border_style
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled("Conversations", theme.title_style));

    if screen.page.history.is_empty() {
        let empty = Paragraph::new(Span::styled("No conversations yet", theme.hint_style))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = screen
        .page
        .history
        .iter()
        .map(|entry| {
            let is_current = screen.page.current_conversation.as_ref() == Some(&entry.id);
            let style = if is_current {
                theme.history_current_style
            } else {
                theme.history_item_style
            };
            let mut lines = vec![Line::from(Span::styled(entry.display_title(), style))];
            if let Some(created) = entry.display_created_at() {
                lines.push(Line::from(Span::styled(created, theme.hint_style)));
            }
            ListItem::new(lines)
        })
        .collect();

    let mut state = ListState::default();
    if screen.focus == ChatFocus::History {
        state.select(Some(screen.history_cursor));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(theme.history_selected_style);
    f.render_stateful_widget(list, area, &mut state);
}

fn render_transcript(f: &mut Frame, area: Rect, screen: &ChatScreen, theme: &Theme) {
    let block = transcript_block(theme);
    let inner = block.inner(area);

    if screen.page.shows_welcome() {
        f.render_widget(block, area);
        let banner = vec![
            Line::from(Span::styled(WELCOME_TITLE, theme.welcome_title_style)),
            Line::from(""),
            Line::from(Span::styled(WELCOME_SUBTITLE, theme.welcome_text_style)),
        ];
        let top = inner.y + inner.height.saturating_sub(banner.len() as u16) / 2;
        let banner_area = Rect::new(inner.x, top, inner.width, inner.height.min(3));
        f.render_widget(
            Paragraph::new(banner).alignment(ratatui::layout::Alignment::Center),
            banner_area,
        );
        return;
    }

    // Rows are wrapped here so the scroll offset counts exactly what is drawn.
    let rows = transcript_rows(&screen.page, theme, inner.width);
    let total = rows.len().min(u16::MAX as usize) as u16;
    let max_offset = total.saturating_sub(inner.height);
    let offset = max_offset - screen.scroll_back.min(max_offset);

    let paragraph = Paragraph::new(rows).block(block).scroll((offset, 0));
    f.render_widget(paragraph, area);
}

/// Transcript as styled lines: a sender label, the message text, then a
/// blank separator.
pub fn transcript_lines(page: &ChatPage, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in &page.transcript {
        let (prefix_style, text_style) = if message.sender.is_user() {
            (theme.user_prefix_style, theme.user_text_style)
        } else {
            (theme.bot_prefix_style, theme.bot_text_style)
        };
        lines.push(Line::from(Span::styled(
            format!("{}:", message.sender.label()),
            prefix_style,
        )));
        for text_line in message.text.lines() {
            lines.push(Line::from(Span::styled(text_line.to_string(), text_style)));
        }
        lines.push(Line::from(""));
    }
    lines
}

/// Transcript lines wrapped to `width` columns, one entry per screen row.
pub fn transcript_rows(page: &ChatPage, theme: &Theme, width: u16) -> Vec<Line<'static>> {
    transcript_lines(page, theme)
        .iter()
        .flat_map(|line| wrap_line(line, width as usize))
        .collect()
}

/// Greedy word wrap that keeps span styles. Whitespace at a break is
/// dropped; words wider than `width` are split.
fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![line.clone()];
    }

    let mut rows: Vec<Vec<Span<'static>>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0usize;

    for span in &line.spans {
        let style = span.style;
        for token in split_words(span.content.as_ref()) {
            let token_width = UnicodeWidthStr::width(token);
            let is_space = token.chars().all(char::is_whitespace);

            if is_space {
                if current_width == 0 && !rows.is_empty() {
                    continue;
                }
                if current_width + token_width > width {
                    finish_row(&mut rows, &mut current);
                    current_width = 0;
                    continue;
                }
                push_styled(&mut current, token, style);
                current_width += token_width;
                continue;
            }

            if current_width + token_width > width && current_width > 0 {
                finish_row(&mut rows, &mut current);
                current_width = 0;
            }
            if token_width <= width {
                push_styled(&mut current, token, style);
                current_width += token_width;
                continue;
            }

            // Hard break a word that cannot fit on any row.
            let mut chunk = String::new();
            let mut chunk_width = 0usize;
            for ch in token.chars() {
                let cw = UnicodeWidthStr::width(ch.encode_utf8(&mut [0; 4]));
                if chunk_width + cw > width && !chunk.is_empty() {
                    push_styled(&mut current, &chunk, style);
                    finish_row(&mut rows, &mut current);
                    chunk.clear();
                    chunk_width = 0;
                }
                chunk.push(ch);
                chunk_width += cw;
            }
            push_styled(&mut current, &chunk, style);
            current_width = chunk_width;
        }
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows.into_iter().map(Line::from).collect()
}

/// Split into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (pos, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        if in_space.is_some_and(|prev| prev != space) {
            tokens.push(&text[start..pos]);
            start = pos;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// Close the current row at a wrap point, dropping trailing whitespace.
fn finish_row(rows: &mut Vec<Vec<Span<'static>>>, current: &mut Vec<Span<'static>>) {
    while let Some(last) = current.last_mut() {
        let kept = last.content.trim_end().len();
        if kept > 0 {
            last.content.to_mut().truncate(kept);
            break;
        }
        current.pop();
    }
    rows.push(std::mem::take(current));
}

fn push_styled(spans: &mut Vec<Span<'static>>, text: &str, style: Style) {
    match spans.last_mut() {
        Some(last) if last.style == style => last.content.to_mut().push_str(text),
        _ => spans.push(Span::styled(text.to_string(), style)),
    }
}

fn render_alert(f: &mut Frame, message: &str, theme: &Theme) {
    let area = f.area();
    let width = ALERT_WIDTH.min(area.width);
    let text_width = width.saturating_sub(4).max(1) as usize;
    let text_rows = UnicodeWidthStr::width(message).div_ceil(text_width).max(1) as u16;
    let popup = centered_rect(width, text_rows + 4, area);

    let body = vec![
        Line::from(Span::styled(message.to_string(), theme.alert_text_style)),
        Line::from(""),
        Line::from(Span::styled("[Enter] OK", theme.hint_style)),
    ];
    let paragraph = Paragraph::new(body).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.alert_border_style)
            .title(" Notice "),
    );
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
