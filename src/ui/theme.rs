use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Transcript
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub bot_prefix_style: Style,
    pub bot_text_style: Style,
    pub welcome_title_style: Style,
    pub welcome_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub border_style: Style,
    pub focused_border_style: Style,
    pub hint_style: Style,
    pub busy_style: Style,

    // Sidebar
    pub history_item_style: Style,
    pub history_selected_style: Style,
    pub history_current_style: Style,

    // Auth form
    pub tab_active_style: Style,
    pub tab_inactive_style: Style,
    pub field_label_style: Style,

    // Alert modal
    pub alert_border_style: Style,
    pub alert_text_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_cursor_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            bot_prefix_style: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            bot_text_style: Style::default().fg(Color::White),
            welcome_title_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            welcome_text_style: Style::default().fg(Color::Gray),

            title_style: Style::default().fg(Color::Gray),
            border_style: Style::default().fg(Color::DarkGray),
            focused_border_style: Style::default().fg(Color::Cyan),
            hint_style: Style::default().fg(Color::DarkGray),
            busy_style: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),

            history_item_style: Style::default().fg(Color::Gray),
            history_selected_style: Style::default().add_modifier(Modifier::REVERSED),
            history_current_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),

            tab_active_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_inactive_style: Style::default().fg(Color::Gray),
            field_label_style: Style::default().fg(Color::Gray),

            alert_border_style: Style::default().fg(Color::Yellow),
            alert_text_style: Style::default().fg(Color::White),

            input_text_style: Style::default().fg(Color::White),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
        }
    }
}
